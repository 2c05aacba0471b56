use crate::bus::Event;
use std::any::type_name;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::broadcast::Receiver;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tracing::warn;

/// Lag-tolerant receiving for bus subscribers.
///
/// A slow subscriber loses the oldest events of a full channel. These helpers log the gap and
/// carry on with what is still retained.
pub trait EventReceiverExt<T> {
    /// Next event. `None` once the channel is closed.
    fn recv_lossy(&mut self) -> impl Future<Output = Option<Arc<T>>> + Send;

    /// Every event queued right now, without waiting.
    fn drain(&mut self) -> Vec<Arc<T>>;
}

impl<T: Event> EventReceiverExt<T> for Receiver<Arc<T>> {
    async fn recv_lossy(&mut self) -> Option<Arc<T>> {
        loop {
            match self.recv().await {
                Ok(event) => return Some(event),
                Err(RecvError::Lagged(skipped)) => lagged::<T>(skipped),
                Err(RecvError::Closed) => return None,
            }
        }
    }

    fn drain(&mut self) -> Vec<Arc<T>> {
        let mut events = Vec::with_capacity(self.len());
        loop {
            match self.try_recv() {
                Ok(event) => events.push(event),
                Err(TryRecvError::Lagged(skipped)) => lagged::<T>(skipped),
                Err(TryRecvError::Empty | TryRecvError::Closed) => return events,
            }
        }
    }
}

fn lagged<T>(skipped: u64) {
    warn!(event = type_name::<T>(), skipped, "Subscriber lagged, oldest events were dropped");
}
