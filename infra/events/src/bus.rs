use crate::error::EventBusError;
use fxhash::FxHashMap;
use parking_lot::RwLock;
use std::any::{Any, TypeId, type_name};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{trace, warn};

/// Buffer size of channels created implicitly by `subscribe` or `publish`.
pub const DEFAULT_CAPACITY: usize = 256;

/// Anything that can travel over the bus.
pub trait Event: Any + Send + Sync + 'static {}
impl<T: Any + Send + Sync + 'static> Event for T {}

#[derive(Debug)]
struct Channel {
    capacity: usize,
    sender: Box<dyn Any + Send + Sync>,
}

impl Channel {
    fn new<T: Event>(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel::<Arc<T>>(capacity);
        Self { capacity, sender: Box::new(tx) }
    }

    fn sender<T: Event>(&self) -> Result<broadcast::Sender<Arc<T>>, EventBusError> {
        self.sender.downcast_ref::<broadcast::Sender<Arc<T>>>().cloned().ok_or_else(|| {
            EventBusError::TypeMismatch {
                message: type_name::<T>().into(),
                context: Some("Registered channel carries another type".into()),
            }
        })
    }
}

/// Type-indexed registry of broadcast channels.
///
/// Cloning is cheap; clones share the same channels.
#[derive(Debug, Clone, Default)]
pub struct EventBus {
    channels: Arc<RwLock<FxHashMap<TypeId, Channel>>>,
}

impl EventBus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes to `T` with the default buffer size.
    ///
    /// # Errors
    /// `TypeMismatch` if the registry is corrupted.
    pub fn subscribe<T: Event>(&self) -> Result<broadcast::Receiver<Arc<T>>, EventBusError> {
        self.subscribe_with_capacity::<T>(DEFAULT_CAPACITY)
    }

    /// Subscribes to `T`. The capacity only applies when this call creates the channel.
    ///
    /// # Errors
    /// `InvalidCapacity` for a zero capacity.
    pub fn subscribe_with_capacity<T: Event>(
        &self,
        capacity: usize,
    ) -> Result<broadcast::Receiver<Arc<T>>, EventBusError> {
        if capacity == 0 {
            return Err(EventBusError::InvalidCapacity {
                message: "capacity must be >= 1".into(),
                context: Some(type_name::<T>().into()),
            });
        }
        Ok(self.sender::<T>(capacity)?.subscribe())
    }

    /// Delivers `event` to every current subscriber and returns how many got it.
    ///
    /// # Errors
    /// `TypeMismatch` if the registry is corrupted.
    pub fn publish<T: Event>(&self, event: T) -> Result<usize, EventBusError> {
        self.publish_arc(Arc::new(event))
    }

    /// Same as [`EventBus::publish`] for an already shared payload.
    ///
    /// # Errors
    /// `TypeMismatch` if the registry is corrupted.
    pub fn publish_arc<T: Event>(&self, event: Arc<T>) -> Result<usize, EventBusError> {
        let sender = self.sender::<T>(DEFAULT_CAPACITY)?;
        sender.send(event).map_or_else(
            |_| {
                trace!(event = type_name::<T>(), "Event dropped: no active subscribers");
                Ok(0)
            },
            |count| {
                trace!(event = type_name::<T>(), count, "Event dispatched");
                Ok(count)
            },
        )
    }

    /// Number of live receivers for `T`.
    #[must_use]
    pub fn subscriber_count<T: Event>(&self) -> usize {
        self.channels
            .read()
            .get(&TypeId::of::<T>())
            .and_then(|channel| channel.sender::<T>().ok())
            .map_or(0, |tx| tx.receiver_count())
    }

    /// Drops every channel; subscribers observe `Closed`. Returns the number dropped.
    #[must_use]
    pub fn shutdown(&self) -> usize {
        let mut channels = self.channels.write();
        let count = channels.len();
        channels.clear();
        count
    }

    fn sender<T: Event>(&self, capacity: usize) -> Result<broadcast::Sender<Arc<T>>, EventBusError> {
        let id = TypeId::of::<T>();

        if let Some(channel) = self.channels.read().get(&id) {
            if channel.capacity != capacity && capacity != DEFAULT_CAPACITY {
                warn!(
                    event = type_name::<T>(),
                    existing = channel.capacity,
                    requested = capacity,
                    "Channel already exists with a different capacity"
                );
            }
            return channel.sender::<T>();
        }

        let mut channels = self.channels.write();
        let channel = channels.entry(id).or_insert_with(|| {
            trace!(event = type_name::<T>(), capacity, "Initializing event channel");
            Channel::new::<T>(capacity)
        });
        channel.sender::<T>()
    }
}
