use crate::repository::AuditRepository;
use crate::service::AuditService;
use catalog_event_bus::EventReceiverExt;
use catalog_kernel::domain::audit::AuditEvent;
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, error};

/// Persists every [`AuditEvent`] published on the bus until the channel closes.
///
/// A failing write is logged and the listener keeps going.
pub(crate) fn spawn<R: AuditRepository>(
    service: AuditService<R>,
    mut events: broadcast::Receiver<Arc<AuditEvent>>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = events.recv_lossy().await {
            if let Err(e) = service.record(&event).await {
                error!(error = %e, user = %event.username, action = %event.action, "Failed to persist audit event");
            }
        }
        debug!("Audit listener stopped: event channel closed");
    })
}
