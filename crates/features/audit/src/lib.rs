//! Audit feature slice.
//!
//! Domain operations publish [`AuditEvent`](catalog_kernel::domain::audit::AuditEvent)s on the
//! event bus; this slice persists them in the `audit_log` table and serves them on `GET /audits`.
mod error;
mod listener;
pub mod message;
mod model;
mod repository;
mod router;
mod service;

pub use crate::error::{AuditError, AuditErrorExt};
pub use crate::model::{AuditLog, AuditLogDto};
pub use crate::repository::{AuditRepository, SurrealAuditRepository};
pub use crate::router::{AUDIT_TAG, router};
pub use crate::service::AuditService;

use catalog_database::{Database, Migration};
use catalog_event_bus::EventBus;
use catalog_kernel::domain::audit::AuditEvent;
use catalog_kernel::domain::registry::InitializedSlice;
use tokio::task::JoinHandle;

/// Module name used for migrations and config files.
pub const MODULE: &str = "audit";

/// Audit feature state.
#[catalog_derive::catalog_slice]
pub struct Audit {
    pub service: AuditService<SurrealAuditRepository>,
    listener: JoinHandle<()>,
}

impl AuditInner {
    /// `true` while the event listener is running.
    #[must_use]
    pub fn is_listening(&self) -> bool {
        !self.listener.is_finished()
    }
}

/// Schema owned by this slice.
#[must_use]
pub fn migrations() -> Vec<Migration> {
    vec![Migration::new(MODULE, 1, "audit log table", include_str!("../migrations/0001_init.surql"))]
}

/// Initialize the audit feature and start persisting bus events.
///
/// Must run inside a Tokio runtime.
///
/// # Errors
/// Fails if the event subscription cannot be created.
pub fn init(database: &Database, events: &EventBus) -> Result<InitializedSlice, AuditError> {
    let service = AuditService::new(SurrealAuditRepository::new(database.clone()));
    let receiver = events.subscribe::<AuditEvent>()?;
    let listener = listener::spawn(service.clone(), receiver);

    tracing::info!("Audit slice initialized");

    Ok(InitializedSlice::new(Audit::new(AuditInner { service, listener })))
}
