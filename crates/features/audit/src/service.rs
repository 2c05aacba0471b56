use crate::error::AuditError;
use crate::model::AuditLog;
use crate::repository::AuditRepository;
use catalog_kernel::domain::audit::{AuditAction, AuditEvent};
use catalog_kernel::domain::constants::ANONYMOUS;
use catalog_kernel::safe_nanoid;
use chrono::Utc;
use std::sync::Arc;
use tracing::debug;

/// Records and reads the audit trail.
#[derive(Debug)]
pub struct AuditService<R> {
    repository: Arc<R>,
}

impl<R> Clone for AuditService<R> {
    fn clone(&self) -> Self {
        Self { repository: Arc::clone(&self.repository) }
    }
}

impl<R: AuditRepository> AuditService<R> {
    pub fn new(repository: R) -> Self {
        Self { repository: Arc::new(repository) }
    }

    /// Persists one entry stamped with the current UTC time.
    ///
    /// # Errors
    /// Storage failures.
    pub async fn log_action(
        &self,
        username: &str,
        action: AuditAction,
        details: &str,
        resource: &str,
    ) -> Result<AuditLog, AuditError> {
        let username = username.trim();
        let entry = AuditLog {
            id: safe_nanoid!(),
            timestamp: Utc::now(),
            username: if username.is_empty() { ANONYMOUS.to_owned() } else { username.to_owned() },
            action,
            resource: resource.to_owned(),
            details: details.to_owned(),
        };

        self.repository.save(&entry).await?;
        debug!(id = %entry.id, user = %entry.username, action = %entry.action, "Audit entry recorded");
        Ok(entry)
    }

    /// # Errors
    /// Storage failures.
    pub async fn record(&self, event: &AuditEvent) -> Result<AuditLog, AuditError> {
        self.log_action(&event.username, event.action, &event.details, &event.resource).await
    }

    /// # Errors
    /// Storage failures or corrupted rows.
    pub async fn find_all(&self) -> Result<Vec<AuditLog>, AuditError> {
        self.repository.find_all().await
    }

    /// # Errors
    /// Storage failures or corrupted rows.
    pub async fn find_by_username(&self, username: &str) -> Result<Vec<AuditLog>, AuditError> {
        self.repository.find_by_username(username).await
    }
}
