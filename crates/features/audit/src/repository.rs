use crate::error::{AuditError, AuditErrorExt};
use crate::model::{AuditLog, AuditRecord};
use catalog_database::Database;
use catalog_derive::timed;
use std::future::Future;

const SELECT: &str = "SELECT uid, logged_at, username, action, resource, details FROM audit_log";

/// Append-only store of audit entries.
pub trait AuditRepository: Send + Sync + 'static {
    fn save(&self, entry: &AuditLog) -> impl Future<Output = Result<(), AuditError>> + Send;

    /// Every entry, oldest first.
    fn find_all(&self) -> impl Future<Output = Result<Vec<AuditLog>, AuditError>> + Send;

    /// Entries of one user, oldest first.
    fn find_by_username(
        &self,
        username: &str,
    ) -> impl Future<Output = Result<Vec<AuditLog>, AuditError>> + Send;
}

#[derive(Debug, Clone)]
pub struct SurrealAuditRepository {
    db: Database,
}

impl SurrealAuditRepository {
    #[must_use]
    pub const fn new(db: Database) -> Self {
        Self { db }
    }

    async fn select(&self, query: String, username: Option<String>) -> Result<Vec<AuditLog>, AuditError> {
        let mut request = self.db.query(query);
        if let Some(username) = username {
            request = request.bind(("username", username));
        }

        let records = request
            .await
            .context("Loading audit entries")?
            .take::<Vec<AuditRecord>>(0)
            .context("Parsing audit entries")?;

        records.into_iter().map(AuditLog::try_from).collect()
    }
}

impl AuditRepository for SurrealAuditRepository {
    #[timed(SurrealAuditRepository)]
    async fn save(&self, entry: &AuditLog) -> Result<(), AuditError> {
        let record = AuditRecord::from(entry);
        self.db
            .query(
                "CREATE audit_log SET uid = $uid, logged_at = $logged_at, username = $username, \
                 action = $action, resource = $resource, details = $details",
            )
            .bind(("uid", record.uid))
            .bind(("logged_at", record.logged_at))
            .bind(("username", record.username))
            .bind(("action", record.action))
            .bind(("resource", record.resource))
            .bind(("details", record.details))
            .await
            .context("Saving audit entry")?
            .check()
            .map_err(surrealdb::Error::from)?;
        Ok(())
    }

    #[timed(SurrealAuditRepository)]
    async fn find_all(&self) -> Result<Vec<AuditLog>, AuditError> {
        self.select(format!("{SELECT} ORDER BY logged_at ASC"), None).await
    }

    #[timed(SurrealAuditRepository)]
    async fn find_by_username(&self, username: &str) -> Result<Vec<AuditLog>, AuditError> {
        self.select(
            format!("{SELECT} WHERE username = $username ORDER BY logged_at ASC"),
            Some(username.to_owned()),
        )
        .await
    }
}
