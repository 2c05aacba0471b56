use crate::error::AuditError;
use catalog_derive::api_model;
use catalog_kernel::domain::audit::AuditAction;
use chrono::{DateTime, SecondsFormat, Utc};
use surrealdb::types::SurrealValue;

/// One persisted audit trail entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditLog {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub username: String,
    pub action: AuditAction,
    pub resource: String,
    pub details: String,
}

/// Storage shape of [`AuditLog`]. Timestamps are fixed width RFC 3339 so they sort as text.
#[derive(Debug, Clone, SurrealValue)]
pub(crate) struct AuditRecord {
    pub uid: String,
    pub logged_at: String,
    pub username: String,
    pub action: String,
    pub resource: String,
    pub details: String,
}

pub(crate) fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Micros, true)
}

impl From<&AuditLog> for AuditRecord {
    fn from(log: &AuditLog) -> Self {
        Self {
            uid: log.id.clone(),
            logged_at: format_timestamp(&log.timestamp),
            username: log.username.clone(),
            action: log.action.as_str().to_owned(),
            resource: log.resource.clone(),
            details: log.details.clone(),
        }
    }
}

impl TryFrom<AuditRecord> for AuditLog {
    type Error = AuditError;

    fn try_from(record: AuditRecord) -> Result<Self, Self::Error> {
        let timestamp = DateTime::parse_from_rfc3339(&record.logged_at)
            .map_err(|e| AuditError::Corrupted {
                message: e.to_string().into(),
                context: Some(format!("audit_log {}", record.uid).into()),
            })?
            .with_timezone(&Utc);

        Ok(Self {
            id: record.uid,
            timestamp,
            username: record.username,
            action: AuditAction::parse(&record.action),
            resource: record.resource,
            details: record.details,
        })
    }
}

/// Audit entry as returned by `GET /audits`.
#[api_model]
#[derive(Clone, PartialEq, Eq)]
pub struct AuditLogDto {
    pub id: String,
    /// RFC 3339, UTC
    pub timestamp: String,
    pub username: String,
    /// One of `ADD_PRODUCT`, `EDIT_PRODUCT`, `DELETE_PRODUCT`, `VIEW_PRODUCT`, `SEARCH`,
    /// `LOGIN`, `LOGOUT`, `CACHE_CLEAN_PRODUCT`, `CUSTOM`
    pub action: String,
    pub resource: String,
    pub details: String,
}

impl From<AuditLog> for AuditLogDto {
    fn from(log: AuditLog) -> Self {
        Self {
            timestamp: format_timestamp(&log.timestamp),
            id: log.id,
            username: log.username,
            action: log.action.as_str().to_owned(),
            resource: log.resource,
            details: log.details,
        }
    }
}
