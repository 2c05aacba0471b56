//! Audit vocabulary shared by every slice that emits audit events.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of audited action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    AddProduct,
    EditProduct,
    DeleteProduct,
    ViewProduct,
    Search,
    Login,
    Logout,
    CacheCleanProduct,
    Custom,
}

impl AuditAction {
    pub const ALL: [Self; 9] = [
        Self::AddProduct,
        Self::EditProduct,
        Self::DeleteProduct,
        Self::ViewProduct,
        Self::Search,
        Self::Login,
        Self::Logout,
        Self::CacheCleanProduct,
        Self::Custom,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AddProduct => "ADD_PRODUCT",
            Self::EditProduct => "EDIT_PRODUCT",
            Self::DeleteProduct => "DELETE_PRODUCT",
            Self::ViewProduct => "VIEW_PRODUCT",
            Self::Search => "SEARCH",
            Self::Login => "LOGIN",
            Self::Logout => "LOGOUT",
            Self::CacheCleanProduct => "CACHE_CLEAN_PRODUCT",
            Self::Custom => "CUSTOM",
        }
    }

    /// Lenient parse of stored values; unknown strings become `Custom`.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        Self::ALL.into_iter().find(|a| a.as_str().eq_ignore_ascii_case(value)).unwrap_or(Self::Custom)
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Published on the event bus by domain operations and persisted by the audit slice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEvent {
    pub username: String,
    pub action: AuditAction,
    pub resource: String,
    pub details: String,
}

impl AuditEvent {
    pub fn new(
        username: impl Into<String>,
        action: AuditAction,
        resource: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            action,
            resource: resource.into(),
            details: details.into(),
        }
    }
}
