//! Roles, permissions and the authenticated principal.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;

bitflags! {
    /// What a role may do with the catalog.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Permissions: u32 {
        const READ = 1 << 0;
        const WRITE = 1 << 1;
        const MANAGE_CACHE = 1 << 2;

        const ALL = Self::READ.bits() | Self::WRITE.bits() | Self::MANAGE_CACHE.bits();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    User,
}

impl Role {
    #[must_use]
    pub const fn permissions(self) -> Permissions {
        match self {
            Self::Admin => Permissions::ALL,
            Self::User => Permissions::READ,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::User => "USER",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ADMIN" => Ok(Self::Admin),
            "USER" => Ok(Self::User),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// The user a request is executed for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub username: String,
    pub role: Role,
}

impl Principal {
    pub fn new(username: impl Into<String>, role: Role) -> Self {
        Self { username: username.into(), role }
    }

    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self.role, Role::Admin)
    }

    #[must_use]
    pub const fn can(&self, required: Permissions) -> bool {
        self.role.permissions().contains(required)
    }
}
