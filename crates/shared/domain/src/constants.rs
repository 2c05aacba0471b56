//! Names shared between storage, routing and configuration.

/// Application name, also used for config file names.
pub const APP_NAME: &str = "catalog";

/// Prefix for environment overrides, e.g. `CATALOG__SERVER__PORT=9000`.
pub const ENV_PREFIX: &str = "CATALOG";
pub const ENV_SEPARATOR: &str = "__";

// Tables / resources
pub const PRODUCT: &str = "product";
pub const USER: &str = "user";
pub const AUDIT_LOG: &str = "audit_log";

pub const ANONYMOUS: &str = "anonymous";
pub const REALM: &str = "User Visible Realm";
