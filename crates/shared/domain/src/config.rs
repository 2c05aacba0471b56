use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr};
use std::ops::{Deref, DerefMut};
use std::path::PathBuf;
use std::sync::Arc;

/// Top-level application configuration shared across services.
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfigInner {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logger: LoggerConfig,
    pub security: SecurityConfig,
    pub cache: CacheConfig,
    pub seed: SeedConfig,
}

/// Thin Arc-wrapped config for inexpensive cloning into subsystems.
#[derive(Default, Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(flatten, default)]
    inner: Arc<AppConfigInner>,
}

impl Deref for AppConfig {
    type Target = AppConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl From<AppConfigInner> for AppConfig {
    fn from(inner: AppConfigInner) -> Self {
        Self { inner: Arc::new(inner) }
    }
}

impl DerefMut for AppConfig {
    fn deref_mut(&mut self) -> &mut AppConfigInner {
        Arc::make_mut(&mut self.inner)
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub address: IpAddr,
    pub port: u16,
    pub ssl: Option<SslConfig>,
    /// Seconds to wait for in-flight requests on shutdown.
    pub shutdown_grace_seconds: u64,
}

/// TLS certificate/key paths.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SslConfig {
    pub cert: PathBuf,
    pub key: PathBuf,
}

/// `SurrealDB` connection configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    pub namespace: String,
    pub database: String,
    pub credentials: Option<DatabaseCredentials>,
    pub connect_attempts: u32,
    /// First retry delay in milliseconds; doubles on every further attempt.
    pub connect_backoff_ms: u64,
}

/// Root credentials, ignored by embedded engines like `mem://`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseCredentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    pub level: String,
    /// Full `EnvFilter` directive; wins over `level` when set.
    pub filter: Option<String>,
    /// Directory for daily rolling log files. Console only when unset.
    pub dir: Option<PathBuf>,
    pub json: bool,
    pub console: bool,
}

/// Authentication policy.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    pub realm: String,
    pub max_login_attempts: u32,
    pub lockout_seconds: u64,
    pub attempts_cache_capacity: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub product_size: u64,
}

/// Sample data loaded on startup.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SeedConfig {
    pub enabled: bool,
}

// --- Default ---

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 8080,
            ssl: None,
            shutdown_grace_seconds: 10,
        }
    }
}

impl Default for SslConfig {
    fn default() -> Self {
        Self { cert: PathBuf::from("cert.pem"), key: PathBuf::from("key.pem") }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "mem://".to_owned(),
            namespace: "catalog".to_owned(),
            database: "app".to_owned(),
            credentials: Some(DatabaseCredentials::default()),
            connect_attempts: 3,
            connect_backoff_ms: 100,
        }
    }
}

impl Default for DatabaseCredentials {
    fn default() -> Self {
        Self { username: "root".to_owned(), password: "root".to_owned() }
    }
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self { level: "info".to_owned(), filter: None, dir: None, json: false, console: true }
    }
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            realm: crate::constants::REALM.to_owned(),
            max_login_attempts: 3,
            lockout_seconds: 180,
            attempts_cache_capacity: 10_000,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { product_size: 100 }
    }
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}
