//! # Database Connector
//!
//! Opens [SurrealDB](https://surrealdb.com) sessions for the catalog services and
//! applies every module's schema migrations before handing out the connection.
//!
//! - **Engine agnostic**: `mem://`, `rocksdb://`, `ws://` and `http://` via the `any` engine.
//! - **Resilient**: health checks retried with exponential backoff.
//! - **Versioned schema**: modules contribute [`Migration`]s; applied scripts are
//!   checksummed and must not change.
//!
//! ```rust
//! use catalog_database::{Database, DatabaseError, Migration};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), DatabaseError> {
//!     let db = Database::builder()
//!         .url("mem://")
//!         .session("catalog", "app")
//!         .migrations(vec![Migration::new("demo", 1, "init", "DEFINE TABLE demo SCHEMALESS;")])
//!         .init()
//!         .await?;
//!
//!     db.health().await?;
//!     Ok(())
//! }
//! ```

mod error;
mod migrations;

pub use error::{DatabaseError, DatabaseErrorExt};
pub use migrations::{Migration, MigrationKey, MigrationReport, MigrationRunner};

use std::ops::Deref;
use std::sync::Arc;
use std::time::Duration;
use surrealdb::Surreal;
use surrealdb::engine::any::{Any, connect};
use surrealdb::opt::auth::Root;
use tracing::{info, instrument, warn};

const DEFAULT_ATTEMPTS: u32 = 3;
const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(100);
const REMOTE_SCHEMES: [&str; 4] = ["ws://", "wss://", "http://", "https://"];

/// Wraps statements so they run atomically.
#[must_use]
pub fn transactional(statements: &str) -> String {
    format!("BEGIN TRANSACTION;\n{statements}\nCOMMIT TRANSACTION;")
}

#[derive(Debug)]
pub struct DatabaseInner {
    instance: Surreal<Any>,
    namespace: String,
    database: String,
    report: MigrationReport,
}

impl Drop for DatabaseInner {
    fn drop(&mut self) {
        info!(ns = %self.namespace, db = %self.database, "SurrealDB session handle dropped");
    }
}

/// Shared `SurrealDB` session. Derefs to [`Surreal<Any>`] for queries.
#[derive(Debug, Clone)]
pub struct Database {
    inner: Arc<DatabaseInner>,
}

impl Database {
    pub fn builder() -> DatabaseBuilder {
        DatabaseBuilder::new()
    }

    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.inner.namespace
    }

    #[must_use]
    pub fn database(&self) -> &str {
        &self.inner.database
    }

    /// Migrations applied or skipped during [`DatabaseBuilder::init`].
    #[must_use]
    pub fn migration_report(&self) -> &MigrationReport {
        &self.inner.report
    }

    /// Runs `statements` inside a single transaction and fails if any statement fails.
    ///
    /// # Errors
    /// [`DatabaseError::Surreal`] with the first statement error.
    pub async fn execute_transaction(&self, statements: &str) -> Result<(), DatabaseError> {
        self.inner
            .instance
            .query(transactional(statements))
            .await
            .context("Executing transaction")?
            .check()
            .map_err(surrealdb::Error::from)?;
        Ok(())
    }
}

impl Deref for Database {
    type Target = Surreal<Any>;

    fn deref(&self) -> &Self::Target {
        &self.inner.instance
    }
}

/// Fluent configuration of a `SurrealDB` connection.
#[must_use = "builders do nothing unless you call .init()"]
#[derive(Debug)]
pub struct DatabaseBuilder {
    url: Option<String>,
    namespace: Option<String>,
    database: Option<String>,
    credentials: Option<(String, String)>,
    migrations: Vec<Migration>,
    attempts: u32,
    base_delay: Duration,
}

impl Default for DatabaseBuilder {
    fn default() -> Self {
        Self {
            url: None,
            namespace: None,
            database: None,
            credentials: None,
            migrations: Vec::new(),
            attempts: DEFAULT_ATTEMPTS,
            base_delay: DEFAULT_BASE_DELAY,
        }
    }
}

impl DatabaseBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn session(mut self, namespace: impl Into<String>, database: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self.database = Some(database.into());
        self
    }

    /// Root credentials, used for remote engines only.
    pub fn auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.credentials = Some((username.into(), password.into()));
        self
    }

    pub fn migrations(mut self, migrations: impl IntoIterator<Item = Migration>) -> Self {
        self.migrations.extend(migrations);
        self
    }

    /// Health check attempts (at least one) and the first backoff delay.
    pub fn retry(mut self, attempts: u32, base_delay: Duration) -> Self {
        self.attempts = attempts.max(1);
        self.base_delay = base_delay;
        self
    }

    /// Connects, waits for the engine, signs in, selects the session and migrates.
    ///
    /// # Errors
    /// * [`DatabaseError::Validation`] for missing or malformed parameters.
    /// * [`DatabaseError::Connection`] if the engine fails to start or stays unhealthy.
    /// * [`DatabaseError::Auth`] if root credentials are rejected.
    /// * [`DatabaseError::Migration`] if a migration fails.
    #[instrument(skip(self), fields(url = self.url, ns = self.namespace, db = self.database))]
    pub async fn init(self) -> Result<Database, DatabaseError> {
        let url = required(self.url, "URL")?;
        let namespace = required(self.namespace, "Namespace")?;
        let database = required(self.database, "Database")?;
        validate_identifier(&namespace, "namespace")?;
        validate_identifier(&database, "database")?;

        let instance = connect(&url).await.map_err(|e| DatabaseError::Connection {
            message: e.to_string().into(),
            context: Some("Initializing engine".into()),
        })?;

        let mut delay = self.base_delay;
        for attempt in 1..=self.attempts {
            if instance.health().await.is_ok() {
                break;
            }
            if attempt == self.attempts {
                return Err(DatabaseError::Connection {
                    message: "Unhealthy after retries".into(),
                    context: Some(url.into()),
                });
            }
            warn!(attempt, ?delay, "Database not ready, retrying");
            tokio::time::sleep(delay).await;
            delay *= 2;
        }

        if let Some((username, password)) = self.credentials
            && REMOTE_SCHEMES.iter().any(|scheme| url.starts_with(scheme))
        {
            instance.signin(Root { username, password }).await.map_err(|e| DatabaseError::Auth {
                message: e.to_string().into(),
                context: Some(url.clone().into()),
            })?;
        }

        instance.use_ns(&namespace).use_db(&database).await.context("Activating session")?;
        info!(%namespace, %database, "SurrealDB connection established");

        let report = MigrationRunner::new(&instance).run(&self.migrations).await?;
        info!(
            applied = report.applied.len(),
            skipped = report.skipped.len(),
            "Database migrations complete"
        );

        Ok(Database { inner: Arc::new(DatabaseInner { instance, namespace, database, report }) })
    }
}

fn required(value: Option<String>, what: &'static str) -> Result<String, DatabaseError> {
    value.filter(|v| !v.trim().is_empty()).ok_or_else(|| DatabaseError::Validation {
        message: format!("{what} is required").into(),
        context: None,
    })
}

fn validate_identifier(value: &str, what: &'static str) -> Result<(), DatabaseError> {
    if value.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        Ok(())
    } else {
        Err(DatabaseError::Validation {
            message: format!("invalid {what} name '{value}'").into(),
            context: Some("only ASCII letters, digits and '_' are allowed".into()),
        })
    }
}
