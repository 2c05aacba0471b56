//! # Catalog Server
//!
//! HTTP front of the product catalog: authenticated product CRUD and search, the audit
//! trail, and the `OpenAPI` docs, on top of `SurrealDB` and the in-process event bus.
//!
//! ## Example
//! ```no_run
//! use catalog_server::Server;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     Server::builder().port(8080).build().await?.run().await
//! }
//! ```

pub mod router;
mod shutdown;

use anyhow::{Context, Result};
use axum_server::Handle;
use axum_server::tls_rustls::RustlsConfig;
use catalog::domain::config::{AppConfig, DatabaseConfig, SslConfig};
use catalog::kernel::server::ApiState;
use catalog_database::Database;
use catalog_event_bus::EventBus;
use std::net::SocketAddr;
use std::time::Duration;
use tracing::info;

#[must_use = "builders do nothing unless you call .build()"]
#[derive(Debug, Default)]
pub struct ServerBuilder {
    cfg: AppConfig,
}

impl ServerBuilder {
    pub fn config(mut self, cfg: AppConfig) -> Self {
        self.cfg = cfg;
        self
    }

    /// Overrides `server.port`.
    pub fn port(mut self, port: u16) -> Self {
        self.cfg.server.port = port;
        self
    }

    /// Opens and migrates the database, starts the feature slices and loads the seed data.
    ///
    /// # Errors
    /// * The configured certificate or key file is missing.
    /// * The database is unreachable, rejects the credentials or fails to migrate.
    /// * A feature slice rejects its configuration.
    pub async fn build(self) -> Result<Server> {
        if let Some(ssl) = &self.cfg.server.ssl {
            check_tls_files(ssl)?;
        }

        let db = open_database(&self.cfg.database).await?;
        let events = EventBus::new();

        let state = catalog::init(
            ApiState::builder().config(self.cfg.clone()).db(db.clone()).events(events.clone()),
            &self.cfg,
            &db,
            &events,
        )
        .context("Platform bootstrap failed")?
        .build()
        .context("Failed to finalize API state registry")?;

        catalog::seed(&state).await.context("Failed to load seed data")?;

        info!(slices = ?state.slice_names().collect::<Vec<_>>(), "Server ready");
        Ok(Server { state })
    }
}

async fn open_database(cfg: &DatabaseConfig) -> Result<Database> {
    let mut builder = Database::builder()
        .url(&cfg.url)
        .session(&cfg.namespace, &cfg.database)
        .retry(cfg.connect_attempts, Duration::from_millis(cfg.connect_backoff_ms))
        .migrations(catalog::migrations());
    if let Some(creds) = &cfg.credentials {
        builder = builder.auth(&creds.username, &creds.password);
    }

    let db = builder.init().await.context("Failed to establish database connection")?;
    let report = db.migration_report();
    info!(applied = report.applied.len(), skipped = report.skipped.len(), "Schema is up to date");
    Ok(db)
}

fn check_tls_files(ssl: &SslConfig) -> Result<()> {
    anyhow::ensure!(ssl.cert.exists(), "SSL certificate not found at: {}", ssl.cert.display());
    anyhow::ensure!(ssl.key.exists(), "SSL key not found at: {}", ssl.key.display());

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if ssl.key.metadata()?.permissions().mode() & 0o077 != 0 {
            tracing::warn!(key = %ssl.key.display(), "SSL private key is readable by others (should be 600)");
        }
    }
    Ok(())
}

/// Initialized application, ready to serve.
#[must_use = "call .run().await to start the server"]
#[derive(Debug)]
pub struct Server {
    state: ApiState,
}

impl Server {
    pub fn builder() -> ServerBuilder {
        ServerBuilder::default()
    }

    /// Serves HTTP, or HTTPS when `server.ssl` is set, until Ctrl+C or SIGTERM.
    ///
    /// # Errors
    /// Binding the address or loading the TLS material fails.
    pub async fn run(self) -> Result<()> {
        let server = self.state.config.server.clone();
        let address = SocketAddr::new(server.address, server.port);
        let app = router::init(self.state).into_make_service();

        let handle = Handle::<SocketAddr>::new();
        tokio::spawn(shutdown::watch(handle.clone(), Duration::from_secs(server.shutdown_grace_seconds)));

        match &server.ssl {
            Some(ssl) => {
                let tls = RustlsConfig::from_pem_file(&ssl.cert, &ssl.key)
                    .await
                    .context("Failed to load SSL/TLS certificates")?;
                info!("Listening on https://{address}");
                axum_server::bind_rustls(address, tls).handle(handle).serve(app).await
            },
            None => {
                info!("Listening on http://{address}");
                axum_server::bind(address).handle(handle).serve(app).await
            },
        }
        .with_context(|| format!("Server on {address} failed"))?;

        info!("Server shutdown complete");
        Ok(())
    }

    #[must_use]
    pub const fn state(&self) -> &ApiState {
        &self.state
    }
}
