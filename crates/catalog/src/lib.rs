//! Facade crate for the catalog feature slices.
//! Re-exports the shared kernel and the slices and wires them together.
//! Keep this crate thin: it composes other crates and holds no business rules.
//!
//! ## Usage
//! - Collect the schema with [`migrations`] before opening the database.
//! - Register the slices with [`init`], then mount [`router`] and run [`seed`].

use axum::middleware;
use catalog_database::{Database, Migration};
use catalog_event_bus::EventBus;
use catalog_kernel::domain::auth::Role;
use catalog_kernel::domain::config::AppConfig;
use catalog_kernel::server::{ApiState, ApiStateBuilder, ApiStateError};
use std::borrow::Cow;
use tracing::info;
use utoipa_axum::router::OpenApiRouter;

pub use catalog_kernel as kernel;
pub use catalog_kernel::domain;

pub mod features {
    pub use catalog_audit as audit;
    pub use catalog_identity as identity;
    pub use catalog_products as products;
}

use features::{audit, identity, products};

/// Module names, in initialization order. Each may ship a `catalog-<module>.toml`.
pub const MODULES: [&str; 3] = [audit::MODULE, identity::MODULE, products::MODULE];

#[catalog_derive::catalog_error]
pub enum CatalogError {
    #[error("Audit bootstrap failed{}: {source}", format_context(.context))]
    Audit { source: audit::AuditError, context: Option<Cow<'static, str>> },

    #[error("Identity bootstrap failed{}: {source}", format_context(.context))]
    Identity { source: identity::IdentityError, context: Option<Cow<'static, str>> },

    #[error("Products bootstrap failed{}: {source}", format_context(.context))]
    Products { source: products::ProductError, context: Option<Cow<'static, str>> },

    #[error("State error{}: {source}", format_context(.context))]
    State { source: ApiStateError, context: Option<Cow<'static, str>> },
}

/// Schema of every slice, in initialization order.
#[must_use]
pub fn migrations() -> Vec<Migration> {
    [audit::migrations(), identity::migrations(), products::migrations()].concat()
}

/// Initializes audit, identity and products and registers them on `builder`.
///
/// Audit goes first so that its listener sees the events of the later slices.
/// Must run inside a Tokio runtime.
///
/// # Errors
/// The first slice that fails to initialize.
pub fn init(
    builder: ApiStateBuilder,
    config: &AppConfig,
    database: &Database,
    events: &EventBus,
) -> Result<ApiStateBuilder, CatalogError> {
    let slices = [
        audit::init(database, events)?,
        identity::init(&config.security, database, events)?,
        products::init(&config.cache, database, events)?,
    ];
    info!(slices = slices.len(), "Feature slices initialized");

    Ok(builder.register_slices(slices))
}

/// Feature routes. Everything but the login endpoint sits behind Basic authentication.
pub fn router(state: &ApiState) -> OpenApiRouter<ApiState> {
    let protected = OpenApiRouter::new()
        .merge(audit::router())
        .merge(identity::router())
        .merge(products::router())
        .layer(middleware::from_fn_with_state(state.clone(), identity::authenticate));

    identity::public_router().merge(protected)
}

/// Loads the default accounts and the sample products when `seed.enabled` is set.
///
/// # Errors
/// Missing slices or storage failures.
pub async fn seed(state: &ApiState) -> Result<(), CatalogError> {
    if !state.config.seed.enabled {
        info!("Seeding disabled");
        return Ok(());
    }

    let users = identity::seed(state.try_get_slice::<identity::Identity>()?).await?;

    let admin = identity::DEFAULT_USERS
        .iter()
        .find(|(_, _, role)| *role == Role::Admin)
        .map_or(domain::constants::ANONYMOUS, |(username, ..)| *username);
    let products = products::seed(state.try_get_slice::<products::Products>()?, admin).await?;

    info!(users, products, "Seed data loaded");
    Ok(())
}
