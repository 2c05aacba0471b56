//! Products feature slice.
//!
//! CRUD and search over the `product` table, a bounded read-through cache in front of it and
//! an audit event for every operation.
mod error;
mod model;
mod repository;
mod router;
mod seed;
mod service;

pub use crate::error::{ProductError, ProductErrorExt};
pub use crate::model::{Product, ProductDto, ProductForm, ProductQuery};
pub use crate::repository::{ProductRepository, SurrealProductRepository};
pub use crate::router::{PRODUCTS_TAG, router};
pub use crate::seed::{SAMPLE_PRODUCTS, seed};
pub use crate::service::ProductService;

use catalog_database::{Database, Migration};
use catalog_event_bus::EventBus;
use catalog_kernel::domain::config::CacheConfig;
use catalog_kernel::domain::registry::InitializedSlice;

pub const MODULE: &str = "products";

/// Products feature state.
#[catalog_derive::catalog_slice]
pub struct Products {
    pub service: ProductService<SurrealProductRepository>,
}

#[must_use]
pub fn migrations() -> Vec<Migration> {
    vec![Migration::new(MODULE, 1, "product table", include_str!("../migrations/0001_init.surql"))]
}

/// Initialize the products feature.
///
/// # Errors
/// `Internal` when the cache size is zero.
pub fn init(cache: &CacheConfig, database: &Database, events: &EventBus) -> Result<InitializedSlice, ProductError> {
    if cache.product_size == 0 {
        return Err(ProductError::Internal {
            message: "product cache size must be positive".into(),
            context: Some("cache.product_size".into()),
        });
    }

    let service = ProductService::new(SurrealProductRepository::new(database.clone()), cache.product_size, events.clone());
    tracing::info!(cache_size = cache.product_size, "Products slice initialized");

    Ok(InitializedSlice::new(Products::new(ProductsInner { service })))
}
