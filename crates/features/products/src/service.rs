use crate::error::ProductError;
use crate::model::{Product, ProductForm};
use crate::repository::ProductRepository;
use catalog_audit::message;
use catalog_event_bus::EventBus;
use catalog_kernel::domain::audit::{AuditAction, AuditEvent};
use catalog_kernel::domain::auth::{Permissions, Principal};
use catalog_kernel::domain::constants::PRODUCT;
use catalog_kernel::domain::search::{SearchCriteria, SingleFilter};
use catalog_kernel::safe_nanoid;
use moka::sync::Cache;
use std::sync::Arc;
use tracing::{debug, warn};

/// Catalog operations with caching and auditing.
///
/// Writes and cache maintenance require [`Permissions::WRITE`]/[`Permissions::MANAGE_CACHE`];
/// every successful operation publishes an [`AuditEvent`].
#[derive(Debug)]
pub struct ProductService<R> {
    repository: Arc<R>,
    cache: Cache<String, Product>,
    events: EventBus,
}

impl<R> Clone for ProductService<R> {
    fn clone(&self) -> Self {
        Self { repository: Arc::clone(&self.repository), cache: self.cache.clone(), events: self.events.clone() }
    }
}

impl<R: ProductRepository> ProductService<R> {
    pub fn new(repository: R, cache_size: u64, events: EventBus) -> Self {
        Self { repository: Arc::new(repository), cache: Cache::new(cache_size), events }
    }

    /// # Errors
    /// `AccessDenied` for non-admins, `InvalidArguments` for a bad form, storage failures.
    pub async fn create(&self, principal: &Principal, form: ProductForm) -> Result<Product, ProductError> {
        require(principal, Permissions::WRITE)?;
        let product = form.into_product(safe_nanoid!())?;
        let saved = self.repository.save(&product).await?;
        self.cache.insert(saved.id.clone(), saved.clone());

        self.audit(principal, AuditAction::AddProduct, message::id_based(message::CREATED, Some(&saved.id)));
        Ok(saved)
    }

    /// Stores an already built product, keeping its id. Used when loading sample data.
    ///
    /// # Errors
    /// `AccessDenied` for non-admins, storage failures.
    pub async fn add(&self, principal: &Principal, product: Product) -> Result<Product, ProductError> {
        require(principal, Permissions::WRITE)?;
        let saved = self.repository.save(&product).await?;
        self.cache.insert(saved.id.clone(), saved.clone());

        self.audit(principal, AuditAction::AddProduct, message::id_based(message::ADDED, Some(&saved.id)));
        Ok(saved)
    }

    /// # Errors
    /// `AccessDenied`, `InvalidArguments`, `NotFound` when `id` does not exist, storage failures.
    pub async fn update(&self, principal: &Principal, id: &str, form: ProductForm) -> Result<Product, ProductError> {
        require(principal, Permissions::WRITE)?;
        let product = form.into_product(id.to_owned())?;
        if !self.repository.exists(id).await? {
            return Err(ProductError::NotFound { id: id.to_owned() });
        }

        let saved = self.repository.save(&product).await?;
        self.cache.insert(saved.id.clone(), saved.clone());

        self.audit(principal, AuditAction::EditProduct, message::id_based(message::UPDATED, Some(id)));
        Ok(saved)
    }

    /// # Errors
    /// `AccessDenied`, `NotFound` when `id` does not exist, storage failures.
    pub async fn delete(&self, principal: &Principal, id: &str) -> Result<(), ProductError> {
        require(principal, Permissions::WRITE)?;
        if !self.repository.delete(id).await? {
            return Err(ProductError::NotFound { id: id.to_owned() });
        }
        self.cache.invalidate(id);

        self.audit(principal, AuditAction::DeleteProduct, message::id_based(message::REMOVED, Some(id)));
        Ok(())
    }

    /// Cache first, then storage. The lookup is audited whether or not it finds anything.
    ///
    /// # Errors
    /// `NotFound` when `id` does not exist, storage failures.
    pub async fn find_by_id(&self, principal: &Principal, id: &str) -> Result<Product, ProductError> {
        let found = self.lookup(id).await?;
        self.audit(principal, AuditAction::ViewProduct, message::view(id, found.is_some()));
        found.ok_or_else(|| ProductError::NotFound { id: id.to_owned() })
    }

    /// Empty criteria list everything; a single filter goes to the matching repository query;
    /// anything else is filtered in memory.
    ///
    /// # Errors
    /// Storage failures.
    pub async fn search(&self, principal: &Principal, criteria: &SearchCriteria) -> Result<Vec<Product>, ProductError> {
        let products = if criteria.is_empty() {
            self.repository.find_all().await?
        } else {
            match criteria.single_filter() {
                Some(SingleFilter::Name(name)) => self.repository.search_by_name(name).await?,
                Some(SingleFilter::Category(category)) => self.repository.search_by_category(category).await?,
                Some(SingleFilter::Brand(brand)) => self.repository.search_by_brand(brand).await?,
                Some(SingleFilter::PriceRange(min, max)) => self.repository.search_by_price(min, max).await?,
                None => {
                    let mut all = self.repository.find_all().await?;
                    all.retain(|product| criteria.matches(product));
                    all
                },
            }
        };

        debug!(?criteria, found = products.len(), "Product search finished");
        self.audit(principal, AuditAction::Search, message::search(criteria, products.len()));
        Ok(products)
    }

    /// # Errors
    /// `AccessDenied` for non-admins.
    pub fn clear_cache(&self, principal: &Principal) -> Result<(), ProductError> {
        require(principal, Permissions::MANAGE_CACHE)?;
        self.cache.invalidate_all();

        self.audit(principal, AuditAction::CacheCleanProduct, message::simple(message::CACHE_CLEARED));
        Ok(())
    }

    /// # Errors
    /// Storage failures.
    pub async fn count(&self) -> Result<usize, ProductError> {
        self.repository.count().await
    }

    /// Cached copy of `id`, without touching storage.
    #[must_use]
    pub fn cached(&self, id: &str) -> Option<Product> {
        self.cache.get(id)
    }

    async fn lookup(&self, id: &str) -> Result<Option<Product>, ProductError> {
        if let Some(product) = self.cache.get(id) {
            return Ok(Some(product));
        }
        let found = self.repository.find_by_id(id).await?;
        if let Some(product) = &found {
            self.cache.insert(product.id.clone(), product.clone());
        }
        Ok(found)
    }

    fn audit(&self, principal: &Principal, action: AuditAction, details: String) {
        let event = AuditEvent::new(principal.username.clone(), action, PRODUCT, details);
        if let Err(err) = self.events.publish(event) {
            warn!(error = %err, user = %principal.username, %action, "Failed to publish audit event");
        }
    }
}

fn require(principal: &Principal, permission: Permissions) -> Result<(), ProductError> {
    if principal.can(permission) {
        Ok(())
    } else {
        Err(ProductError::AccessDenied { username: principal.username.clone() })
    }
}
