use crate::error::{ProductError, ProductErrorExt};
use crate::model::{Product, ProductRecord};
use catalog_database::Database;
use catalog_derive::timed;
use catalog_kernel::domain::price::Price;
use std::future::Future;

const SELECT: &str = "SELECT uid, name, description, category, brand, price_cents FROM product";
const ORDER: &str = "ORDER BY name ASC, uid ASC";

/// Product storage.
pub trait ProductRepository: Send + Sync + 'static {
    /// Every product, ordered by name.
    fn find_all(&self) -> impl Future<Output = Result<Vec<Product>, ProductError>> + Send;

    fn find_by_id(&self, id: &str) -> impl Future<Output = Result<Option<Product>, ProductError>> + Send;

    /// Inserts a new product or replaces the one with the same id.
    fn save(&self, product: &Product) -> impl Future<Output = Result<Product, ProductError>> + Send;

    /// Returns `false` when nothing was deleted.
    fn delete(&self, id: &str) -> impl Future<Output = Result<bool, ProductError>> + Send;

    fn exists(&self, id: &str) -> impl Future<Output = Result<bool, ProductError>> + Send;

    fn count(&self) -> impl Future<Output = Result<usize, ProductError>> + Send;

    /// Case-insensitive substring match on the name.
    fn search_by_name(&self, name: &str) -> impl Future<Output = Result<Vec<Product>, ProductError>> + Send;

    /// Case-insensitive equality on the category.
    fn search_by_category(
        &self,
        category: &str,
    ) -> impl Future<Output = Result<Vec<Product>, ProductError>> + Send;

    /// Case-insensitive equality on the brand.
    fn search_by_brand(&self, brand: &str) -> impl Future<Output = Result<Vec<Product>, ProductError>> + Send;

    /// Inclusive range; a missing bound is open.
    fn search_by_price(
        &self,
        min: Option<Price>,
        max: Option<Price>,
    ) -> impl Future<Output = Result<Vec<Product>, ProductError>> + Send;
}

#[derive(Debug, Clone)]
pub struct SurrealProductRepository {
    db: Database,
}

impl SurrealProductRepository {
    #[must_use]
    pub const fn new(db: Database) -> Self {
        Self { db }
    }

    async fn select(&self, filter: &str, binds: Vec<(&'static str, Bind)>) -> Result<Vec<Product>, ProductError> {
        let mut request = self.db.query(format!("{SELECT} {filter} {ORDER}"));
        for (key, value) in binds {
            request = match value {
                Bind::Text(text) => request.bind((key, text)),
                Bind::Cents(cents) => request.bind((key, cents)),
            };
        }

        let records = request
            .await
            .context("Loading products")?
            .take::<Vec<ProductRecord>>(0)
            .context("Parsing products")?;

        records.into_iter().map(Product::try_from).collect()
    }
}

enum Bind {
    Text(String),
    Cents(i64),
}

impl ProductRepository for SurrealProductRepository {
    #[timed(SurrealProductRepository)]
    async fn find_all(&self) -> Result<Vec<Product>, ProductError> {
        self.select("", Vec::new()).await
    }

    #[timed(SurrealProductRepository)]
    async fn find_by_id(&self, id: &str) -> Result<Option<Product>, ProductError> {
        let mut found = self.select("WHERE uid = $uid", vec![("uid", Bind::Text(id.to_owned()))]).await?;
        Ok(found.pop())
    }

    #[timed(SurrealProductRepository)]
    async fn save(&self, product: &Product) -> Result<Product, ProductError> {
        let statement = if self.exists(&product.id).await? {
            "UPDATE product SET name = $name, description = $description, category = $category, \
             brand = $brand, price_cents = $price_cents WHERE uid = $uid"
        } else {
            "CREATE product SET uid = $uid, name = $name, description = $description, \
             category = $category, brand = $brand, price_cents = $price_cents"
        };

        let record = ProductRecord::from(product);
        self.db
            .query(statement)
            .bind(("uid", record.uid))
            .bind(("name", record.name))
            .bind(("description", record.description))
            .bind(("category", record.category))
            .bind(("brand", record.brand))
            .bind(("price_cents", record.price_cents))
            .await
            .context("Saving product")?
            .check()
            .map_err(surrealdb::Error::from)?;
        Ok(product.clone())
    }

    #[timed(SurrealProductRepository)]
    async fn delete(&self, id: &str) -> Result<bool, ProductError> {
        let removed = self
            .db
            .query("DELETE product WHERE uid = $uid RETURN BEFORE")
            .bind(("uid", id.to_owned()))
            .await
            .context("Deleting product")?
            .take::<Vec<ProductRecord>>(0)
            .context("Parsing deleted product")?;
        Ok(!removed.is_empty())
    }

    #[timed(SurrealProductRepository)]
    async fn exists(&self, id: &str) -> Result<bool, ProductError> {
        let found = self
            .db
            .query("SELECT VALUE uid FROM product WHERE uid = $uid LIMIT 1")
            .bind(("uid", id.to_owned()))
            .await
            .context("Checking product")?
            .take::<Vec<String>>(0)
            .context("Parsing product id")?;
        Ok(!found.is_empty())
    }

    #[timed(SurrealProductRepository)]
    async fn count(&self) -> Result<usize, ProductError> {
        let total = self
            .db
            .query("SELECT VALUE count() FROM product GROUP ALL")
            .await
            .context("Counting products")?
            .take::<Vec<i64>>(0)
            .context("Parsing product count")?;
        Ok(total.first().copied().map_or(0, |n| usize::try_from(n).unwrap_or_default()))
    }

    #[timed(SurrealProductRepository)]
    async fn search_by_name(&self, name: &str) -> Result<Vec<Product>, ProductError> {
        self.select(
            "WHERE string::lowercase(name) CONTAINS $needle",
            vec![("needle", Bind::Text(name.trim().to_lowercase()))],
        )
        .await
    }

    #[timed(SurrealProductRepository)]
    async fn search_by_category(&self, category: &str) -> Result<Vec<Product>, ProductError> {
        self.select(
            "WHERE string::lowercase(category ?? '') = $category",
            vec![("category", Bind::Text(category.trim().to_lowercase()))],
        )
        .await
    }

    #[timed(SurrealProductRepository)]
    async fn search_by_brand(&self, brand: &str) -> Result<Vec<Product>, ProductError> {
        self.select(
            "WHERE string::lowercase(brand ?? '') = $brand",
            vec![("brand", Bind::Text(brand.trim().to_lowercase()))],
        )
        .await
    }

    #[timed(SurrealProductRepository)]
    async fn search_by_price(&self, min: Option<Price>, max: Option<Price>) -> Result<Vec<Product>, ProductError> {
        let mut conditions = Vec::new();
        let mut binds = Vec::new();
        if let Some(min) = min {
            conditions.push("price_cents >= $min");
            binds.push(("min", Bind::Cents(min.cents())));
        }
        if let Some(max) = max {
            conditions.push("price_cents <= $max");
            binds.push(("max", Bind::Cents(max.cents())));
        }
        let filter = if conditions.is_empty() { String::new() } else { format!("WHERE {}", conditions.join(" AND ")) };
        self.select(&filter, binds).await
    }
}
