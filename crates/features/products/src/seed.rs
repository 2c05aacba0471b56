use crate::Products;
use crate::error::ProductError;
use crate::model::Product;
use catalog_kernel::domain::auth::{Principal, Role};
use catalog_kernel::domain::price::Price;
use catalog_kernel::safe_nanoid;
use tracing::{info, warn};

/// `(name, description, category, brand, price in cents)`
pub const SAMPLE_PRODUCTS: [(&str, &str, &str, &str, i64); 8] = [
    ("Laptop Pro 15", "High-performance laptop with 16GB RAM and 512GB SSD", "Electronics", "TechBrand", 129_999),
    ("Wireless Mouse", "Ergonomic wireless mouse with long battery life", "Electronics", "TechBrand", 2_999),
    ("Office Chair", "Comfortable ergonomic office chair with lumbar support", "Furniture", "ComfortSeat", 19_999),
    ("Desk Lamp", "LED desk lamp with adjustable brightness", "Furniture", "BrightLight", 4_999),
    ("Running Shoes", "Lightweight running shoes with cushioned sole", "Sports", "SportMax", 8_999),
    ("Yoga Mat", "Non-slip yoga mat with carrying strap", "Sports", "FitLife", 2_499),
    ("Coffee Maker", "Programmable coffee maker with thermal carafe", "Appliances", "BrewMaster", 7_999),
    ("Blender", "High-speed blender for smoothies and soups", "Appliances", "BrewMaster", 12_999),
];

/// Loads the sample catalog into an empty table on behalf of `admin`.
///
/// Returns how many products were added; nothing happens when the table already has rows.
///
/// # Errors
/// Storage failures while counting.
pub async fn seed(products: &Products, admin: &str) -> Result<usize, ProductError> {
    if products.service.count().await? > 0 {
        info!("Product table not empty, skipping sample data");
        return Ok(0);
    }

    let principal = Principal::new(admin, Role::Admin);
    let mut added = 0;
    for (name, description, category, brand, cents) in SAMPLE_PRODUCTS {
        let product = Product {
            id: safe_nanoid!(),
            name: name.to_owned(),
            description: Some(description.to_owned()),
            category: Some(category.to_owned()),
            brand: Some(brand.to_owned()),
            price: Price::from_cents(cents),
        };
        match products.service.add(&principal, product).await {
            Ok(_) => added += 1,
            Err(err) => warn!(error = %err, product = name, "Could not add sample product"),
        }
    }

    info!(added, "Sample products loaded");
    Ok(added)
}
