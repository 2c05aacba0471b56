use crate::error::ProductError;
use catalog_derive::api_model;
use catalog_kernel::domain::price::{MIN_PRICE, Price};
use catalog_kernel::domain::search::{SearchCriteria, Searchable};
use catalog_kernel::server::{FieldError, Validate};
use surrealdb::types::SurrealValue;

pub const MAX_NAME_LENGTH: usize = 255;
pub const MAX_DESCRIPTION_LENGTH: usize = 10_000;
pub const MAX_LABEL_LENGTH: usize = 255;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub brand: Option<String>,
    pub price: Price,
}

impl Searchable for Product {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    fn brand(&self) -> Option<&str> {
        self.brand.as_deref()
    }

    fn price(&self) -> Option<Price> {
        Some(self.price)
    }
}

/// Storage shape of [`Product`]; the price is kept as integer cents.
#[derive(Debug, Clone, SurrealValue)]
pub(crate) struct ProductRecord {
    pub uid: String,
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub brand: Option<String>,
    pub price_cents: i64,
}

impl From<&Product> for ProductRecord {
    fn from(product: &Product) -> Self {
        Self {
            uid: product.id.clone(),
            name: product.name.clone(),
            description: product.description.clone(),
            category: product.category.clone(),
            brand: product.brand.clone(),
            price_cents: product.price.cents(),
        }
    }
}

impl TryFrom<ProductRecord> for Product {
    type Error = ProductError;

    fn try_from(record: ProductRecord) -> Result<Self, Self::Error> {
        if record.price_cents < MIN_PRICE.cents() {
            return Err(ProductError::Corrupted {
                message: format!("price {} below minimum", record.price_cents).into(),
                context: Some(format!("product {}", record.uid).into()),
            });
        }
        Ok(Self {
            id: record.uid,
            name: record.name,
            description: record.description,
            category: record.category,
            brand: record.brand,
            price: Price::from_cents(record.price_cents),
        })
    }
}

/// Product fields sent by clients on create and update.
#[api_model]
#[derive(Clone, Default)]
pub struct ProductForm {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
    /// Decimal with at most two fraction digits, as a number or a string
    #[serde(default)]
    #[schema(value_type = Option<f64>, example = 29.99)]
    pub price: Option<Price>,
}

impl Validate for ProductForm {
    fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();

        match self.name.as_deref().map(str::trim) {
            None | Some("") => errors.push(FieldError::new("name", "name can not be null/empty")),
            Some(name) if name.chars().count() > MAX_NAME_LENGTH => {
                errors.push(FieldError::new("name", "name can not be longer than 255"));
            },
            Some(_) => {},
        }
        required_text(&mut errors, "description", self.description.as_deref(), MAX_DESCRIPTION_LENGTH);
        required_text(&mut errors, "category", self.category.as_deref(), MAX_LABEL_LENGTH);
        required_text(&mut errors, "brand", self.brand.as_deref(), MAX_LABEL_LENGTH);
        match self.price {
            None => errors.push(FieldError::new("price", "price can not be null")),
            Some(price) if price < MIN_PRICE => {
                errors.push(FieldError::new("price", "minimal price is 0.01"));
            },
            Some(_) => {},
        }

        errors
    }
}

fn required_text(errors: &mut Vec<FieldError>, field: &'static str, value: Option<&str>, max: usize) {
    match value {
        None => errors.push(FieldError::new(field, format!("{field} can not be null"))),
        Some(v) if v.trim().is_empty() => errors.push(FieldError::new(field, format!("{field} can not be empty"))),
        Some(v) if v.chars().count() > max => {
            errors.push(FieldError::new(field, format!("{field} can not be longer than {max}")));
        },
        Some(_) => {},
    }
}

fn clean(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_owned()).filter(|v| !v.is_empty())
}

impl ProductForm {
    /// Builds the product stored under `id`.
    ///
    /// # Errors
    /// `InvalidArguments` with every violated rule.
    pub fn into_product(self, id: String) -> Result<Product, ProductError> {
        let errors = self.validate();
        let (Some(name), Some(price), true) = (self.name, self.price, errors.is_empty()) else {
            return Err(ProductError::InvalidArguments { errors });
        };

        Ok(Product {
            id,
            name: name.trim().to_owned(),
            description: clean(self.description),
            category: clean(self.category),
            brand: clean(self.brand),
            price,
        })
    }
}

#[api_model]
#[derive(Clone, PartialEq, Eq)]
pub struct ProductDto {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub brand: Option<String>,
    #[schema(value_type = f64, example = 29.99)]
    pub price: Price,
}

impl From<Product> for ProductDto {
    fn from(product: Product) -> Self {
        Self {
            id: product.id,
            name: product.name,
            description: product.description,
            category: product.category,
            brand: product.brand,
            price: product.price,
        }
    }
}

/// Query string of `GET /products`. Every filter is optional.
#[api_model(params = true, deny_unknown_fields = false)]
#[derive(Clone, Default)]
pub struct ProductQuery {
    pub id: Option<String>,
    /// Case-insensitive substring of the name
    pub name: Option<String>,
    pub category: Option<String>,
    pub brand: Option<String>,
    /// Inclusive lower price bound
    #[param(value_type = Option<f64>)]
    #[schema(value_type = Option<f64>)]
    pub min_price: Option<Price>,
    /// Inclusive upper price bound
    #[param(value_type = Option<f64>)]
    #[schema(value_type = Option<f64>)]
    pub max_price: Option<Price>,
}

impl From<ProductQuery> for SearchCriteria {
    fn from(query: ProductQuery) -> Self {
        Self {
            id: query.id,
            name: query.name,
            category: query.category,
            brand: query.brand,
            min_price: query.min_price,
            max_price: query.max_price,
        }
        .normalized()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> ProductForm {
        ProductForm {
            name: Some("Wireless Mouse".into()),
            description: Some("Ergonomic".into()),
            category: Some("Electronics".into()),
            brand: Some("TechBrand".into()),
            price: Some(Price::from_cents(2999)),
        }
    }

    #[test]
    fn valid_form_has_no_errors() {
        assert!(form().validate().is_empty());
    }

    #[test]
    fn collects_every_field_error() {
        let invalid = ProductForm {
            name: Some("   ".into()),
            brand: Some("b".repeat(256)),
            price: Some(Price::from_cents(0)),
            ..form()
        };
        let rendered: Vec<_> = invalid.validate().iter().map(ToString::to_string).collect();
        assert_eq!(
            rendered,
            [
                "[name:name can not be null/empty]",
                "[brand:brand can not be longer than 255]",
                "[price:minimal price is 0.01]",
            ]
        );
    }

    #[test]
    fn missing_price_is_reported() {
        let errors = ProductForm { price: None, ..form() }.validate();
        assert_eq!(errors, [FieldError::new("price", "price can not be null")]);
    }

    #[test]
    fn text_fields_are_required() {
        let missing = ProductForm { description: None, category: None, brand: None, ..form() };
        assert_eq!(
            missing.validate(),
            [
                FieldError::new("description", "description can not be null"),
                FieldError::new("category", "category can not be null"),
                FieldError::new("brand", "brand can not be null"),
            ]
        );

        let blank = ProductForm { description: Some(" ".into()), category: Some(String::new()), ..form() };
        assert_eq!(
            blank.validate(),
            [
                FieldError::new("description", "description can not be empty"),
                FieldError::new("category", "category can not be empty"),
            ]
        );

        let long = ProductForm { description: Some("d".repeat(10_001)), ..form() };
        assert_eq!(long.validate(), [FieldError::new("description", "description can not be longer than 10000")]);
    }

    #[test]
    fn into_product_trims_text_fields() {
        let product = ProductForm { name: Some("  Desk Lamp ".into()), category: Some(" Furniture ".into()), ..form() }
            .into_product("p1".into())
            .unwrap();
        assert_eq!(product.name, "Desk Lamp");
        assert_eq!(product.category.as_deref(), Some("Furniture"));
        assert_eq!(product.brand.as_deref(), Some("TechBrand"));
    }

    #[test]
    fn into_product_rejects_invalid_form() {
        let err = ProductForm::default().into_product("p1".into()).unwrap_err();
        let ProductError::InvalidArguments { errors } = err else { panic!("unexpected {err:?}") };
        assert_eq!(errors.len(), 5);
    }

    #[test]
    fn price_renders_as_number() {
        let dto = ProductDto::from(form().into_product("p1".into()).unwrap());
        let json = serde_json::to_value(&dto).unwrap();
        assert_eq!(json["price"], 29.99);
        assert_eq!(json["id"], "p1");
    }

    #[test]
    fn query_becomes_normalized_criteria() {
        let query = ProductQuery { name: Some(" mouse ".into()), brand: Some(String::new()), ..Default::default() };
        let criteria = SearchCriteria::from(query);
        assert_eq!(criteria.name.as_deref(), Some("mouse"));
        assert_eq!(criteria.brand, None);
    }

    proptest::proptest! {
        #[test]
        fn any_positive_price_with_a_name_is_valid(name in "[A-Za-z][A-Za-z0-9 ]{0,40}", cents in 1i64..10_000_000) {
            let candidate = ProductForm { name: Some(name), price: Some(Price::from_cents(cents)), ..form() };
            proptest::prop_assert!(candidate.validate().is_empty());
        }

        #[test]
        fn non_positive_price_is_always_rejected(cents in -10_000i64..1) {
            let candidate = ProductForm { price: Some(Price::from_cents(cents)), ..form() };
            proptest::prop_assert_eq!(candidate.validate(), vec![FieldError::new("price", "minimal price is 0.01")]);
        }
    }
}
