//! Product search criteria and the matching rules applied in memory.

use crate::price::Price;
use serde::{Deserialize, Serialize};

/// Read access to the fields a search can filter on.
pub trait Searchable {
    fn id(&self) -> &str;
    fn name(&self) -> &str;
    fn category(&self) -> Option<&str>;
    fn brand(&self) -> Option<&str>;
    fn price(&self) -> Option<Price>;
}

/// Filters for a product search. Absent fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchCriteria {
    pub id: Option<String>,
    pub name: Option<String>,
    pub category: Option<String>,
    pub brand: Option<String>,
    pub min_price: Option<Price>,
    pub max_price: Option<Price>,
}

/// The single repository query a criteria set can be answered with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SingleFilter<'a> {
    Name(&'a str),
    Category(&'a str),
    Brand(&'a str),
    PriceRange(Option<Price>, Option<Price>),
}

impl SearchCriteria {
    /// Trims text filters and turns blank ones into `None`.
    #[must_use]
    pub fn normalized(self) -> Self {
        fn clean(value: Option<String>) -> Option<String> {
            value.map(|v| v.trim().to_owned()).filter(|v| !v.is_empty())
        }

        Self {
            id: clean(self.id),
            name: clean(self.name),
            category: clean(self.category),
            brand: clean(self.brand),
            min_price: self.min_price,
            max_price: self.max_price,
        }
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.id.is_none()
            && self.name.is_none()
            && self.category.is_none()
            && self.brand.is_none()
            && self.min_price.is_none()
            && self.max_price.is_none()
    }

    #[must_use]
    pub const fn has_price_range(&self) -> bool {
        self.min_price.is_some() || self.max_price.is_some()
    }

    /// Returns the filter when exactly one criterion is set (a price range counts as one).
    #[must_use]
    pub fn single_filter(&self) -> Option<SingleFilter<'_>> {
        let mut found = None;
        let mut count = 0;

        if let Some(name) = self.name.as_deref() {
            count += 1;
            found = Some(SingleFilter::Name(name));
        }
        if let Some(category) = self.category.as_deref() {
            count += 1;
            found = Some(SingleFilter::Category(category));
        }
        if let Some(brand) = self.brand.as_deref() {
            count += 1;
            found = Some(SingleFilter::Brand(brand));
        }
        if self.has_price_range() {
            count += 1;
            found = Some(SingleFilter::PriceRange(self.min_price, self.max_price));
        }
        if self.id.is_some() {
            count += 1;
            found = None;
        }

        if count == 1 { found } else { None }
    }

    pub fn matches(&self, item: &impl Searchable) -> bool {
        self.matches_id(item)
            && self.matches_name(item)
            && text_equals(self.category.as_deref(), item.category())
            && text_equals(self.brand.as_deref(), item.brand())
            && self.matches_price(item.price())
    }

    fn matches_id(&self, item: &impl Searchable) -> bool {
        self.id.as_deref().is_none_or(|id| id == item.id())
    }

    fn matches_name(&self, item: &impl Searchable) -> bool {
        self.name.as_deref().is_none_or(|needle| {
            item.name().to_lowercase().contains(&needle.trim().to_lowercase())
        })
    }

    fn matches_price(&self, price: Option<Price>) -> bool {
        if !self.has_price_range() {
            return true;
        }
        let Some(price) = price else {
            return false;
        };
        self.min_price.is_none_or(|min| price >= min) && self.max_price.is_none_or(|max| price <= max)
    }
}

fn text_equals(wanted: Option<&str>, actual: Option<&str>) -> bool {
    match (wanted, actual) {
        (None, _) => true,
        (Some(_), None) => false,
        (Some(w), Some(a)) => w.trim().to_lowercase() == a.trim().to_lowercase(),
    }
}
