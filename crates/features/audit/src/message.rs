//! Audit detail texts for product operations.

use catalog_kernel::domain::price::Price;
use catalog_kernel::domain::search::SearchCriteria;
use std::fmt::Write;

pub const CREATED: &str = "Created product: [{id}]";
pub const UPDATED: &str = "Updated product: [{id}]";
pub const REMOVED: &str = "Removed product: [{id}]";
pub const ADDED: &str = "Added product: [{id}]";
pub const CACHE_CLEARED: &str = "Cleared product cache";

const ID_PLACEHOLDER: &str = "{id}";

#[must_use]
pub fn simple(message: &str) -> String {
    if message.is_empty() { "Product operation completed".to_owned() } else { message.to_owned() }
}

/// Fills `{id}` in `template`, or drops the `: [{id}]` suffix when there is no id.
#[must_use]
pub fn id_based(template: &str, id: Option<&str>) -> String {
    match (template.is_empty(), id) {
        (true, Some(id)) => format!("Product operation: [{id}]"),
        (true, None) => "Product operation".to_owned(),
        (false, Some(id)) => template.replace(ID_PLACEHOLDER, id),
        (false, None) => template.replace(": [{id}]", ""),
    }
}

#[must_use]
pub fn view(id: &str, found: bool) -> String {
    if found { format!("Viewed product (found): [{id}]") } else { format!("Viewed product: [{id}]") }
}

/// `Search: name='x' category='y' brand='z' price[min-max] - Found N results`,
/// or `Get all products, found: [N]` when nothing was filtered.
#[must_use]
pub fn search(criteria: &SearchCriteria, found: usize) -> String {
    if criteria.is_empty() {
        return format!("Get all products, found: [{found}]");
    }

    let mut message = String::from("Search: ");
    if let Some(name) = &criteria.name {
        let _ = write!(message, "name='{name}' ");
    }
    if let Some(category) = &criteria.category {
        let _ = write!(message, "category='{category}' ");
    }
    if let Some(brand) = &criteria.brand {
        let _ = write!(message, "brand='{brand}' ");
    }
    if criteria.has_price_range() {
        let _ = write!(message, "price[{}-{}] ", bound(criteria.min_price), bound(criteria.max_price));
    }
    let _ = write!(message, "- Found {found} results");
    message
}

fn bound(price: Option<Price>) -> String {
    price.map_or_else(|| "none".to_owned(), |p| p.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_defaults_when_empty() {
        assert_eq!(simple(""), "Product operation completed");
        assert_eq!(simple(CACHE_CLEARED), "Cleared product cache");
    }

    #[test]
    fn id_based_fills_or_strips_placeholder() {
        assert_eq!(id_based(CREATED, Some("p1")), "Created product: [p1]");
        assert_eq!(id_based(REMOVED, None), "Removed product");
        assert_eq!(id_based("", Some("p1")), "Product operation: [p1]");
        assert_eq!(id_based("", None), "Product operation");
    }

    #[test]
    fn view_mentions_lookup_outcome() {
        assert_eq!(view("p1", true), "Viewed product (found): [p1]");
        assert_eq!(view("p1", false), "Viewed product: [p1]");
    }

    #[test]
    fn search_lists_every_filter() {
        let criteria = SearchCriteria {
            name: Some("mouse".into()),
            brand: Some("TechBrand".into()),
            max_price: Some(Price::from_cents(5000)),
            ..Default::default()
        };
        assert_eq!(
            search(&criteria, 1),
            "Search: name='mouse' brand='TechBrand' price[none-50.00] - Found 1 results"
        );
    }

    #[test]
    fn search_leaves_the_id_out() {
        let criteria = SearchCriteria {
            id: Some("p1".into()),
            category: Some("Sports".into()),
            ..Default::default()
        };
        assert_eq!(search(&criteria, 0), "Search: category='Sports' - Found 0 results");
    }

    #[test]
    fn search_without_filters_reads_as_get_all() {
        assert_eq!(search(&SearchCriteria::default(), 8), "Get all products, found: [8]");
    }
}
