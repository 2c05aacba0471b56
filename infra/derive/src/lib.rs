#![allow(unreachable_pub)]
#![allow(clippy::needless_pass_by_value)]

//! # Macros
//!
//! Procedural macros used across the catalog workspace: error enums, feature
//! slice handles, `OpenAPI` models/handlers and execution timing.
//!
//! Examples are `ignore`d because they reference crates that depend on this one.

mod macros;

use proc_macro::TokenStream;
use syn::{DeriveInput, ItemFn, ItemStruct, parse_macro_input};

/// Defines a standard API data model.
///
/// * Adds `Debug`, `Serialize`, `Deserialize` and `utoipa::ToSchema` if missing.
/// * `rename_all = "camelCase"` unless overridden.
/// * `deny_unknown_fields` unless disabled with `deny_unknown_fields = false`.
///
/// ```rust,ignore
/// #[api_model]
/// pub struct ProductDto {
///     pub id: String,
///     pub name: String,
/// }
/// ```
#[proc_macro_attribute]
pub fn api_model(attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemStruct);
    macros::api::expand_api_model(attr.into(), input).into()
}

/// Registers an Axum handler with `utoipa::path`.
///
/// Accepts the usual `utoipa::path` arguments (`get`, `path = "..."`,
/// `params(...)`, `responses(...)`, `tag = "..."`).
///
/// ```rust,ignore
/// #[api_handler(get, path = "/health", responses((status = OK, body = HealthResponse)), tag = "System")]
/// pub async fn health() -> Json<HealthResponse> { .. }
/// ```
#[proc_macro_attribute]
pub fn api_handler(args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);
    macros::api::expand_api_handler(args.into(), input).into()
}

/// Turns an enum into a catalog error type.
///
/// # Features
///
/// * Injects `#[derive(Debug, thiserror::Error)]` when missing.
/// * Generates a `<Name>Ext` trait adding `.context(...)` to `Result<T, Name>`
///   and to `Result<T, Source>` for every variant that wraps a source error.
/// * Implements `From<Source>` for variants with a `source` (or `#[source]`/`#[from]`) field.
/// * Implements `From<&'static str>` and `From<String>` when an `Internal` variant exists.
///
/// # Requirements
///
/// Variants must use named fields. A variant wrapping a source must also carry
/// `context: Option<Cow<'static, str>>`. The enum must live in its own module,
/// since a private `format_context` helper is emitted next to it.
///
/// ```rust,ignore
/// #[catalog_error]
/// pub enum DatabaseError {
///     #[error("Surreal error{}: {source}", format_context(.context))]
///     Surreal { #[source] source: surrealdb::Error, context: Option<Cow<'static, str>> },
///
///     #[error("Internal error{}: {message}", format_context(.context))]
///     Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
/// }
/// ```
#[proc_macro_attribute]
pub fn catalog_error(_args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    macros::error::expand_error(input).into()
}

/// Defines a feature slice handle.
///
/// Generates `<Name>Inner` with the declared fields, the cloneable `Arc` handle
/// `<Name>`, `Deref` to the inner state and a `FeatureSlice` impl so the slice
/// can be registered in the API state.
///
/// ```rust,ignore
/// #[catalog_slice]
/// pub struct Products {
///     pub service: ProductService,
/// }
///
/// let slice = Products::new(ProductsInner { service });
/// ```
#[proc_macro_attribute]
pub fn catalog_slice(_attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemStruct);
    macros::slice::expand_slice(input).into()
}

/// Logs how long a function took, sync or async.
///
/// Emits `info!("Method {Type}.{method} executed in {ms} ms")` through `tracing`
/// once the body finishes, whatever its outcome. The type label is the optional
/// argument; without one the message is `Method {method} executed in {ms} ms`.
///
/// ```rust,ignore
/// impl SurrealProductRepository {
///     #[timed(SurrealProductRepository)]
///     async fn find_all(&self) -> Result<Vec<Product>, ProductError> { .. }
/// }
/// ```
#[proc_macro_attribute]
pub fn timed(args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);
    macros::timed::expand_timed(args.into(), input).into()
}
