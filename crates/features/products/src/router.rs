use crate::Products;
use crate::model::{ProductDto, ProductForm, ProductQuery};
use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use catalog_derive::api_handler;
use catalog_kernel::domain::constants::PRODUCT;
use catalog_kernel::domain::search::SearchCriteria;
use catalog_kernel::security::{CurrentUser, ResourceGuard};
use catalog_kernel::server::{ApiError, ApiPath, ApiQuery, ApiState, ProblemDetails, ValidatedJson};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

pub const PRODUCTS_TAG: &str = "Products";

fn products(state: &ApiState) -> Result<&Products, ApiError> {
    state.try_get_slice::<Products>().map_err(ApiError::internal)
}

/// Product ids are nanoids; anything else cannot exist.
fn product_id(raw: &str) -> Result<String, ApiError> {
    ResourceGuard::verify(raw, PRODUCT).map_err(|_| ApiError::not_found(PRODUCT, raw))
}

#[api_handler(
    get,
    path = "/products",
    params(ProductQuery),
    responses(
        (status = OK, description = "Matching products", body = Vec<ProductDto>),
        (status = BAD_REQUEST, description = "Unparsable filter", body = ProblemDetails),
        (status = UNAUTHORIZED, description = "Missing or invalid credentials", body = ProblemDetails),
    ),
    security(("basic" = [])),
    tag = PRODUCTS_TAG,
)]
pub(crate) async fn search_products(
    State(state): State<ApiState>,
    user: CurrentUser,
    ApiQuery(query): ApiQuery<ProductQuery>,
) -> Result<Json<Vec<ProductDto>>, ApiError> {
    let criteria = SearchCriteria::from(query);
    let found = products(&state)?.service.search(&user, &criteria).await?;
    Ok(Json(found.into_iter().map(ProductDto::from).collect()))
}

#[api_handler(
    post,
    path = "/products",
    request_body = ProductForm,
    responses(
        (status = CREATED, description = "Product created", body = ProductDto),
        (status = BAD_REQUEST, description = "Invalid product", body = ProblemDetails),
        (status = FORBIDDEN, description = "Admin role required", body = ProblemDetails),
    ),
    security(("basic" = [])),
    tag = PRODUCTS_TAG,
)]
pub(crate) async fn create_product(
    State(state): State<ApiState>,
    user: CurrentUser,
    ValidatedJson(form): ValidatedJson<ProductForm>,
) -> Result<(StatusCode, Json<ProductDto>), ApiError> {
    let created = products(&state)?.service.create(&user, form).await?;
    Ok((StatusCode::CREATED, Json(created.into())))
}

#[api_handler(
    get,
    path = "/products/{id}",
    params(("id" = String, Path, description = "Product id")),
    responses(
        (status = OK, description = "The product", body = ProductDto),
        (status = NOT_FOUND, description = "No such product", body = ProblemDetails),
    ),
    security(("basic" = [])),
    tag = PRODUCTS_TAG,
)]
pub(crate) async fn get_product(
    State(state): State<ApiState>,
    user: CurrentUser,
    ApiPath(id): ApiPath<String>,
) -> Result<Json<ProductDto>, ApiError> {
    let id = product_id(&id)?;
    let product = products(&state)?.service.find_by_id(&user, &id).await?;
    Ok(Json(product.into()))
}

#[api_handler(
    put,
    path = "/products/{id}",
    params(("id" = String, Path, description = "Product id")),
    request_body = ProductForm,
    responses(
        (status = OK, description = "Product updated", body = ProductDto),
        (status = BAD_REQUEST, description = "Invalid product", body = ProblemDetails),
        (status = FORBIDDEN, description = "Admin role required", body = ProblemDetails),
        (status = NOT_FOUND, description = "No such product", body = ProblemDetails),
    ),
    security(("basic" = [])),
    tag = PRODUCTS_TAG,
)]
pub(crate) async fn update_product(
    State(state): State<ApiState>,
    user: CurrentUser,
    ApiPath(id): ApiPath<String>,
    ValidatedJson(form): ValidatedJson<ProductForm>,
) -> Result<Json<ProductDto>, ApiError> {
    let id = product_id(&id)?;
    let updated = products(&state)?.service.update(&user, &id, form).await?;
    Ok(Json(updated.into()))
}

#[api_handler(
    delete,
    path = "/products/{id}",
    params(("id" = String, Path, description = "Product id")),
    responses(
        (status = NO_CONTENT, description = "Product removed"),
        (status = FORBIDDEN, description = "Admin role required", body = ProblemDetails),
        (status = NOT_FOUND, description = "No such product", body = ProblemDetails),
    ),
    security(("basic" = [])),
    tag = PRODUCTS_TAG,
)]
pub(crate) async fn delete_product(
    State(state): State<ApiState>,
    user: CurrentUser,
    ApiPath(id): ApiPath<String>,
) -> Result<StatusCode, ApiError> {
    let id = product_id(&id)?;
    products(&state)?.service.delete(&user, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[api_handler(
    delete,
    path = "/products/cache",
    responses(
        (status = NO_CONTENT, description = "Cache cleared"),
        (status = FORBIDDEN, description = "Admin role required", body = ProblemDetails),
    ),
    security(("basic" = [])),
    tag = PRODUCTS_TAG,
)]
pub(crate) async fn clear_cache(State(state): State<ApiState>, user: CurrentUser) -> Result<StatusCode, ApiError> {
    products(&state)?.service.clear_cache(&user)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Product routes. They expect the authentication middleware in front of them.
pub fn router() -> OpenApiRouter<ApiState> {
    OpenApiRouter::new()
        .routes(routes!(search_products, create_product))
        .routes(routes!(get_product, update_product, delete_product))
        .routes(routes!(clear_cache))
}
