use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::{categories::CategoryList, orders::OrderStatusList, products::ProductList},
    error::AppResult,
    models::{Category, Product},
    response::ApiResponse,
    routes::params::CatalogQuery,
    services::{category_service, order_service, product_service},
    state::AppState,
};

/// Public, unauthenticated catalog endpoints.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/products", get(list_products))
        .route("/products/{id}", get(get_product))
        .route("/categories", get(list_categories))
        .route("/categories/{id}", get(get_category))
        .route("/order-statuses", get(list_order_statuses))
}

#[utoipa::path(
    get,
    path = "/api/products",
    params(CatalogQuery),
    responses(
        (status = 200, description = "Active products ordered by category and name", body = ApiResponse<ProductList>)
    ),
    tag = "Catalog"
)]
pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<CatalogQuery>,
) -> AppResult<Json<ApiResponse<ProductList>>> {
    let resp = product_service::list_catalog(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/products/{id}",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Get an active product", body = ApiResponse<Product>),
        (status = 404, description = "Product not found or inactive"),
    ),
    tag = "Catalog"
)]
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Product>>> {
    let resp = product_service::get_catalog_product(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/categories",
    responses(
        (status = 200, description = "Categories with product counts", body = ApiResponse<CategoryList>)
    ),
    tag = "Catalog"
)]
pub async fn list_categories(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<CategoryList>>> {
    let resp = category_service::list_categories(&state).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/categories/{id}",
    params(
        ("id" = Uuid, Path, description = "Category ID")
    ),
    responses(
        (status = 200, description = "Get category", body = ApiResponse<Category>),
        (status = 404, description = "Category not found"),
    ),
    tag = "Catalog"
)]
pub async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Category>>> {
    let resp = category_service::get_category(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/order-statuses",
    responses(
        (status = 200, description = "Order statuses in display order", body = ApiResponse<OrderStatusList>)
    ),
    tag = "Catalog"
)]
pub async fn list_order_statuses(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<OrderStatusList>>> {
    let resp = order_service::list_statuses(&state).await?;
    Ok(Json(resp))
}
