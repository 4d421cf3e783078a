use chrono::Utc;
use sea_orm::sea_query::{Expr, Func, LikeExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Select, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    dto::products::{ProductList, ProductRequest},
    entity::{
        order_items::{Column as ItemCol, Entity as OrderItems},
        products::{ActiveModel, Column, Entity as Products, Model as ProductModel},
        service_appointments::{Column as ApptCol, Entity as Appointments},
    },
    error::{AppError, AppResult},
    images::{ImageStore, ImageUpload, PRODUCT_IMAGE_FOLDER},
    middleware::auth::{AuthUser, ensure_designer},
    models::{Product, is_service_type, product_type_of},
    response::{ApiResponse, Meta},
    routes::params::{CatalogQuery, Pagination},
    services::category_service::find_category,
    state::AppState,
};

/// Public catalog: active products only, grouped by category then name.
pub async fn list_catalog(
    state: &AppState,
    query: CatalogQuery,
) -> AppResult<ApiResponse<ProductList>> {
    let mut condition = Condition::all().add(Column::IsActive.eq(true));

    if let Some(category_id) = query.category_id {
        condition = condition.add(Column::CategoryId.eq(category_id));
    }

    match query.product_type.as_deref().map(str::trim) {
        Some("service") => condition = condition.add(Column::IsService.eq(true)),
        Some("product") => condition = condition.add(Column::IsService.eq(false)),
        _ => {}
    }

    if let Some(search) = query.q.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        let pattern = contains_pattern(search);
        condition = condition.add(
            Condition::any()
                .add(
                    Expr::expr(Func::lower(Expr::col(Column::Name)))
                        .like(LikeExpr::new(pattern.clone()).escape('\\')),
                )
                .add(
                    Expr::expr(Func::lower(Expr::col(Column::Description)))
                        .like(LikeExpr::new(pattern).escape('\\')),
                ),
        );
    }

    let finder = Products::find()
        .filter(condition)
        .order_by_asc(Column::CategoryId)
        .order_by_asc(Column::Name);

    paged_products(state, finder, query.pagination(), "Products").await
}

pub async fn get_catalog_product(state: &AppState, id: Uuid) -> AppResult<ApiResponse<Product>> {
    let product = Products::find_by_id(id)
        .filter(Column::IsActive.eq(true))
        .one(&state.orm)
        .await?;
    let product = match product {
        Some(p) => p,
        None => return Err(AppError::NotFound),
    };
    Ok(ApiResponse::success(
        "Product",
        product_from_entity(state.images.as_ref(), product).await,
        None,
    ))
}

/// Back-office listing, inactive products included, newest first.
pub async fn list_admin_products(
    state: &AppState,
    user: &AuthUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<ProductList>> {
    ensure_designer(user)?;
    let finder = Products::find()
        .order_by_desc(Column::CreatedAt)
        .order_by_asc(Column::Name);
    paged_products(state, finder, pagination, "Products").await
}

pub async fn get_product_admin(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<Product>> {
    ensure_designer(user)?;
    let product = find_product(&state.orm, id).await?;
    Ok(ApiResponse::success(
        "Product",
        product_from_entity(state.images.as_ref(), product).await,
        None,
    ))
}

pub async fn create_product(
    state: &AppState,
    user: &AuthUser,
    payload: ProductRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_designer(user)?;
    payload.validate()?;
    if let Some(category_id) = payload.category_id {
        ensure_category_exists(&state.orm, category_id).await?;
    }

    let active = ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(payload.name.trim().to_string()),
        description: Set(clean_text(payload.description.clone())),
        price: Set(payload.price),
        category_id: Set(payload.category_id),
        is_service: Set(payload.is_service()),
        is_active: Set(payload.is_active),
        image_url: Set(None),
        created_at: Set(Utc::now()),
    };
    let product = active.insert(&state.orm).await?;

    tracing::info!(
        product_id = %product.id,
        product_type = product_type_of(product.is_service),
        by = %user.user_id,
        "product created"
    );
    Ok(ApiResponse::success(
        "Product created",
        product_from_entity(state.images.as_ref(), product).await,
        Some(Meta::empty()),
    ))
}

/// Replace every editable field of a product. The image is managed separately.
pub async fn update_product(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: ProductRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_designer(user)?;
    payload.validate()?;
    let existing = find_product(&state.orm, id).await?;
    if let Some(category_id) = payload.category_id {
        ensure_category_exists(&state.orm, category_id).await?;
    }

    let mut active: ActiveModel = existing.into();
    active.name = Set(payload.name.trim().to_string());
    active.description = Set(clean_text(payload.description.clone()));
    active.price = Set(payload.price);
    active.category_id = Set(payload.category_id);
    active.is_service = Set(is_service_type(&payload.product_type));
    active.is_active = Set(payload.is_active);
    let product = active.update(&state.orm).await?;

    tracing::info!(product_id = %product.id, by = %user.user_id, "product updated");
    Ok(ApiResponse::success(
        "Updated",
        product_from_entity(state.images.as_ref(), product).await,
        Some(Meta::empty()),
    ))
}

/// Delete a product that no order or appointment refers to, then drop its image.
pub async fn delete_product(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_designer(user)?;

    let txn = state.orm.begin().await?;
    let product = find_product(&txn, id).await?;

    let ordered = OrderItems::find()
        .filter(ItemCol::ProductId.eq(id))
        .count(&txn)
        .await?;
    if ordered > 0 {
        return Err(AppError::Conflict(format!(
            "Product '{}' appears in {} order line(s) and cannot be deleted; deactivate it instead",
            product.name, ordered
        )));
    }

    let booked = Appointments::find()
        .filter(ApptCol::ServiceId.eq(id))
        .count(&txn)
        .await?;
    if booked > 0 {
        return Err(AppError::Conflict(format!(
            "Service '{}' has {} appointment(s) and cannot be deleted; deactivate it instead",
            product.name, booked
        )));
    }

    Products::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;

    if let Some(url) = product.image_url.as_deref() {
        state.images.delete_image(url).await;
    }

    tracing::info!(product_id = %id, by = %user.user_id, "product deleted");
    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({ "id": id }),
        Some(Meta::empty()),
    ))
}

/// Store a new product image. The previous file is only removed once the new
/// URL has been written to the product row.
pub async fn replace_image(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    upload: ImageUpload,
) -> AppResult<ApiResponse<Product>> {
    ensure_designer(user)?;
    let existing = find_product(&state.orm, id).await?;
    if upload.bytes.len() > state.config.max_upload_bytes {
        return Err(AppError::validation(
            "image",
            format!(
                "Image must not exceed {} bytes",
                state.config.max_upload_bytes
            ),
        ));
    }

    let new_url = match state.images.save_image(upload, PRODUCT_IMAGE_FOLDER).await? {
        Some(url) => url,
        None => return Err(AppError::validation("image", "Image file is empty")),
    };

    let old_url = existing.image_url.clone();
    let mut active: ActiveModel = existing.into();
    active.image_url = Set(Some(new_url.clone()));
    let product = match active.update(&state.orm).await {
        Ok(p) => p,
        Err(err) => {
            state.images.delete_image(&new_url).await;
            return Err(err.into());
        }
    };

    if let Some(old) = old_url.as_deref().filter(|old| *old != new_url) {
        state.images.delete_image(old).await;
    }

    tracing::info!(product_id = %product.id, image = %new_url, "product image replaced");
    Ok(ApiResponse::success(
        "Image updated",
        product_from_entity(state.images.as_ref(), product).await,
        Some(Meta::empty()),
    ))
}

async fn paged_products(
    state: &AppState,
    finder: Select<Products>,
    pagination: Pagination,
    message: &str,
) -> AppResult<ApiResponse<ProductList>> {
    let (page, limit, offset) = pagination.normalize();
    let total = finder.clone().count(&state.orm).await?;

    let models = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?;

    let mut items = Vec::with_capacity(models.len());
    for model in models {
        items.push(product_from_entity(state.images.as_ref(), model).await);
    }

    let meta = Meta::paged(page, limit, total);
    Ok(ApiResponse::success(message, ProductList { items }, Some(meta)))
}

pub(crate) async fn find_product<C: ConnectionTrait>(db: &C, id: Uuid) -> AppResult<ProductModel> {
    match Products::find_by_id(id).one(db).await? {
        Some(p) => Ok(p),
        None => Err(AppError::NotFound),
    }
}

async fn ensure_category_exists<C: ConnectionTrait>(db: &C, category_id: Uuid) -> AppResult<()> {
    match find_category(db, category_id).await {
        Ok(_) => Ok(()),
        Err(AppError::NotFound) => Err(AppError::validation(
            "category_id",
            "Category does not exist",
        )),
        Err(err) => Err(err),
    }
}

/// Lowercased `%search%` with the search text's own `\`, `%` and `_` escaped,
/// so they match literally.
fn contains_pattern(search: &str) -> String {
    let mut pattern = String::with_capacity(search.len() + 2);
    pattern.push('%');
    for c in search.to_lowercase().chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

fn clean_text(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

pub(crate) async fn product_from_entity(images: &dyn ImageStore, model: ProductModel) -> Product {
    let image_url = images.safe_image_url(model.image_url.as_deref()).await;
    Product {
        id: model.id,
        name: model.name,
        description: model.description,
        price: model.price,
        category_id: model.category_id,
        product_type: product_type_of(model.is_service).to_string(),
        is_service: model.is_service,
        is_active: model.is_active,
        image_url,
        created_at: model.created_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_wildcards_are_escaped() {
        assert_eq!(contains_pattern("Logo"), "%logo%");
        assert_eq!(contains_pattern("50%"), "%50\\%%");
        assert_eq!(contains_pattern("a_b"), "%a\\_b%");
        assert_eq!(contains_pattern("c:\\d"), "%c:\\\\d%");
    }
}
