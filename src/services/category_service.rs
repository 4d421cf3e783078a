use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    dto::categories::{CategoryList, CategoryRequest},
    entity::{
        categories::{
            ActiveModel as CategoryActive, Column as CategoryCol, Entity as Categories,
            Model as CategoryModel,
        },
        products::{Column as ProdCol, Entity as Products},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_designer},
    models::Category,
    response::{ApiResponse, Meta},
    state::AppState,
};

pub async fn list_categories(state: &AppState) -> AppResult<ApiResponse<CategoryList>> {
    let categories = Categories::find()
        .order_by_asc(CategoryCol::Name)
        .all(&state.orm)
        .await?;

    let counts: HashMap<Uuid, i64> = Products::find()
        .select_only()
        .column(ProdCol::CategoryId)
        .column_as(ProdCol::Id.count(), "product_count")
        .filter(ProdCol::CategoryId.is_not_null())
        .group_by(ProdCol::CategoryId)
        .into_tuple::<(Option<Uuid>, i64)>()
        .all(&state.orm)
        .await?
        .into_iter()
        .filter_map(|(id, count)| id.map(|id| (id, count)))
        .collect();

    let items = categories
        .into_iter()
        .map(|c| {
            let count = counts.get(&c.id).copied().unwrap_or(0);
            category_from_entity(c, count.max(0) as u64)
        })
        .collect();

    Ok(ApiResponse::success(
        "Categories",
        CategoryList { items },
        Some(Meta::empty()),
    ))
}

pub async fn get_category(state: &AppState, id: Uuid) -> AppResult<ApiResponse<Category>> {
    let category = find_category(&state.orm, id).await?;
    let count = count_products(&state.orm, id).await?;
    Ok(ApiResponse::success(
        "Category",
        category_from_entity(category, count),
        Some(Meta::empty()),
    ))
}

pub async fn create_category(
    state: &AppState,
    user: &AuthUser,
    payload: CategoryRequest,
) -> AppResult<ApiResponse<Category>> {
    ensure_designer(user)?;
    payload.validate()?;

    let category = CategoryActive {
        id: Set(Uuid::new_v4()),
        name: Set(payload.name.trim().to_string()),
        description: Set(clean_description(payload.description)),
        created_at: Set(Utc::now()),
    }
    .insert(&state.orm)
    .await?;

    tracing::info!(category_id = %category.id, by = %user.user_id, "category created");
    Ok(ApiResponse::success(
        "Category created",
        category_from_entity(category, 0),
        Some(Meta::empty()),
    ))
}

pub async fn update_category(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: CategoryRequest,
) -> AppResult<ApiResponse<Category>> {
    ensure_designer(user)?;
    payload.validate()?;

    let existing = find_category(&state.orm, id).await?;
    let mut active: CategoryActive = existing.into();
    active.name = Set(payload.name.trim().to_string());
    active.description = Set(clean_description(payload.description));
    let category = active.update(&state.orm).await?;
    let count = count_products(&state.orm, id).await?;

    tracing::info!(category_id = %category.id, by = %user.user_id, "category updated");
    Ok(ApiResponse::success(
        "Category updated",
        category_from_entity(category, count),
        Some(Meta::empty()),
    ))
}

/// Delete an empty category. Categories that still own products are left untouched.
pub async fn delete_category(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_designer(user)?;

    let txn = state.orm.begin().await?;
    let category = find_category(&txn, id).await?;
    let product_count = count_products(&txn, id).await?;
    if product_count > 0 {
        return Err(AppError::Conflict(format!(
            "Category '{}' still has {} product(s); reassign or delete them first",
            category.name, product_count
        )));
    }

    Categories::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;

    tracing::info!(category_id = %id, by = %user.user_id, "category deleted");
    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({ "id": id }),
        Some(Meta::empty()),
    ))
}

pub(crate) async fn find_category<C: ConnectionTrait>(db: &C, id: Uuid) -> AppResult<CategoryModel> {
    match Categories::find_by_id(id).one(db).await? {
        Some(c) => Ok(c),
        None => Err(AppError::NotFound),
    }
}

async fn count_products<C: ConnectionTrait>(db: &C, category_id: Uuid) -> AppResult<u64> {
    let count = Products::find()
        .filter(ProdCol::CategoryId.eq(category_id))
        .count(db)
        .await?;
    Ok(count)
}

fn clean_description(description: Option<String>) -> Option<String> {
    description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
}

fn category_from_entity(model: CategoryModel, product_count: u64) -> Category {
    Category {
        id: model.id,
        name: model.name,
        description: model.description,
        product_count,
        created_at: model.created_at,
    }
}
