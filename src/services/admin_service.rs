use chrono::Utc;
use sea_orm::{ActiveModelTrait, EntityTrait, Set, TransactionTrait};
use uuid::Uuid;

use crate::{
    dto::orders::{ChangeStatusRequest, OrderDetails, OrderList},
    entity::{
        order_status_history::ActiveModel as HistoryActive,
        order_statuses::Entity as OrderStatuses,
        orders::{ActiveModel as OrderActive, Entity as Orders},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_designer},
    models::OrderStatusKind,
    response::{ApiResponse, Meta},
    routes::params::OrderListQuery,
    services::order_service::{list_orders_for, load_order_details},
    state::AppState,
};

pub async fn list_all_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    ensure_designer(user)?;
    list_orders_for(&state.orm, None, query).await
}

pub async fn get_order_admin(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<OrderDetails>> {
    ensure_designer(user)?;
    let order = Orders::find_by_id(id).one(&state.orm).await?;
    let order = match order {
        Some(o) => o,
        None => return Err(AppError::NotFound),
    };

    let details = load_order_details(&state.orm, order).await?;
    Ok(ApiResponse::success("Order", details, Some(Meta::empty())))
}

/// Move an order to another status. The new current status and the history
/// row recording who changed it are committed together or not at all.
pub async fn change_order_status(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: ChangeStatusRequest,
) -> AppResult<ApiResponse<OrderDetails>> {
    ensure_designer(user)?;
    payload.validate()?;

    let txn = state.orm.begin().await?;

    let order = Orders::find_by_id(id).one(&txn).await?;
    let order = match order {
        Some(o) => o,
        None => return Err(AppError::NotFound),
    };

    let target = OrderStatuses::find_by_id(payload.status_id).one(&txn).await?;
    let target = match target {
        Some(s) => s,
        None => return Err(AppError::validation("status_id", "Unknown order status")),
    };
    let current = OrderStatuses::find_by_id(order.current_status_id)
        .one(&txn)
        .await?;
    let current_name = current
        .map(|s| s.name)
        .unwrap_or_else(|| order.current_status_id.to_string());

    let from = OrderStatusKind::from_id(order.current_status_id);
    let to = OrderStatusKind::from_id(target.id);
    let allowed = match (from, to) {
        (Some(from), Some(to)) => from.can_transition_to(to),
        _ => false,
    };
    if !allowed {
        return Err(AppError::InvalidTransition {
            from: current_name,
            to: target.name,
        });
    }

    let now = Utc::now();
    let mut active: OrderActive = order.into();
    active.current_status_id = Set(target.id);
    active.updated_at = Set(now);
    let order = active.update(&txn).await?;

    let comment = payload
        .comment
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty());
    HistoryActive {
        order_id: Set(order.id),
        status_id: Set(target.id),
        changed_at: Set(now),
        changed_by: Set(user.user_id),
        comment: Set(comment),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let details = load_order_details(&txn, order).await?;
    txn.commit().await?;

    tracing::info!(
        order_id = %id,
        from = %current_name,
        to = %target.name,
        by = %user.user_id,
        "order status changed"
    );
    Ok(ApiResponse::success(
        "Order status updated",
        details,
        Some(Meta::empty()),
    ))
}

/// Delete an order together with its lines and status history.
pub async fn delete_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_designer(user)?;
    let result = Orders::delete_by_id(id).exec(&state.orm).await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    tracing::info!(order_id = %id, by = %user.user_id, "order deleted");
    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({ "id": id }),
        Some(Meta::empty()),
    ))
}
