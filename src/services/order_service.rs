use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    dto::orders::{OrderDetails, OrderList, OrderStatusList, PlaceOrderRequest},
    entity::{
        order_items::{ActiveModel as OrderItemActive, Column as OrderItemCol, Entity as OrderItems},
        order_status_history::{
            ActiveModel as HistoryActive, Column as HistoryCol, Entity as StatusHistory,
        },
        order_statuses::{Column as StatusCol, Entity as OrderStatuses, Model as StatusModel},
        orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders, Model as OrderModel},
        products::{Column as ProdCol, Entity as Products},
        users::{Column as UserCol, Entity as Users},
    },
    error::{AppError, AppResult, FieldErrors},
    middleware::auth::{AuthUser, ensure_client},
    models::{Order, OrderItem, OrderStatus, OrderStatusKind, StatusHistoryEntry},
    response::{ApiResponse, Meta},
    routes::params::{OrderListQuery, SortOrder},
    state::AppState,
};

const ORDER_CREATED_COMMENT: &str = "Order created";

/// Create an order from the client's selection. Prices are copied from the
/// products as they are now; the order, its lines and the first history row
/// are written in one transaction.
pub async fn place_order(
    state: &AppState,
    user: &AuthUser,
    payload: PlaceOrderRequest,
) -> AppResult<ApiResponse<OrderDetails>> {
    ensure_client(user)?;
    payload.validate()?;

    let txn = state.orm.begin().await?;

    let product_ids: Vec<Uuid> = payload.items.iter().map(|l| l.product_id).collect();
    let prices: HashMap<Uuid, (i64, bool)> = Products::find()
        .filter(ProdCol::Id.is_in(product_ids))
        .all(&txn)
        .await?
        .into_iter()
        .map(|p| (p.id, (p.price, p.is_active)))
        .collect();

    let mut errors = FieldErrors::new();
    let mut lines = Vec::with_capacity(payload.items.len());
    let mut total_amount: i64 = 0;
    for (idx, line) in payload.items.iter().enumerate() {
        let field = format!("items[{idx}].product_id");
        match prices.get(&line.product_id) {
            None => errors.push(field, "Product does not exist"),
            Some((_, false)) => errors.push(field, "Product is not available"),
            Some((price, true)) => {
                let line_total = price
                    .checked_mul(i64::from(line.quantity))
                    .and_then(|t| total_amount.checked_add(t));
                match line_total {
                    Some(t) => total_amount = t,
                    None => errors.push(format!("items[{idx}].quantity"), "Order total is too large"),
                }
                lines.push((line.product_id, line.quantity, *price));
            }
        }
    }
    errors.into_result()?;

    let now = Utc::now();
    let order = OrderActive {
        id: Set(Uuid::new_v4()),
        client_id: Set(user.user_id),
        order_date: Set(now),
        total_amount: Set(total_amount),
        current_status_id: Set(OrderStatusKind::Queued.id()),
        notes: Set(payload
            .notes
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())),
        updated_at: Set(now),
    }
    .insert(&txn)
    .await?;

    for (product_id, quantity, unit_price) in lines {
        OrderItemActive {
            id: Set(Uuid::new_v4()),
            order_id: Set(order.id),
            product_id: Set(product_id),
            quantity: Set(quantity),
            unit_price: Set(unit_price),
        }
        .insert(&txn)
        .await?;
    }

    HistoryActive {
        order_id: Set(order.id),
        status_id: Set(OrderStatusKind::Queued.id()),
        changed_at: Set(now),
        changed_by: Set(user.user_id),
        comment: Set(Some(ORDER_CREATED_COMMENT.to_string())),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let details = load_order_details(&txn, order).await?;
    txn.commit().await?;

    tracing::info!(
        order_id = %details.order.id,
        client_id = %user.user_id,
        total_amount = details.order.total_amount,
        "order placed"
    );
    Ok(ApiResponse::success(
        "Order placed",
        details,
        Some(Meta::empty()),
    ))
}

pub async fn list_my_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    ensure_client(user)?;
    list_orders_for(&state.orm, Some(user.user_id), query).await
}

pub async fn get_my_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<OrderDetails>> {
    ensure_client(user)?;
    let order = Orders::find()
        .filter(
            Condition::all()
                .add(OrderCol::ClientId.eq(user.user_id))
                .add(OrderCol::Id.eq(id)),
        )
        .one(&state.orm)
        .await?;
    let order = match order {
        Some(o) => o,
        None => return Err(AppError::NotFound),
    };

    let details = load_order_details(&state.orm, order).await?;
    Ok(ApiResponse::success("Order", details, Some(Meta::empty())))
}

pub async fn list_statuses(state: &AppState) -> AppResult<ApiResponse<OrderStatusList>> {
    let items = OrderStatuses::find()
        .order_by_asc(StatusCol::DisplayOrder)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(OrderStatus::from)
        .collect();
    Ok(ApiResponse::success(
        "Order statuses",
        OrderStatusList { items },
        Some(Meta::empty()),
    ))
}

/// Paginated order listing, restricted to one client when `client_id` is given.
pub(crate) async fn list_orders_for<C: ConnectionTrait>(
    db: &C,
    client_id: Option<Uuid>,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    let (page, limit, offset) = query.pagination().normalize();

    let mut condition = Condition::all();
    if let Some(client_id) = client_id {
        condition = condition.add(OrderCol::ClientId.eq(client_id));
    }
    if let Some(status_id) = query.status_id {
        condition = condition.add(OrderCol::CurrentStatusId.eq(status_id));
    }

    let mut finder = Orders::find().filter(condition);
    finder = match query.sort_order.unwrap_or(SortOrder::Desc) {
        SortOrder::Asc => finder.order_by_asc(OrderCol::OrderDate),
        SortOrder::Desc => finder.order_by_desc(OrderCol::OrderDate),
    };

    let total = finder.clone().count(db).await?;
    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(db)
        .await?
        .into_iter()
        .map(order_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "Orders",
        OrderList { items },
        Some(Meta::paged(page, limit, total)),
    ))
}

/// Order with its current status, lines and full status history.
pub(crate) async fn load_order_details<C: ConnectionTrait>(
    db: &C,
    order: OrderModel,
) -> AppResult<OrderDetails> {
    let statuses: HashMap<i32, StatusModel> = OrderStatuses::find()
        .all(db)
        .await?
        .into_iter()
        .map(|s| (s.id, s))
        .collect();

    let status = match statuses.get(&order.current_status_id) {
        Some(s) => OrderStatus::from(s.clone()),
        None => {
            return Err(AppError::Internal(anyhow::anyhow!(
                "order {} references missing status {}",
                order.id,
                order.current_status_id
            )));
        }
    };

    let items: Vec<OrderItem> = OrderItems::find()
        .filter(OrderItemCol::OrderId.eq(order.id))
        .order_by_asc(OrderItemCol::ProductId)
        .all(db)
        .await?
        .into_iter()
        .map(OrderItem::from)
        .collect();

    let rows = StatusHistory::find()
        .filter(HistoryCol::OrderId.eq(order.id))
        .order_by_asc(HistoryCol::ChangedAt)
        .order_by_asc(HistoryCol::Id)
        .all(db)
        .await?;

    let actor_ids: Vec<Uuid> = rows.iter().map(|r| r.changed_by).collect();
    let actors: HashMap<Uuid, String> = Users::find()
        .filter(UserCol::Id.is_in(actor_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|u| (u.id, u.full_name))
        .collect();

    let history = rows
        .into_iter()
        .map(|row| StatusHistoryEntry {
            id: row.id,
            status_id: row.status_id,
            status_name: statuses
                .get(&row.status_id)
                .map(|s| s.name.clone())
                .unwrap_or_default(),
            changed_at: row.changed_at,
            changed_by: row.changed_by,
            changed_by_name: actors.get(&row.changed_by).cloned().unwrap_or_default(),
            comment: row.comment,
        })
        .collect();

    Ok(OrderDetails {
        order: order_from_entity(order),
        status,
        items,
        history,
    })
}

pub(crate) fn order_from_entity(model: OrderModel) -> Order {
    Order {
        id: model.id,
        client_id: model.client_id,
        order_date: model.order_date,
        total_amount: model.total_amount,
        current_status_id: model.current_status_id,
        notes: model.notes,
        updated_at: model.updated_at,
    }
}
