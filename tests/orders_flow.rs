mod common;

use design_studio_api::{
    dto::orders::{ChangeStatusRequest, OrderLineRequest, PlaceOrderRequest},
    entity::{
        order_items::{Column as ItemCol, Entity as OrderItems},
        order_status_history::{Column as HistoryCol, Entity as StatusHistory},
        orders::Entity as Orders,
    },
    error::AppError,
    middleware::auth::AuthUser,
    models::{OrderStatusKind, Product},
    routes::params::OrderListQuery,
    services::{admin_service, order_service, product_service},
    state::AppState,
};
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use uuid::Uuid;

struct Fixture {
    designer: AuthUser,
    client: AuthUser,
    mug: Product,
    poster: Product,
}

async fn fixture(state: &AppState) -> anyhow::Result<Fixture> {
    let designer = common::designer(state).await?;
    let client = common::client(state).await?;
    let mug = common::product(state, &designer, common::product_request("Mug", 1_500, "product"))
        .await?;
    let poster = common::product(
        state,
        &designer,
        common::product_request("Poster", 4_000, "product"),
    )
    .await?;
    Ok(Fixture {
        designer,
        client,
        mug,
        poster,
    })
}

fn order_of(lines: &[(Uuid, i32)]) -> PlaceOrderRequest {
    PlaceOrderRequest {
        items: lines
            .iter()
            .map(|(product_id, quantity)| OrderLineRequest {
                product_id: *product_id,
                quantity: *quantity,
            })
            .collect(),
        notes: Some("Gift wrap please".into()),
    }
}

fn change(status: OrderStatusKind, comment: Option<&str>) -> ChangeStatusRequest {
    ChangeStatusRequest {
        status_id: status.id(),
        comment: comment.map(str::to_string),
    }
}

#[tokio::test]
async fn placed_order_snapshots_prices_and_starts_queued() -> anyhow::Result<()> {
    let app = common::setup().await?;
    let state = &app.state;
    let fx = fixture(state).await?;

    let details = order_service::place_order(
        state,
        &fx.client,
        order_of(&[(fx.mug.id, 2), (fx.poster.id, 1)]),
    )
    .await?
    .data
    .expect("order");

    assert_eq!(details.order.total_amount, 2 * 1_500 + 4_000);
    assert_eq!(details.order.current_status_id, OrderStatusKind::Queued.id());
    assert_eq!(details.status.name, "Queued");
    assert_eq!(details.items.len(), 2);
    let line_sum: i64 = details.items.iter().map(|i| i.line_total).sum();
    assert_eq!(line_sum, details.order.total_amount);

    assert_eq!(details.history.len(), 1);
    assert_eq!(details.history[0].status_id, OrderStatusKind::Queued.id());
    assert_eq!(details.history[0].changed_by, fx.client.user_id);
    assert_eq!(details.history[0].comment.as_deref(), Some("Order created"));

    // Later price changes leave the order untouched.
    let mut request = common::product_request("Mug", 9_999, "product");
    request.description = None;
    product_service::update_product(state, &fx.designer, fx.mug.id, request).await?;
    let reloaded = order_service::get_my_order(state, &fx.client, details.order.id)
        .await?
        .data
        .expect("order");
    assert_eq!(reloaded.order.total_amount, 7_000);
    let mug_line = reloaded
        .items
        .iter()
        .find(|i| i.product_id == fx.mug.id)
        .expect("mug line");
    assert_eq!(mug_line.unit_price, 1_500);
    Ok(())
}

#[tokio::test]
async fn invalid_orders_are_rejected_without_side_effects() -> anyhow::Result<()> {
    let app = common::setup().await?;
    let state = &app.state;
    let fx = fixture(state).await?;

    let empty = order_service::place_order(state, &fx.client, order_of(&[])).await;
    assert!(matches!(empty, Err(AppError::Validation(_))));

    let zero = order_service::place_order(state, &fx.client, order_of(&[(fx.mug.id, 0)])).await;
    assert!(matches!(zero, Err(AppError::Validation(_))));

    let unknown =
        order_service::place_order(state, &fx.client, order_of(&[(Uuid::new_v4(), 1)])).await;
    assert!(matches!(unknown, Err(AppError::Validation(_))));

    let mut retired = common::product_request("Poster", 4_000, "product");
    retired.is_active = false;
    product_service::update_product(state, &fx.designer, fx.poster.id, retired).await?;
    let Err(AppError::Validation(fields)) = order_service::place_order(
        state,
        &fx.client,
        order_of(&[(fx.mug.id, 1), (fx.poster.id, 1)]),
    )
    .await
    else {
        panic!("expected validation error");
    };
    assert_eq!(fields[0].field, "items[1].product_id");

    let designer_order =
        order_service::place_order(state, &fx.designer, order_of(&[(fx.mug.id, 1)])).await;
    assert!(matches!(designer_order, Err(AppError::Forbidden)));

    assert_eq!(Orders::find().count(&state.orm).await?, 0);
    assert_eq!(OrderItems::find().count(&state.orm).await?, 0);
    Ok(())
}

#[tokio::test]
async fn status_change_updates_order_and_appends_history() -> anyhow::Result<()> {
    let app = common::setup().await?;
    let state = &app.state;
    let fx = fixture(state).await?;
    let order = order_service::place_order(state, &fx.client, order_of(&[(fx.mug.id, 1)]))
        .await?
        .data
        .expect("order")
        .order;

    let steps = [
        (OrderStatusKind::InProgress, Some("Started sketches")),
        (OrderStatusKind::Queued, None),
        (OrderStatusKind::InProgress, Some("Back on it")),
        (OrderStatusKind::Done, Some("Delivered")),
    ];
    for (expected_len, (status, comment)) in (2..).zip(steps) {
        let details = admin_service::change_order_status(
            state,
            &fx.designer,
            order.id,
            change(status, comment),
        )
        .await?
        .data
        .expect("order");

        assert_eq!(details.order.current_status_id, status.id());
        assert_eq!(details.history.len(), expected_len);
        let last = details.history.last().expect("history");
        assert_eq!(last.status_id, status.id());
        assert_eq!(last.changed_by, fx.designer.user_id);
        assert_eq!(last.changed_by_name, "Test User");
        assert_eq!(last.comment.as_deref(), comment);
    }

    let history_rows = StatusHistory::find()
        .filter(HistoryCol::OrderId.eq(order.id))
        .count(&state.orm)
        .await?;
    assert_eq!(history_rows, 5);
    Ok(())
}

#[tokio::test]
async fn rejected_transitions_leave_order_unchanged() -> anyhow::Result<()> {
    let app = common::setup().await?;
    let state = &app.state;
    let fx = fixture(state).await?;
    let order_id = order_service::place_order(state, &fx.client, order_of(&[(fx.mug.id, 1)]))
        .await?
        .data
        .expect("order")
        .order
        .id;

    let same = admin_service::change_order_status(
        state,
        &fx.designer,
        order_id,
        change(OrderStatusKind::Queued, None),
    )
    .await;
    assert!(matches!(same, Err(AppError::InvalidTransition { .. })));

    let unknown = admin_service::change_order_status(
        state,
        &fx.designer,
        order_id,
        ChangeStatusRequest {
            status_id: 42,
            comment: None,
        },
    )
    .await;
    assert!(matches!(unknown, Err(AppError::Validation(_))));

    let long_comment = "x".repeat(501);
    let too_long = admin_service::change_order_status(
        state,
        &fx.designer,
        order_id,
        change(OrderStatusKind::Done, Some(long_comment.as_str())),
    )
    .await;
    assert!(matches!(too_long, Err(AppError::Validation(_))));

    let by_client = admin_service::change_order_status(
        state,
        &fx.client,
        order_id,
        change(OrderStatusKind::Done, None),
    )
    .await;
    assert!(matches!(by_client, Err(AppError::Forbidden)));

    admin_service::change_order_status(
        state,
        &fx.designer,
        order_id,
        change(OrderStatusKind::Cancelled, Some("Client withdrew")),
    )
    .await?;
    for next in OrderStatusKind::ALL {
        let result =
            admin_service::change_order_status(state, &fx.designer, order_id, change(next, None))
                .await;
        let Err(AppError::InvalidTransition { from, .. }) = result else {
            panic!("cancelled order moved to {next:?}");
        };
        assert_eq!(from, "Cancelled");
    }

    let stored = Orders::find_by_id(order_id)
        .one(&state.orm)
        .await?
        .expect("order");
    assert_eq!(stored.current_status_id, OrderStatusKind::Cancelled.id());
    let history_rows = StatusHistory::find()
        .filter(HistoryCol::OrderId.eq(order_id))
        .count(&state.orm)
        .await?;
    assert_eq!(history_rows, 2);
    Ok(())
}

#[tokio::test]
async fn deleting_an_order_cascades_to_items_and_history() -> anyhow::Result<()> {
    let app = common::setup().await?;
    let state = &app.state;
    let fx = fixture(state).await?;
    let order_id = order_service::place_order(
        state,
        &fx.client,
        order_of(&[(fx.mug.id, 1), (fx.poster.id, 3)]),
    )
    .await?
    .data
    .expect("order")
    .order
    .id;
    admin_service::change_order_status(
        state,
        &fx.designer,
        order_id,
        change(OrderStatusKind::InProgress, None),
    )
    .await?;

    admin_service::delete_order(state, &fx.designer, order_id).await?;

    assert!(Orders::find_by_id(order_id).one(&state.orm).await?.is_none());
    let items = OrderItems::find()
        .filter(ItemCol::OrderId.eq(order_id))
        .count(&state.orm)
        .await?;
    assert_eq!(items, 0);
    let history = StatusHistory::find()
        .filter(HistoryCol::OrderId.eq(order_id))
        .count(&state.orm)
        .await?;
    assert_eq!(history, 0);

    let again = admin_service::delete_order(state, &fx.designer, order_id).await;
    assert!(matches!(again, Err(AppError::NotFound)));

    // With the order gone the products are free to delete.
    product_service::delete_product(state, &fx.designer, fx.mug.id).await?;
    Ok(())
}

#[tokio::test]
async fn clients_only_see_their_own_orders() -> anyhow::Result<()> {
    let app = common::setup().await?;
    let state = &app.state;
    let fx = fixture(state).await?;
    let other = common::client(state).await?;

    let mine = order_service::place_order(state, &fx.client, order_of(&[(fx.mug.id, 1)]))
        .await?
        .data
        .expect("order")
        .order;
    order_service::place_order(state, &other, order_of(&[(fx.poster.id, 1)])).await?;

    let listed = order_service::list_my_orders(state, &fx.client, OrderListQuery::default())
        .await?;
    let items = listed.data.expect("orders").items;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].id, mine.id);
    assert_eq!(listed.meta.expect("meta").total, Some(1));

    let foreign = order_service::get_my_order(state, &other, mine.id).await;
    assert!(matches!(foreign, Err(AppError::NotFound)));

    let all = admin_service::list_all_orders(state, &fx.designer, OrderListQuery::default())
        .await?
        .data
        .expect("orders");
    assert_eq!(all.items.len(), 2);

    admin_service::change_order_status(
        state,
        &fx.designer,
        mine.id,
        change(OrderStatusKind::InProgress, None),
    )
    .await?;
    let in_progress = admin_service::list_all_orders(
        state,
        &fx.designer,
        OrderListQuery {
            status_id: Some(OrderStatusKind::InProgress.id()),
            ..Default::default()
        },
    )
    .await?
    .data
    .expect("orders");
    assert_eq!(in_progress.items.len(), 1);
    assert_eq!(in_progress.items[0].id, mine.id);
    Ok(())
}

#[tokio::test]
async fn statuses_are_listed_in_display_order() -> anyhow::Result<()> {
    let app = common::setup().await?;
    let statuses = order_service::list_statuses(&app.state)
        .await?
        .data
        .expect("statuses");
    let names: Vec<_> = statuses.items.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, ["Queued", "In progress", "Done", "Cancelled"]);
    let ids: Vec<_> = statuses.items.iter().map(|s| s.id).collect();
    assert_eq!(ids, [1, 2, 3, 4]);
    Ok(())
}
