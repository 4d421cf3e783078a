use sea_orm::ConnectionTrait;
use sea_orm_migration::prelude::*;

use super::{m20250301_000001_identity::Roles, m20250301_000003_orders::OrderStatuses};

#[derive(DeriveMigrationName)]
pub struct Migration;

const ROLES: [(i32, &str, &str); 2] = [
    (1, "Client", "Customer placing orders and bookings"),
    (2, "Designer", "Studio staff managing the catalog and orders"),
];

const ORDER_STATUSES: [(i32, &str, &str, i32, &str); 4] = [
    (1, "Queued", "Order is waiting to be processed", 1, "#ffc107"),
    (2, "In progress", "Order is being worked on", 2, "#17a2b8"),
    (3, "Done", "Order is completed", 3, "#28a745"),
    (4, "Cancelled", "Order was cancelled", 4, "#dc3545"),
];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        let backend = db.get_database_backend();

        let mut roles = Query::insert();
        roles
            .into_table(Roles::Table)
            .columns([Roles::Id, Roles::Name, Roles::Description])
            .on_conflict(OnConflict::column(Roles::Id).do_nothing().to_owned());
        for (id, name, description) in ROLES {
            roles.values_panic([id.into(), name.into(), description.into()]);
        }
        db.execute(backend.build(&roles)).await?;

        let mut statuses = Query::insert();
        statuses
            .into_table(OrderStatuses::Table)
            .columns([
                OrderStatuses::Id,
                OrderStatuses::Name,
                OrderStatuses::Description,
                OrderStatuses::DisplayOrder,
                OrderStatuses::Color,
            ])
            .on_conflict(OnConflict::column(OrderStatuses::Id).do_nothing().to_owned());
        for (id, name, description, display_order, color) in ORDER_STATUSES {
            statuses.values_panic([
                id.into(),
                name.into(),
                description.into(),
                display_order.into(),
                color.into(),
            ]);
        }
        db.execute(backend.build(&statuses)).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        let backend = db.get_database_backend();

        let statuses = Query::delete()
            .from_table(OrderStatuses::Table)
            .and_where(Expr::col(OrderStatuses::Id).is_in(ORDER_STATUSES.map(|s| s.0)))
            .to_owned();
        db.execute(backend.build(&statuses)).await?;

        let roles = Query::delete()
            .from_table(Roles::Table)
            .and_where(Expr::col(Roles::Id).is_in(ROLES.map(|r| r.0)))
            .to_owned();
        db.execute(backend.build(&roles)).await?;
        Ok(())
    }
}
