use sea_orm_migration::prelude::*;

use super::{m20250301_000001_identity::Users, m20250301_000002_catalog::Products};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum ServiceAppointments {
    Table,
    Id,
    ClientId,
    ServiceId,
    AppointmentAt,
    DurationMinutes,
    Status,
    Notes,
    CreatedAt,
    UpdatedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ServiceAppointments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ServiceAppointments::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ServiceAppointments::ClientId).uuid().not_null())
                    .col(ColumnDef::new(ServiceAppointments::ServiceId).uuid().not_null())
                    .col(
                        ColumnDef::new(ServiceAppointments::AppointmentAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ServiceAppointments::DurationMinutes)
                            .integer()
                            .not_null()
                            .default(60),
                    )
                    .col(
                        ColumnDef::new(ServiceAppointments::Status)
                            .string_len(20)
                            .not_null()
                            .default("booked"),
                    )
                    .col(ColumnDef::new(ServiceAppointments::Notes).text())
                    .col(
                        ColumnDef::new(ServiceAppointments::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ServiceAppointments::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-service_appointments-client_id")
                            .from(ServiceAppointments::Table, ServiceAppointments::ClientId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-service_appointments-service_id")
                            .from(ServiceAppointments::Table, ServiceAppointments::ServiceId)
                            .to(Products::Table, Products::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-service_appointments-service_id-appointment_at")
                    .table(ServiceAppointments::Table)
                    .col(ServiceAppointments::ServiceId)
                    .col(ServiceAppointments::AppointmentAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ServiceAppointments::Table).to_owned())
            .await?;
        Ok(())
    }
}
