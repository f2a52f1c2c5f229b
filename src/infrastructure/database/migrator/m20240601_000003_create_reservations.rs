//! Create reservations table
//!
//! The (vehicle_id, status) index serves the overlap query that runs under
//! the vehicle lock.

use sea_orm_migration::prelude::*;

use super::m20240601_000001_create_accounts::Accounts;
use super::m20240601_000002_create_vehicles::Vehicles;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Reservations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Reservations::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Reservations::VehicleId).integer().not_null())
                    .col(ColumnDef::new(Reservations::AccountId).string().not_null())
                    .col(ColumnDef::new(Reservations::StartDate).date().not_null())
                    .col(ColumnDef::new(Reservations::EndDate).date().not_null())
                    .col(ColumnDef::new(Reservations::TotalCost).string().not_null())
                    .col(
                        ColumnDef::new(Reservations::Status)
                            .string()
                            .not_null()
                            .default("PENDING"),
                    )
                    .col(
                        ColumnDef::new(Reservations::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Reservations::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_reservations_vehicle")
                            .from(Reservations::Table, Reservations::VehicleId)
                            .to(Vehicles::Table, Vehicles::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_reservations_account")
                            .from(Reservations::Table, Reservations::AccountId)
                            .to(Accounts::Table, Accounts::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_reservations_vehicle_status")
                    .table(Reservations::Table)
                    .col(Reservations::VehicleId)
                    .col(Reservations::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_reservations_account")
                    .table(Reservations::Table)
                    .col(Reservations::AccountId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Reservations::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Reservations {
    Table,
    Id,
    VehicleId,
    AccountId,
    StartDate,
    EndDate,
    TotalCost,
    Status,
    CreatedAt,
    UpdatedAt,
}
