//! SeaORM implementation of VehicleRepository

use std::str::FromStr;

use async_trait::async_trait;
use chrono::Utc;
use log::debug;
use rust_decimal::Decimal;
use sea_orm::prelude::Expr;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

use crate::domain::vehicle::{Vehicle, VehicleRepository, VehicleStatus};
use crate::domain::{DomainError, DomainResult};
use crate::infrastructure::database::entities::vehicle;

pub struct SeaOrmVehicleRepository {
    db: DatabaseConnection,
}

impl SeaOrmVehicleRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

// ── Conversion helpers ──────────────────────────────────────────

pub(crate) fn parse_decimal(column: &str, text: &str) -> DomainResult<Decimal> {
    Decimal::from_str(text)
        .map_err(|e| DomainError::Unexpected(format!("Corrupt {} value '{}': {}", column, text, e)))
}

pub(crate) fn model_to_domain(m: vehicle::Model) -> DomainResult<Vehicle> {
    let status = VehicleStatus::parse(&m.status).ok_or_else(|| {
        DomainError::Unexpected(format!("Unknown status '{}' on vehicle {}", m.status, m.id))
    })?;

    Ok(Vehicle {
        id: m.id,
        brand: m.brand,
        model: m.model,
        license_plate: m.license_plate,
        daily_rate: parse_decimal("daily_rate", &m.daily_rate)?,
        status,
        created_at: m.created_at,
        updated_at: m.updated_at,
    })
}

// ── VehicleRepository impl ──────────────────────────────────────

#[async_trait]
impl VehicleRepository for SeaOrmVehicleRepository {
    async fn find_by_id(&self, id: i32) -> DomainResult<Option<Vehicle>> {
        vehicle::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .map(model_to_domain)
            .transpose()
    }

    async fn find_many(&self, ids: &[i32]) -> DomainResult<Vec<Vehicle>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        vehicle::Entity::find()
            .filter(vehicle::Column::Id.is_in(ids.iter().copied()))
            .all(&self.db)
            .await?
            .into_iter()
            .map(model_to_domain)
            .collect()
    }

    async fn set_status(&self, id: i32, status: VehicleStatus) -> DomainResult<()> {
        debug!("Setting vehicle {} status to {}", id, status);

        let result = vehicle::Entity::update_many()
            .col_expr(vehicle::Column::Status, Expr::value(status.as_str()))
            .col_expr(vehicle::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(vehicle::Column::Id.eq(id))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(DomainError::not_found("Vehicle", "id", id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::database::testing;

    #[tokio::test]
    async fn find_many_skips_unknown_ids() {
        let (_dir, db) = testing::temp_db().await;
        let a = testing::seed_vehicle(&db, "350000", VehicleStatus::Available).await;
        let b = testing::seed_vehicle(&db, "420000.50", VehicleStatus::Maintenance).await;

        let repo = SeaOrmVehicleRepository::new(db);
        let mut found = repo.find_many(&[a, b, 9_999]).await.unwrap();
        found.sort_by_key(|v| v.id);

        assert_eq!(found.len(), 2);
        assert_eq!(found[0].daily_rate, Decimal::from(350_000));
        assert_eq!(found[1].daily_rate, Decimal::from_str("420000.50").unwrap());
        assert_eq!(found[1].status, VehicleStatus::Maintenance);
    }

    #[tokio::test]
    async fn set_status_persists_and_reports_missing() {
        let (_dir, db) = testing::temp_db().await;
        let id = testing::seed_vehicle(&db, "100", VehicleStatus::Available).await;
        let repo = SeaOrmVehicleRepository::new(db);

        repo.set_status(id, VehicleStatus::Maintenance).await.unwrap();
        let v = repo.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(v.status, VehicleStatus::Maintenance);

        let err = repo.set_status(9_999, VehicleStatus::Available).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { entity: "Vehicle", .. }));
    }
}
