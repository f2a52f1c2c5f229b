//! SeaORM implementation of ReservationRepository

use async_trait::async_trait;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};

use super::vehicle_repository::parse_decimal;
use crate::domain::reservation::{Reservation, ReservationRepository, ReservationStatus};
use crate::domain::{DomainError, DomainResult};
use crate::infrastructure::database::entities::reservation;

pub struct SeaOrmReservationRepository {
    db: DatabaseConnection,
}

impl SeaOrmReservationRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

// ── Conversion helpers ──────────────────────────────────────────

pub(crate) fn model_to_domain(m: reservation::Model) -> DomainResult<Reservation> {
    let status = ReservationStatus::parse(&m.status).ok_or_else(|| {
        DomainError::Unexpected(format!("Unknown status '{}' on reservation {}", m.status, m.id))
    })?;

    Ok(Reservation {
        id: m.id,
        vehicle_id: m.vehicle_id,
        account_id: m.account_id,
        start_date: m.start_date,
        end_date: m.end_date,
        total_cost: parse_decimal("total_cost", &m.total_cost)?,
        status,
        created_at: m.created_at,
        updated_at: m.updated_at,
    })
}

fn models_to_domain(models: Vec<reservation::Model>) -> DomainResult<Vec<Reservation>> {
    models.into_iter().map(model_to_domain).collect()
}

// ── ReservationRepository impl ──────────────────────────────────

#[async_trait]
impl ReservationRepository for SeaOrmReservationRepository {
    async fn find_by_id(&self, id: i32) -> DomainResult<Option<Reservation>> {
        reservation::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .map(model_to_domain)
            .transpose()
    }

    async fn find_by_account(&self, account_id: &str) -> DomainResult<Vec<Reservation>> {
        let models = reservation::Entity::find()
            .filter(reservation::Column::AccountId.eq(account_id))
            .order_by_desc(reservation::Column::CreatedAt)
            .order_by_desc(reservation::Column::Id)
            .all(&self.db)
            .await?;
        models_to_domain(models)
    }

    async fn find_all(&self) -> DomainResult<Vec<Reservation>> {
        let models = reservation::Entity::find()
            .order_by_desc(reservation::Column::CreatedAt)
            .order_by_desc(reservation::Column::Id)
            .all(&self.db)
            .await?;
        models_to_domain(models)
    }
}
