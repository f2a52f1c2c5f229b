//! SeaORM implementation of BookingStore
//!
//! Each session owns one `DatabaseTransaction`. The record lock is taken as
//! the transaction's first statement:
//!
//! - PostgreSQL / MySQL: `SELECT ... FOR UPDATE` on the row.
//! - SQLite: no row locks exist, so the session opens with a write to the
//!   row. The write takes the database-wide write lock, and concurrent
//!   sessions wait for it in the driver's busy handler. Sessions for
//!   different vehicles therefore serialize too; deployments that need
//!   parallel admission across vehicles must use PostgreSQL.
//!
//! Committing or dropping the transaction releases the lock.

use async_trait::async_trait;
use chrono::Utc;
use futures_util::future::BoxFuture;
use log::{debug, warn};
use sea_orm::prelude::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    DbBackend, EntityTrait, PaginatorTrait, QueryFilter, QuerySelect, Set, TransactionTrait,
};

use super::reservation_repository::model_to_domain as reservation_to_domain;
use super::vehicle_repository::model_to_domain as vehicle_to_domain;
use crate::domain::ports::{BookingStore, ReservationSession, VehicleSession};
use crate::domain::reservation::{DateRange, NewReservation, Reservation, ReservationStatus};
use crate::domain::vehicle::{Vehicle, VehicleStatus};
use crate::domain::{DomainError, DomainResult};
use crate::infrastructure::database::entities::{reservation, vehicle};

pub struct SeaOrmBookingStore {
    db: DatabaseConnection,
}

impl SeaOrmBookingStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

// ── Lock primitives ─────────────────────────────────────────────

async fn bump_lock_version(txn: &DatabaseTransaction, vehicle_id: i32) -> DomainResult<()> {
    vehicle::Entity::update_many()
        .col_expr(
            vehicle::Column::LockVersion,
            Expr::col(vehicle::Column::LockVersion).add(1),
        )
        .filter(vehicle::Column::Id.eq(vehicle_id))
        .exec(txn)
        .await?;
    Ok(())
}

/// Take the exclusive lock on a vehicle row inside `txn` and read it.
async fn lock_vehicle_row(txn: &DatabaseTransaction, vehicle_id: i32) -> DomainResult<Vehicle> {
    let found = match txn.get_database_backend() {
        DbBackend::Sqlite => {
            bump_lock_version(txn, vehicle_id).await?;
            vehicle::Entity::find_by_id(vehicle_id).one(txn).await?
        }
        _ => {
            let found = vehicle::Entity::find_by_id(vehicle_id)
                .lock_exclusive()
                .one(txn)
                .await?;
            if found.is_some() {
                bump_lock_version(txn, vehicle_id).await?;
            }
            found
        }
    };

    let model = found.ok_or_else(|| DomainError::not_found("Vehicle", "id", vehicle_id))?;
    vehicle_to_domain(model)
}

/// Take the exclusive lock on a reservation row inside `txn` and read it.
async fn lock_reservation_row(
    txn: &DatabaseTransaction,
    reservation_id: i32,
) -> DomainResult<Reservation> {
    let found = match txn.get_database_backend() {
        DbBackend::Sqlite => {
            // no-op write; it only has to be the first statement
            reservation::Entity::update_many()
                .col_expr(
                    reservation::Column::Status,
                    Expr::col(reservation::Column::Status).into(),
                )
                .filter(reservation::Column::Id.eq(reservation_id))
                .exec(txn)
                .await?;
            reservation::Entity::find_by_id(reservation_id).one(txn).await?
        }
        _ => {
            reservation::Entity::find_by_id(reservation_id)
                .lock_exclusive()
                .one(txn)
                .await?
        }
    };

    let model =
        found.ok_or_else(|| DomainError::not_found("Reservation", "id", reservation_id))?;
    reservation_to_domain(model)
}

fn commit_txn(txn: DatabaseTransaction) -> BoxFuture<'static, DomainResult<()>> {
    Box::pin(async move {
        txn.commit().await?;
        Ok(())
    })
}

// ── BookingStore impl ───────────────────────────────────────────

#[async_trait]
impl BookingStore for SeaOrmBookingStore {
    async fn lock_vehicle(&self, vehicle_id: i32) -> DomainResult<Box<dyn VehicleSession>> {
        let txn = self.db.begin().await?;
        let vehicle = lock_vehicle_row(&txn, vehicle_id).await?;
        debug!("Vehicle {} locked", vehicle_id);
        Ok(Box::new(SeaOrmVehicleSession { txn, vehicle }))
    }

    async fn lock_reservation(
        &self,
        reservation_id: i32,
    ) -> DomainResult<Box<dyn ReservationSession>> {
        let txn = self.db.begin().await?;
        let reservation = lock_reservation_row(&txn, reservation_id).await?;
        debug!("Reservation {} locked", reservation_id);
        Ok(Box::new(SeaOrmReservationSession { txn, reservation }))
    }
}

// ── Vehicle session ─────────────────────────────────────────────

struct SeaOrmVehicleSession {
    txn: DatabaseTransaction,
    vehicle: Vehicle,
}

#[async_trait]
impl VehicleSession for SeaOrmVehicleSession {
    fn vehicle(&self) -> &Vehicle {
        &self.vehicle
    }

    async fn has_overlap(&self, period: DateRange) -> DomainResult<bool> {
        let released = ReservationStatus::RELEASED.iter().map(|s| s.as_str());

        let blocking = reservation::Entity::find()
            .filter(reservation::Column::VehicleId.eq(self.vehicle.id))
            .filter(reservation::Column::Status.is_not_in(released))
            .filter(reservation::Column::StartDate.lte(period.end()))
            .filter(reservation::Column::EndDate.gte(period.start()))
            .count(&self.txn)
            .await?;

        Ok(blocking > 0)
    }

    async fn insert_reservation(&mut self, new: NewReservation) -> DomainResult<Reservation> {
        if new.vehicle_id != self.vehicle.id {
            warn!(
                "Refusing to book vehicle {} inside the session for vehicle {}",
                new.vehicle_id, self.vehicle.id
            );
            return Err(DomainError::InvalidRequest(format!(
                "vehicle {} is not locked by this session",
                new.vehicle_id
            )));
        }

        let now = Utc::now();
        let model = reservation::ActiveModel {
            vehicle_id: Set(new.vehicle_id),
            account_id: Set(new.account_id),
            start_date: Set(new.period.start()),
            end_date: Set(new.period.end()),
            total_cost: Set(new.total_cost.to_string()),
            status: Set(ReservationStatus::Pending.as_str().to_string()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.txn)
        .await?;

        reservation_to_domain(model)
    }

    fn commit(self: Box<Self>) -> BoxFuture<'static, DomainResult<()>> {
        commit_txn(self.txn)
    }
}

// ── Reservation session ─────────────────────────────────────────

struct SeaOrmReservationSession {
    txn: DatabaseTransaction,
    reservation: Reservation,
}

#[async_trait]
impl ReservationSession for SeaOrmReservationSession {
    fn reservation(&self) -> &Reservation {
        &self.reservation
    }

    async fn save_reservation(&mut self, updated: &Reservation) -> DomainResult<()> {
        if updated.id != self.reservation.id {
            return Err(DomainError::InvalidRequest(format!(
                "reservation {} is not locked by this session",
                updated.id
            )));
        }

        reservation::Entity::update_many()
            .col_expr(reservation::Column::Status, Expr::value(updated.status.as_str()))
            .col_expr(reservation::Column::UpdatedAt, Expr::value(updated.updated_at))
            .filter(reservation::Column::Id.eq(updated.id))
            .exec(&self.txn)
            .await?;

        self.reservation = updated.clone();
        Ok(())
    }

    async fn set_vehicle_status(&mut self, status: VehicleStatus) -> DomainResult<Vehicle> {
        let current = lock_vehicle_row(&self.txn, self.reservation.vehicle_id).await?;
        debug!(
            "Vehicle {} status {} -> {} (reservation {})",
            current.id, current.status, status, self.reservation.id
        );

        let model = vehicle::ActiveModel {
            id: Set(current.id),
            status: Set(status.as_str().to_string()),
            updated_at: Set(Utc::now()),
            ..Default::default()
        }
        .update(&self.txn)
        .await?;

        vehicle_to_domain(model)
    }

    fn commit(self: Box<Self>) -> BoxFuture<'static, DomainResult<()>> {
        commit_txn(self.txn)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    use super::*;
    use crate::domain::account::AccountRole;
    use crate::infrastructure::database::testing;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn period(a: NaiveDate, b: NaiveDate) -> DateRange {
        DateRange::new(a, b).unwrap()
    }

    async fn setup() -> (tempfile::TempDir, DatabaseConnection, i32) {
        let (dir, db) = testing::temp_db().await;
        testing::seed_account(&db, "acc-1", "budi", AccountRole::User).await;
        let vehicle_id = testing::seed_vehicle(&db, "350000", VehicleStatus::Available).await;
        (dir, db, vehicle_id)
    }

    async fn book(
        store: &SeaOrmBookingStore,
        vehicle_id: i32,
        range: DateRange,
    ) -> Reservation {
        let mut session = store.lock_vehicle(vehicle_id).await.unwrap();
        let rate = session.vehicle().daily_rate;
        let created = session
            .insert_reservation(NewReservation::priced(vehicle_id, "acc-1", range, rate).unwrap())
            .await
            .unwrap();
        session.commit().await.unwrap();
        created
    }

    #[tokio::test]
    async fn locking_missing_vehicle_is_not_found() {
        let (_dir, db, _) = setup().await;
        let store = SeaOrmBookingStore::new(db);

        let err = store.lock_vehicle(9_999).await.err().unwrap();
        assert!(matches!(err, DomainError::NotFound { entity: "Vehicle", .. }));
    }

    #[tokio::test]
    async fn inserted_reservation_is_pending_with_cost() {
        let (_dir, db, vehicle_id) = setup().await;
        let store = SeaOrmBookingStore::new(db);

        let r = book(&store, vehicle_id, period(d(2024, 1, 10), d(2024, 1, 12))).await;
        assert_eq!(r.status, ReservationStatus::Pending);
        assert_eq!(r.total_cost, Decimal::from(1_050_000));
        assert_eq!(r.start_date, d(2024, 1, 10));
        assert_eq!(r.end_date, d(2024, 1, 12));
    }

    #[tokio::test]
    async fn overlap_is_inclusive_and_ignores_released_reservations() {
        let (_dir, db, vehicle_id) = setup().await;
        let store = SeaOrmBookingStore::new(db);
        let existing = book(&store, vehicle_id, period(d(2024, 1, 10), d(2024, 1, 12))).await;

        let session = store.lock_vehicle(vehicle_id).await.unwrap();
        assert!(session.has_overlap(period(d(2024, 1, 12), d(2024, 1, 14))).await.unwrap());
        assert!(session.has_overlap(period(d(2024, 1, 1), d(2024, 1, 10))).await.unwrap());
        assert!(!session.has_overlap(period(d(2024, 1, 13), d(2024, 1, 20))).await.unwrap());
        drop(session);

        for status in ReservationStatus::RELEASED {
            let mut session = store.lock_reservation(existing.id).await.unwrap();
            let mut updated = session.reservation().clone();
            updated.status = status;
            session.save_reservation(&updated).await.unwrap();
            session.commit().await.unwrap();

            let session = store.lock_vehicle(vehicle_id).await.unwrap();
            assert!(
                !session.has_overlap(period(d(2024, 1, 11), d(2024, 1, 11))).await.unwrap(),
                "{} reservation must not block the calendar",
                status
            );
        }
    }

    #[tokio::test]
    async fn dropped_session_discards_its_writes() {
        let (_dir, db, vehicle_id) = setup().await;
        let store = SeaOrmBookingStore::new(db);
        let range = period(d(2024, 3, 1), d(2024, 3, 2));

        {
            let mut session = store.lock_vehicle(vehicle_id).await.unwrap();
            let new = NewReservation::priced(vehicle_id, "acc-1", range, Decimal::from(10)).unwrap();
            session.insert_reservation(new).await.unwrap();
        }

        let session = store.lock_vehicle(vehicle_id).await.unwrap();
        assert!(!session.has_overlap(range).await.unwrap());
    }

    #[tokio::test]
    async fn session_for_other_vehicle_refuses_insert() {
        let (_dir, db, vehicle_id) = setup().await;
        let other = testing::seed_vehicle(&db, "100", VehicleStatus::Available).await;
        let store = SeaOrmBookingStore::new(db);

        let mut session = store.lock_vehicle(vehicle_id).await.unwrap();
        let new =
            NewReservation::priced(other, "acc-1", period(d(2024, 1, 1), d(2024, 1, 1)), Decimal::ONE)
                .unwrap();
        let err = session.insert_reservation(new).await.unwrap_err();
        assert!(matches!(err, DomainError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn reservation_session_updates_vehicle_status() {
        let (_dir, db, vehicle_id) = setup().await;
        let store = SeaOrmBookingStore::new(db);
        let r = book(&store, vehicle_id, period(d(2024, 1, 10), d(2024, 1, 12))).await;

        let mut session = store.lock_reservation(r.id).await.unwrap();
        let vehicle = session.set_vehicle_status(VehicleStatus::Rented).await.unwrap();
        assert_eq!(vehicle.status, VehicleStatus::Rented);
        session.commit().await.unwrap();

        let session = store.lock_vehicle(vehicle_id).await.unwrap();
        assert_eq!(session.vehicle().status, VehicleStatus::Rented);
    }

    #[tokio::test]
    async fn locking_missing_reservation_is_not_found() {
        let (_dir, db, _) = setup().await;
        let store = SeaOrmBookingStore::new(db);

        let err = store.lock_reservation(42).await.err().unwrap();
        assert!(matches!(err, DomainError::NotFound { entity: "Reservation", .. }));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn second_session_waits_for_first_commit() {
        let (_dir, db, vehicle_id) = setup().await;
        let store = Arc::new(SeaOrmBookingStore::new(db));
        let range = period(d(2024, 5, 1), d(2024, 5, 3));

        let mut first = store.lock_vehicle(vehicle_id).await.unwrap();

        let contender = {
            let store = store.clone();
            tokio::spawn(async move {
                let session = store.lock_vehicle(vehicle_id).await.unwrap();
                session.has_overlap(range).await.unwrap()
            })
        };

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(!contender.is_finished(), "lock was not exclusive");

        let new = NewReservation::priced(vehicle_id, "acc-1", range, Decimal::ONE).unwrap();
        first.insert_reservation(new).await.unwrap();
        first.commit().await.unwrap();

        assert!(contender.await.unwrap(), "contender must observe the committed booking");
    }

    #[tokio::test]
    async fn ledger_query_agrees_with_date_range_overlaps() {
        let (_dir, db, vehicle_id) = setup().await;
        let store = SeaOrmBookingStore::new(db);
        let booked = period(d(2024, 6, 10), d(2024, 6, 14));
        book(&store, vehicle_id, booked).await;

        let session = store.lock_vehicle(vehicle_id).await.unwrap();
        for start in 5..=18 {
            for len in 0..4 {
                let candidate = period(d(2024, 6, start), d(2024, 6, start + len));
                assert_eq!(
                    session.has_overlap(candidate).await.unwrap(),
                    booked.overlaps(&candidate),
                    "{} against {}",
                    candidate,
                    booked
                );
            }
        }
    }

    /// SQLite has only a database-wide write lock, so a held vehicle session
    /// stalls sessions for every other vehicle until it ends.
    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn sqlite_sessions_serialize_across_vehicles() {
        let (_dir, db, vehicle_id) = setup().await;
        let other = testing::seed_vehicle(&db, "100", VehicleStatus::Available).await;
        let store = Arc::new(SeaOrmBookingStore::new(db));

        let held = store.lock_vehicle(vehicle_id).await.unwrap();
        let contender = {
            let store = store.clone();
            tokio::spawn(async move { store.lock_vehicle(other).await.map(|_| ()) })
        };

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(!contender.is_finished());

        drop(held);
        contender.await.unwrap().unwrap();
    }

    /// Row locks on PostgreSQL: different vehicles proceed, the same vehicle
    /// waits. Run with `RENTCAR_TEST_POSTGRES_URL=postgres://... cargo test -- --ignored`.
    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    #[ignore = "requires RENTCAR_TEST_POSTGRES_URL"]
    async fn postgres_row_locks_are_per_vehicle() {
        let Some(db) = testing::postgres_db().await else {
            eprintln!("RENTCAR_TEST_POSTGRES_URL not set, skipping");
            return;
        };
        let first = testing::seed_vehicle(&db, "100", VehicleStatus::Available).await;
        let second = testing::seed_vehicle(&db, "100", VehicleStatus::Available).await;
        let store = Arc::new(SeaOrmBookingStore::new(db));

        let held = store.lock_vehicle(first).await.unwrap();

        let other = tokio::time::timeout(Duration::from_secs(2), store.lock_vehicle(second))
            .await
            .expect("lock on another vehicle must not wait")
            .unwrap();
        assert_eq!(other.vehicle().id, second);
        drop(other);

        let same = {
            let store = store.clone();
            tokio::spawn(async move { store.lock_vehicle(first).await.map(|_| ()) })
        };
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(!same.is_finished(), "row lock was not exclusive");

        drop(held);
        tokio::time::timeout(Duration::from_secs(5), same)
            .await
            .expect("waiter must proceed once the lock is released")
            .unwrap()
            .unwrap();
    }
}
