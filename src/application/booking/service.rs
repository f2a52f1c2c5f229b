//! Booking coordinator
//!
//! Admission of new reservations and every later lifecycle step. Handlers
//! are thin wrappers over this service.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{info, warn};

use super::lock_manager::AvailabilityLockManager;
use super::view::ReservationView;
use crate::domain::account::Account;
use crate::domain::audit::{AuditEntry, AuditSink};
use crate::domain::ports::BookingStore;
use crate::domain::repositories::RepositoryProvider;
use crate::domain::reservation::{DateRange, NewReservation, RentalEvent, Reservation};
use crate::domain::vehicle::Vehicle;
use crate::domain::{DomainError, DomainResult};
use crate::shared::Clock;

const CREATE_RENTAL: &str = "CREATE_RENTAL";
const ENTITY_KIND: &str = "Reservation";

#[derive(Clone)]
pub struct BookingService {
    locks: AvailabilityLockManager,
    repos: Arc<dyn RepositoryProvider>,
    audit: Arc<dyn AuditSink>,
    clock: Arc<dyn Clock>,
}

impl BookingService {
    pub fn new(
        store: Arc<dyn BookingStore>,
        repos: Arc<dyn RepositoryProvider>,
        audit: Arc<dyn AuditSink>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            locks: AvailabilityLockManager::new(store),
            repos,
            audit,
            clock,
        }
    }

    // ── Admission ───────────────────────────────────────────────

    /// Admit a new `PENDING` reservation for `actor`.
    ///
    /// Either the reservation is persisted or nothing observable happens.
    /// No retries: a `ResourceConflict` is final for these parameters.
    pub async fn create_reservation(
        &self,
        actor: &Account,
        vehicle_id: i32,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> DomainResult<ReservationView> {
        let today = self.clock.today();
        if start_date < today {
            return Err(DomainError::InvalidRequest(format!(
                "start_date {} is in the past (today is {})",
                start_date, today
            )));
        }
        let period = DateRange::new(start_date, end_date)?;
        let account_id = actor.id.clone();

        let (reservation, vehicle) = self
            .locks
            .with_vehicle_lock(vehicle_id, move |session| {
                Box::pin(async move {
                    let vehicle = session.vehicle().clone();
                    if !vehicle.accepts_bookings() {
                        return Err(DomainError::ResourceConflict(format!(
                            "Vehicle {} is under maintenance",
                            vehicle.display_name()
                        )));
                    }

                    if session.has_overlap(period).await? {
                        return Err(DomainError::ResourceConflict(format!(
                            "Vehicle {} is already booked within {}",
                            vehicle.display_name(),
                            period
                        )));
                    }

                    let new =
                        NewReservation::priced(vehicle.id, account_id, period, vehicle.daily_rate)?;
                    let reservation = session.insert_reservation(new).await?;
                    Ok((reservation, vehicle))
                })
            })
            .await
            .inspect_err(|e| {
                if e.is_conflict() {
                    warn!(vehicle_id, period = %period, "Reservation refused: {}", e);
                }
            })?;

        info!(
            reservation_id = reservation.id,
            vehicle_id,
            account_id = %actor.id,
            period = %period,
            total_cost = %reservation.total_cost,
            "Reservation created"
        );

        self.audit.record(AuditEntry::new(
            &actor.id,
            actor.role.as_str(),
            CREATE_RENTAL,
            ENTITY_KIND,
            reservation.id,
            format!(
                "{} booked {} for {} ({} days), total {}",
                actor.username,
                vehicle.display_name(),
                period,
                period.inclusive_days(),
                reservation.total_cost
            ),
        ));

        Ok(ReservationView::project(
            reservation,
            Some(&vehicle),
            Some(actor.username.clone()),
        ))
    }

    // ── Lifecycle ───────────────────────────────────────────────

    pub async fn approve(&self, actor: &Account, reservation_id: i32) -> DomainResult<ReservationView> {
        self.transition(actor, reservation_id, RentalEvent::Approve).await
    }

    pub async fn reject(&self, actor: &Account, reservation_id: i32) -> DomainResult<ReservationView> {
        self.transition(actor, reservation_id, RentalEvent::Reject).await
    }

    pub async fn complete(
        &self,
        actor: &Account,
        reservation_id: i32,
    ) -> DomainResult<ReservationView> {
        self.transition(actor, reservation_id, RentalEvent::Complete).await
    }

    /// Withdraw one of the actor's own `PENDING` reservations.
    pub async fn cancel(&self, actor: &Account, reservation_id: i32) -> DomainResult<ReservationView> {
        self.transition(actor, reservation_id, RentalEvent::Cancel).await
    }

    /// Apply `event` under the reservation lock. A vehicle side effect is
    /// written under the vehicle lock in the same unit of work.
    async fn transition(
        &self,
        actor: &Account,
        reservation_id: i32,
        event: RentalEvent,
    ) -> DomainResult<ReservationView> {
        if event != RentalEvent::Cancel && !actor.is_admin() {
            return Err(DomainError::InvalidRequest(format!(
                "only administrators may {} reservations",
                event
            )));
        }

        let today = self.clock.today();
        let caller = actor.id.clone();

        let (reservation, transition, vehicle) = self
            .locks
            .with_reservation_lock(reservation_id, move |session| {
                Box::pin(async move {
                    let mut reservation = session.reservation().clone();
                    let transition = reservation.apply(event, &caller, today)?;
                    session.save_reservation(&reservation).await?;

                    let vehicle = match transition.vehicle_status {
                        Some(status) => Some(session.set_vehicle_status(status).await?),
                        None => None,
                    };
                    Ok((reservation, transition, vehicle))
                })
            })
            .await?;

        info!(
            reservation_id,
            actor = %actor.id,
            event = %event,
            from = %transition.from,
            to = %transition.to,
            vehicle_status = ?transition.vehicle_status,
            "Reservation status changed"
        );

        self.audit.record(AuditEntry::new(
            &actor.id,
            actor.role.as_str(),
            event.audit_action(),
            ENTITY_KIND,
            reservation.id,
            match transition.vehicle_status {
                Some(status) => format!(
                    "{} -> {}, vehicle {} -> {}",
                    transition.from, transition.to, reservation.vehicle_id, status
                ),
                None => format!("{} -> {}", transition.from, transition.to),
            },
        ));

        let vehicle = match vehicle {
            Some(vehicle) => Some(vehicle),
            None => self.repos.vehicles().find_by_id(reservation.vehicle_id).await?,
        };
        let mut views = self.project_with(vec![reservation], vehicle.into_iter().collect()).await?;
        views
            .pop()
            .ok_or_else(|| DomainError::Unexpected("projection dropped a reservation".into()))
    }

    // ── Queries ─────────────────────────────────────────────────

    /// The actor's own reservations, newest first
    pub async fn list_for_account(&self, actor: &Account) -> DomainResult<Vec<ReservationView>> {
        let reservations = self.repos.reservations().find_by_account(&actor.id).await?;
        self.project(reservations).await
    }

    /// Every reservation, newest first. Administrators only.
    pub async fn list_all(&self, actor: &Account) -> DomainResult<Vec<ReservationView>> {
        if !actor.is_admin() {
            return Err(DomainError::InvalidRequest(
                "only administrators may list all reservations".into(),
            ));
        }
        let reservations = self.repos.reservations().find_all().await?;
        self.project(reservations).await
    }

    async fn project(&self, reservations: Vec<Reservation>) -> DomainResult<Vec<ReservationView>> {
        let mut vehicle_ids: Vec<i32> = reservations.iter().map(|r| r.vehicle_id).collect();
        vehicle_ids.sort_unstable();
        vehicle_ids.dedup();

        let vehicles = self.repos.vehicles().find_many(&vehicle_ids).await?;
        self.project_with(reservations, vehicles).await
    }

    async fn project_with(
        &self,
        reservations: Vec<Reservation>,
        vehicles: Vec<Vehicle>,
    ) -> DomainResult<Vec<ReservationView>> {
        let mut account_ids: Vec<String> =
            reservations.iter().map(|r| r.account_id.clone()).collect();
        account_ids.sort_unstable();
        account_ids.dedup();

        let usernames: HashMap<String, String> = self
            .repos
            .accounts()
            .usernames(&account_ids)
            .await?
            .into_iter()
            .collect();
        let vehicles: HashMap<i32, Vehicle> = vehicles.into_iter().map(|v| (v.id, v)).collect();

        Ok(reservations
            .into_iter()
            .map(|r| {
                let vehicle = vehicles.get(&r.vehicle_id);
                let username = usernames.get(&r.account_id).cloned();
                ReservationView::project(r, vehicle, username)
            })
            .collect())
    }
}
