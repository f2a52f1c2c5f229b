//! Locked units of work over the durable store
//!
//! A session is a store transaction that holds an exclusive lock on one
//! record for its whole lifetime. The lock lives in the store, so it
//! excludes other processes sharing the same database, not just other tasks
//! in this one.
//!
//! `commit` makes the session's writes durable and releases the lock.
//! Dropping a session without committing discards its writes and releases
//! the lock as well, which covers early returns and panics alike.

use async_trait::async_trait;
use futures_util::future::BoxFuture;

use crate::domain::reservation::{DateRange, NewReservation, Reservation};
use crate::domain::vehicle::{Vehicle, VehicleStatus};
use crate::shared::DomainResult;

#[async_trait]
pub trait BookingStore: Send + Sync {
    /// Open a session holding the exclusive lock on a vehicle record.
    ///
    /// Blocks until the lock is granted, and only sessions for the same
    /// vehicle are required to wait. A store without row locks may
    /// serialize more than that. Fails with `NotFound` if the vehicle does
    /// not exist.
    async fn lock_vehicle(&self, vehicle_id: i32) -> DomainResult<Box<dyn VehicleSession>>;

    /// Open a session holding the exclusive lock on a reservation record.
    async fn lock_reservation(
        &self,
        reservation_id: i32,
    ) -> DomainResult<Box<dyn ReservationSession>>;
}

/// Admission session: one vehicle, locked.
#[async_trait]
pub trait VehicleSession: Send + Sync {
    /// The vehicle as read under the lock
    fn vehicle(&self) -> &Vehicle;

    /// Whether any reservation on this vehicle that still occupies the
    /// calendar shares a day with `period`.
    async fn has_overlap(&self, period: DateRange) -> DomainResult<bool>;

    /// Write a new `PENDING` reservation
    async fn insert_reservation(&mut self, new: NewReservation) -> DomainResult<Reservation>;

    fn commit(self: Box<Self>) -> BoxFuture<'static, DomainResult<()>>;
}

/// Lifecycle session: one reservation, locked.
#[async_trait]
pub trait ReservationSession: Send + Sync {
    /// The reservation as read under the lock
    fn reservation(&self) -> &Reservation;

    /// Persist status and timestamps of the locked reservation
    async fn save_reservation(&mut self, reservation: &Reservation) -> DomainResult<()>;

    /// Lock the reservation's vehicle inside this session and set its status.
    ///
    /// Lock order is always reservation, then vehicle. Admission only ever
    /// takes the vehicle lock, so the two never wait on each other in a cycle.
    async fn set_vehicle_status(&mut self, status: VehicleStatus) -> DomainResult<Vehicle>;

    fn commit(self: Box<Self>) -> BoxFuture<'static, DomainResult<()>>;
}
