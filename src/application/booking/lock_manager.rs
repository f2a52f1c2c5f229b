//! Availability lock manager
//!
//! Runs a closure while holding the store-level lock on one record. The
//! session is committed when the closure returns `Ok` and rolled back when
//! it returns `Err`, panics, or the surrounding future is dropped, so the
//! lock is released on every exit path.
//!
//! Calls on the same vehicle id are totally ordered; calls on different ids
//! never wait on each other. There is no timeout at this layer.

use std::sync::Arc;

use futures_util::future::BoxFuture;
use tracing::debug;

use crate::domain::ports::{BookingStore, ReservationSession, VehicleSession};
use crate::shared::DomainResult;

#[derive(Clone)]
pub struct AvailabilityLockManager {
    store: Arc<dyn BookingStore>,
}

impl AvailabilityLockManager {
    pub fn new(store: Arc<dyn BookingStore>) -> Self {
        Self { store }
    }

    pub async fn with_vehicle_lock<T, F>(&self, vehicle_id: i32, f: F) -> DomainResult<T>
    where
        F: for<'s> FnOnce(&'s mut dyn VehicleSession) -> BoxFuture<'s, DomainResult<T>>,
    {
        let mut session = self.store.lock_vehicle(vehicle_id).await?;

        match f(&mut *session).await {
            Ok(value) => {
                session.commit().await?;
                Ok(value)
            }
            Err(e) => {
                debug!(vehicle_id, error = %e, "Locked section failed, rolling back");
                drop(session);
                Err(e)
            }
        }
    }

    /// Same contract as `with_vehicle_lock`, keyed by reservation.
    pub async fn with_reservation_lock<T, F>(&self, reservation_id: i32, f: F) -> DomainResult<T>
    where
        F: for<'s> FnOnce(&'s mut dyn ReservationSession) -> BoxFuture<'s, DomainResult<T>>,
    {
        let mut session = self.store.lock_reservation(reservation_id).await?;

        match f(&mut *session).await {
            Ok(value) => {
                session.commit().await?;
                Ok(value)
            }
            Err(e) => {
                debug!(reservation_id, error = %e, "Locked section failed, rolling back");
                drop(session);
                Err(e)
            }
        }
    }
}
