//! Read model returned by every booking operation

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;

use crate::domain::reservation::{Reservation, ReservationStatus};
use crate::domain::vehicle::Vehicle;

/// Reservation joined with the vehicle and owner details callers display.
///
/// Vehicle and owner fields are `None` when the referenced record no longer
/// resolves.
#[derive(Debug, Clone, PartialEq)]
pub struct ReservationView {
    pub id: i32,
    pub vehicle_id: i32,
    pub vehicle_brand: Option<String>,
    pub vehicle_model: Option<String>,
    pub license_plate: Option<String>,
    pub account_id: String,
    pub account_username: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_cost: Decimal,
    pub status: ReservationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ReservationView {
    pub fn project(
        reservation: Reservation,
        vehicle: Option<&Vehicle>,
        account_username: Option<String>,
    ) -> Self {
        Self {
            id: reservation.id,
            vehicle_id: reservation.vehicle_id,
            vehicle_brand: vehicle.map(|v| v.brand.clone()),
            vehicle_model: vehicle.map(|v| v.model.clone()),
            license_plate: vehicle.map(|v| v.license_plate.clone()),
            account_id: reservation.account_id,
            account_username,
            start_date: reservation.start_date,
            end_date: reservation.end_date,
            total_cost: reservation.total_cost,
            status: reservation.status,
            created_at: reservation.created_at,
            updated_at: reservation.updated_at,
        }
    }
}
