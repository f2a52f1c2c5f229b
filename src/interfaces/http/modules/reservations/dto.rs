//! Reservation DTOs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::application::booking::ReservationView;

/// Request to book a vehicle
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateReservationRequest {
    #[validate(range(min = 1, message = "must be a positive id"))]
    pub vehicle_id: i32,
    /// First rental day, inclusive (YYYY-MM-DD)
    #[schema(example = "2024-01-10")]
    pub start_date: NaiveDate,
    /// Last rental day, inclusive (YYYY-MM-DD)
    #[schema(example = "2024-01-12")]
    pub end_date: NaiveDate,
}

/// Reservation details in API responses
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReservationResponse {
    pub id: i32,
    pub vehicle_id: i32,
    pub vehicle_brand: Option<String>,
    pub vehicle_model: Option<String>,
    pub license_plate: Option<String>,
    pub account_id: String,
    pub account_username: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// daily_rate x inclusive days, as a decimal string
    #[schema(value_type = String, example = "1050000")]
    pub total_cost: Decimal,
    /// PENDING, APPROVED, ACTIVE, REJECTED, CANCELLED or COMPLETED
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ReservationView> for ReservationResponse {
    fn from(v: ReservationView) -> Self {
        Self {
            id: v.id,
            vehicle_id: v.vehicle_id,
            vehicle_brand: v.vehicle_brand,
            vehicle_model: v.vehicle_model,
            license_plate: v.license_plate,
            account_id: v.account_id,
            account_username: v.account_username,
            start_date: v.start_date,
            end_date: v.end_date,
            total_cost: v.total_cost,
            status: v.status.as_str().to_string(),
            created_at: v.created_at,
            updated_at: v.updated_at,
        }
    }
}
