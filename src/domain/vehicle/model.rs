//! Vehicle domain entity

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// Vehicle availability status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VehicleStatus {
    /// Can be booked
    Available,
    /// Currently out with a renter
    Rented,
    /// Withdrawn from service; never bookable
    Maintenance,
}

impl VehicleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "AVAILABLE",
            Self::Rented => "RENTED",
            Self::Maintenance => "MAINTENANCE",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "AVAILABLE" => Some(Self::Available),
            "RENTED" => Some(Self::Rented),
            "MAINTENANCE" => Some(Self::Maintenance),
            _ => None,
        }
    }
}

impl std::fmt::Display for VehicleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A rentable vehicle as seen by the booking core
#[derive(Debug, Clone, PartialEq)]
pub struct Vehicle {
    pub id: i32,
    pub brand: String,
    pub model: String,
    pub license_plate: String,
    /// Price per calendar day, currency-agnostic
    pub daily_rate: Decimal,
    pub status: VehicleStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Vehicle {
    /// Whether new reservations may target this vehicle
    pub fn accepts_bookings(&self) -> bool {
        self.status != VehicleStatus::Maintenance
    }

    /// "Brand Model" label used in messages and views
    pub fn display_name(&self) -> String {
        format!("{} {}", self.brand, self.model)
    }
}
