//! Domain ports
//!
//! Trait contracts between the booking core and the durable store.

pub mod booking_store;

pub use booking_store::{BookingStore, ReservationSession, VehicleSession};
