//! Reservation aggregate
//!
//! Contains the Reservation entity, the inclusive date range it occupies,
//! the rental lifecycle transition table, and the ledger interface.

pub mod lifecycle;
pub mod model;
pub mod repository;

pub use lifecycle::{RentalEvent, Transition};
pub use model::{DateRange, NewReservation, Reservation, ReservationStatus};
pub use repository::ReservationRepository;
