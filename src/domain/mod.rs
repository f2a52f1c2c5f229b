//! Domain layer
//!
//! Aggregates (vehicle, reservation, account), the audit contract and the
//! ports the booking core needs from the outside world. No I/O here.

pub mod account;
pub mod audit;
pub mod ports;
pub mod repositories;
pub mod reservation;
pub mod vehicle;

pub use account::{Account, AccountDirectory, AccountRole};
pub use audit::{AuditEntry, AuditSink};
pub use ports::{BookingStore, ReservationSession, VehicleSession};
pub use repositories::RepositoryProvider;
pub use reservation::{
    DateRange, NewReservation, RentalEvent, Reservation, ReservationRepository,
    ReservationStatus, Transition,
};
pub use vehicle::{Vehicle, VehicleRepository, VehicleStatus};

pub use crate::shared::errors::{DomainError, DomainResult};
