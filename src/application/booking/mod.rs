//! Booking module: admission and the rental lifecycle
//!
//! `BookingService` is the coordinator; `AvailabilityLockManager` provides
//! the per-record critical sections it runs in.

pub mod lock_manager;
pub mod service;
pub mod view;

pub use lock_manager::AvailabilityLockManager;
pub use service::BookingService;
pub use view::ReservationView;
