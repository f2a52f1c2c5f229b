//! # Rentcar Booking
//!
//! Reservation admission and rental lifecycle for a car rental service.
//!
//! ## Architecture
//!
//! The project follows Clean Architecture principles:
//!
//! - **domain**: Vehicles, reservations, accounts, the lifecycle table and ports
//! - **application**: Booking coordinator, per-record lock manager, audit bus
//! - **infrastructure**: SeaORM entities, migrations, repositories, JWT
//! - **interfaces**: REST API with Swagger documentation
//! - **shared**: Errors, clock, shutdown signal

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod shared;

pub use config::{default_config_path, AppConfig};

// Re-export database types for easy access
pub use infrastructure::{
    init_database, run_migrations, DatabaseConfig, SeaOrmBookingStore, SeaOrmRepositoryProvider,
};

// Re-export API router
pub use interfaces::create_api_router;

pub use application::{spawn_audit_logger, AuditEventBus, BookingService};
