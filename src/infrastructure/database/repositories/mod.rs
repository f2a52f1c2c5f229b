//! Database repository implementations
//!
//! Per-aggregate SeaORM repositories, the locked booking store, and the
//! unified RepositoryProvider.

pub mod account_repository;
pub mod booking_store;
pub mod repository_provider;
pub mod reservation_repository;
pub mod vehicle_repository;

pub use booking_store::SeaOrmBookingStore;
pub use repository_provider::SeaOrmRepositoryProvider;
