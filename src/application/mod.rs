pub mod audit;
pub mod booking;

// Re-export key types for convenience
pub use audit::{spawn_audit_logger, AuditEventBus, AuditSubscriber};
pub use booking::{AvailabilityLockManager, BookingService, ReservationView};
