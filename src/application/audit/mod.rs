pub mod event_bus;

pub use event_bus::{spawn_audit_logger, AuditEventBus, AuditSubscriber};
