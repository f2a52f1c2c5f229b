//! Audit trail contract
//!
//! The booking core reports what it did through an injected `AuditSink`.
//! Recording is fire-and-forget: a sink failure never undoes a booking.

pub mod model;

pub use model::{AuditEntry, AuditSink};
