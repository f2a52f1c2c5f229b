use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One audit record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub actor_id: String,
    pub actor_role: String,
    /// e.g. `CREATE_RENTAL`, `APPROVE_RENTAL`
    pub action: String,
    /// e.g. `Reservation`
    pub entity_kind: String,
    pub entity_id: String,
    pub detail: String,
    pub recorded_at: DateTime<Utc>,
}

impl AuditEntry {
    pub fn new(
        actor_id: impl Into<String>,
        actor_role: impl Into<String>,
        action: impl Into<String>,
        entity_kind: impl Into<String>,
        entity_id: impl ToString,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            actor_id: actor_id.into(),
            actor_role: actor_role.into(),
            action: action.into(),
            entity_kind: entity_kind.into(),
            entity_id: entity_id.to_string(),
            detail: detail.into(),
            recorded_at: Utc::now(),
        }
    }
}

/// Destination for audit records.
///
/// `record` must not block on I/O and has no error channel.
pub trait AuditSink: Send + Sync {
    fn record(&self, entry: AuditEntry);
}
