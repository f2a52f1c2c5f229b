use thiserror::Error;

/// Result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

#[derive(Debug, Error)]
pub enum DomainError {
    /// Referenced vehicle, reservation or account does not exist
    #[error("Not found: {entity} with {field}={value}")]
    NotFound {
        entity: &'static str,
        field: &'static str,
        value: String,
    },

    /// Malformed input or a transition the lifecycle does not allow
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Overlapping booking or vehicle under maintenance
    #[error("Conflict: {0}")]
    ResourceConflict(String),

    /// Store or lock failure
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl DomainError {
    pub fn not_found(entity: &'static str, field: &'static str, value: impl ToString) -> Self {
        Self::NotFound {
            entity,
            field,
            value: value.to_string(),
        }
    }

    /// Whether the caller may resubmit with different parameters.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::ResourceConflict(_))
    }
}

impl From<sea_orm::DbErr> for DomainError {
    fn from(e: sea_orm::DbErr) -> Self {
        Self::Unexpected(format!("Database error: {}", e))
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}
