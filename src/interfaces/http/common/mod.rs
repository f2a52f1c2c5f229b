//! Shared HTTP plumbing: response envelope, error mapping, validated JSON

pub mod validated_json;

pub use validated_json::{ValidatedJson, ValidatedJsonRejection};

use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::error;
use utoipa::ToSchema;

use crate::domain::DomainError;

/// Standard API response envelope.
///
/// Success: `{"success": true, "data": {...}}`,
/// failure: `{"success": false, "data": null, "error": "..."}`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    /// Payload; `null` on failure
    pub data: Option<T>,
    /// Error description; omitted on success
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Handler result: enveloped data or a status with an enveloped error
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, (StatusCode, Json<ApiResponse<T>>)>;

pub fn status_for(e: &DomainError) -> StatusCode {
    match e {
        DomainError::NotFound { .. } => StatusCode::NOT_FOUND,
        DomainError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        DomainError::ResourceConflict(_) => StatusCode::CONFLICT,
        DomainError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Map a domain error onto the envelope. Internal details stay in the log.
pub fn error_response<T>(e: DomainError) -> (StatusCode, Json<ApiResponse<T>>) {
    let status = status_for(&e);
    let message = match &e {
        DomainError::Unexpected(detail) => {
            error!("Request failed: {}", detail);
            "Internal server error".to_string()
        }
        _ => e.to_string(),
    };
    (status, Json(ApiResponse::error(message)))
}
