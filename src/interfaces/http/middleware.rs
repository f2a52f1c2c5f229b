//! Authentication middleware for Axum
//!
//! `auth_middleware` verifies the bearer JWT, resolves its subject through
//! the account directory and stores the result as an `AuthenticatedAccount`
//! request extension. `admin_middleware` runs after it on admin routes.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use tracing::{debug, error};

use super::common::ApiResponse;
use crate::domain::account::Account;
use crate::domain::{DomainError, RepositoryProvider};
use crate::infrastructure::crypto::jwt::{verify_token, JwtConfig};

#[derive(Debug)]
pub enum AuthError {
    MissingToken,
    InvalidToken,
    ExpiredToken,
    UnknownAccount,
    InsufficientPermissions,
    DirectoryUnavailable,
}

#[derive(Clone)]
pub struct AuthState {
    pub jwt_config: JwtConfig,
    pub repos: Arc<dyn RepositoryProvider>,
}

/// The caller, as resolved from the token subject
#[derive(Clone, Debug)]
pub struct AuthenticatedAccount(pub Account);

fn extract_token(auth_header: &str) -> Option<&str> {
    auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

pub async fn auth_middleware(
    State(auth_state): State<AuthState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let Some(auth_header) = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
    else {
        return auth_error_response(AuthError::MissingToken);
    };

    let Some(token) = extract_token(auth_header) else {
        return auth_error_response(AuthError::InvalidToken);
    };

    let claims = match verify_token(token, &auth_state.jwt_config) {
        Ok(claims) if claims.is_expired() => return auth_error_response(AuthError::ExpiredToken),
        Ok(claims) => claims,
        Err(e) => {
            debug!("Rejected bearer token: {}", e);
            let kind = match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
                _ => AuthError::InvalidToken,
            };
            return auth_error_response(kind);
        }
    };

    let account = match auth_state.repos.accounts().resolve_account(&claims.sub).await {
        Ok(account) => account,
        Err(DomainError::NotFound { .. }) => return auth_error_response(AuthError::UnknownAccount),
        Err(e) => {
            error!("Account lookup failed for '{}': {}", claims.sub, e);
            return auth_error_response(AuthError::DirectoryUnavailable);
        }
    };

    request.extensions_mut().insert(AuthenticatedAccount(account));
    next.run(request).await
}

/// Admit only administrators. Must be layered inside `auth_middleware`.
pub async fn admin_middleware(request: Request<Body>, next: Next) -> Response {
    match request.extensions().get::<AuthenticatedAccount>() {
        Some(AuthenticatedAccount(account)) if account.is_admin() => next.run(request).await,
        Some(_) => auth_error_response(AuthError::InsufficientPermissions),
        None => auth_error_response(AuthError::MissingToken),
    }
}

fn auth_error_response(error: AuthError) -> Response {
    let (status, message) = match error {
        AuthError::MissingToken => (StatusCode::UNAUTHORIZED, "Missing authentication token"),
        AuthError::InvalidToken => (StatusCode::UNAUTHORIZED, "Invalid authentication token"),
        AuthError::ExpiredToken => (StatusCode::UNAUTHORIZED, "Token has expired"),
        AuthError::UnknownAccount => (StatusCode::UNAUTHORIZED, "Unknown account"),
        AuthError::InsufficientPermissions => (StatusCode::FORBIDDEN, "Insufficient permissions"),
        AuthError::DirectoryUnavailable => {
            (StatusCode::INTERNAL_SERVER_ERROR, "Account directory unavailable")
        }
    };

    (status, Json(ApiResponse::<()>::error(message))).into_response()
}
