//! Reservation HTTP handlers
//!
//! Thin wrappers over `BookingService`; the caller comes from the
//! `AuthenticatedAccount` extension set by the auth middleware.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::{Extension, Json};

use super::dto::*;
use crate::application::booking::{BookingService, ReservationView};
use crate::domain::DomainResult;
use crate::interfaces::http::common::{error_response, ApiResponse, ApiResult, ValidatedJson};
use crate::interfaces::http::middleware::AuthenticatedAccount;

/// Application state for reservation handlers.
#[derive(Clone)]
pub struct ReservationAppState {
    pub booking: Arc<BookingService>,
}

fn respond_one(result: DomainResult<ReservationView>) -> ApiResult<ReservationResponse> {
    match result {
        Ok(view) => Ok(Json(ApiResponse::success(view.into()))),
        Err(e) => Err(error_response(e)),
    }
}

fn respond_many(result: DomainResult<Vec<ReservationView>>) -> ApiResult<Vec<ReservationResponse>> {
    match result {
        Ok(views) => Ok(Json(ApiResponse::success(
            views.into_iter().map(ReservationResponse::from).collect(),
        ))),
        Err(e) => Err(error_response(e)),
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/reservations",
    tag = "Reservations",
    security(("bearer_auth" = [])),
    request_body = CreateReservationRequest,
    responses(
        (status = 200, description = "Reservation created as PENDING", body = ApiResponse<ReservationResponse>),
        (status = 400, description = "Start in the past or end before start"),
        (status = 404, description = "Vehicle not found"),
        (status = 409, description = "Dates overlap an existing booking or vehicle under maintenance"),
        (status = 422, description = "Validation failed")
    )
)]
pub async fn create_reservation(
    State(state): State<ReservationAppState>,
    Extension(AuthenticatedAccount(account)): Extension<AuthenticatedAccount>,
    ValidatedJson(request): ValidatedJson<CreateReservationRequest>,
) -> ApiResult<ReservationResponse> {
    respond_one(
        state
            .booking
            .create_reservation(&account, request.vehicle_id, request.start_date, request.end_date)
            .await,
    )
}

#[utoipa::path(
    get,
    path = "/api/v1/reservations/my",
    tag = "Reservations",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Caller's reservations, newest first", body = ApiResponse<Vec<ReservationResponse>>)
    )
)]
pub async fn list_my_reservations(
    State(state): State<ReservationAppState>,
    Extension(AuthenticatedAccount(account)): Extension<AuthenticatedAccount>,
) -> ApiResult<Vec<ReservationResponse>> {
    respond_many(state.booking.list_for_account(&account).await)
}

#[utoipa::path(
    put,
    path = "/api/v1/reservations/{id}/cancel",
    tag = "Reservations",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Reservation ID")),
    responses(
        (status = 200, description = "Reservation cancelled", body = ApiResponse<ReservationResponse>),
        (status = 400, description = "Not the owner, or not PENDING"),
        (status = 404, description = "Reservation not found")
    )
)]
pub async fn cancel_reservation(
    State(state): State<ReservationAppState>,
    Extension(AuthenticatedAccount(account)): Extension<AuthenticatedAccount>,
    Path(id): Path<i32>,
) -> ApiResult<ReservationResponse> {
    respond_one(state.booking.cancel(&account, id).await)
}

// ── Admin ───────────────────────────────────────────────────────

#[utoipa::path(
    get,
    path = "/api/v1/admin/reservations",
    tag = "Admin Reservations",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All reservations, newest first", body = ApiResponse<Vec<ReservationResponse>>),
        (status = 403, description = "Caller is not an administrator")
    )
)]
pub async fn list_all_reservations(
    State(state): State<ReservationAppState>,
    Extension(AuthenticatedAccount(account)): Extension<AuthenticatedAccount>,
) -> ApiResult<Vec<ReservationResponse>> {
    respond_many(state.booking.list_all(&account).await)
}

#[utoipa::path(
    put,
    path = "/api/v1/admin/reservations/{id}/approve",
    tag = "Admin Reservations",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Reservation ID")),
    responses(
        (status = 200, description = "APPROVED, or ACTIVE when the rental starts today or earlier", body = ApiResponse<ReservationResponse>),
        (status = 400, description = "Reservation is not PENDING"),
        (status = 403, description = "Caller is not an administrator"),
        (status = 404, description = "Reservation not found")
    )
)]
pub async fn approve_reservation(
    State(state): State<ReservationAppState>,
    Extension(AuthenticatedAccount(account)): Extension<AuthenticatedAccount>,
    Path(id): Path<i32>,
) -> ApiResult<ReservationResponse> {
    respond_one(state.booking.approve(&account, id).await)
}

#[utoipa::path(
    put,
    path = "/api/v1/admin/reservations/{id}/reject",
    tag = "Admin Reservations",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Reservation ID")),
    responses(
        (status = 200, description = "Reservation rejected", body = ApiResponse<ReservationResponse>),
        (status = 400, description = "Reservation is not PENDING"),
        (status = 403, description = "Caller is not an administrator"),
        (status = 404, description = "Reservation not found")
    )
)]
pub async fn reject_reservation(
    State(state): State<ReservationAppState>,
    Extension(AuthenticatedAccount(account)): Extension<AuthenticatedAccount>,
    Path(id): Path<i32>,
) -> ApiResult<ReservationResponse> {
    respond_one(state.booking.reject(&account, id).await)
}

#[utoipa::path(
    put,
    path = "/api/v1/admin/reservations/{id}/complete",
    tag = "Admin Reservations",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Reservation ID")),
    responses(
        (status = 200, description = "Rental completed, vehicle available again", body = ApiResponse<ReservationResponse>),
        (status = 400, description = "Reservation is not APPROVED or ACTIVE"),
        (status = 403, description = "Caller is not an administrator"),
        (status = 404, description = "Reservation not found")
    )
)]
pub async fn complete_reservation(
    State(state): State<ReservationAppState>,
    Extension(AuthenticatedAccount(account)): Extension<AuthenticatedAccount>,
    Path(id): Path<i32>,
) -> ApiResult<ReservationResponse> {
    respond_one(state.booking.complete(&account, id).await)
}
