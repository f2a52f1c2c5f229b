//! API Router with Swagger UI

use std::sync::Arc;
use std::time::Instant;

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use sea_orm::DatabaseConnection;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::application::booking::BookingService;
use crate::domain::repositories::RepositoryProvider;
use crate::infrastructure::crypto::jwt::JwtConfig;
use crate::interfaces::http::common::ApiResponse;
use crate::interfaces::http::middleware::{admin_middleware, auth_middleware, AuthState};
use crate::interfaces::http::modules::health::{self, HealthState};
use crate::interfaces::http::modules::reservations::{self, ReservationAppState};

/// Security scheme modifier for OpenAPI
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("JWT Bearer token; the subject is the account id"))
                        .build(),
                ),
            );
        }
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        reservations::create_reservation,
        reservations::list_my_reservations,
        reservations::cancel_reservation,
        reservations::list_all_reservations,
        reservations::approve_reservation,
        reservations::reject_reservation,
        reservations::complete_reservation,
    ),
    components(
        schemas(
            ApiResponse<String>,
            health::HealthResponse,
            health::ComponentHealth,
            reservations::CreateReservationRequest,
            reservations::ReservationResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Server health check endpoints"),
        (name = "Reservations", description = "Booking a vehicle, listing and cancelling own reservations"),
        (name = "Admin Reservations", description = "Reservation review and vehicle return, administrators only"),
    ),
    info(
        title = "Rentcar Booking API",
        version = "1.0.0",
        description = "Vehicle reservation admission and rental lifecycle",
        license(name = "MIT")
    )
)]
pub struct ApiDoc;

/// Create the API router with all routes
pub fn create_api_router(
    booking: Arc<BookingService>,
    repos: Arc<dyn RepositoryProvider>,
    db: DatabaseConnection,
    jwt_config: JwtConfig,
) -> Router {
    let auth_state = AuthState { jwt_config, repos };
    let reservation_state = ReservationAppState { booking };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Any authenticated account
    let reservation_routes = Router::new()
        .route("/", post(reservations::create_reservation))
        .route("/my", get(reservations::list_my_reservations))
        .route("/{id}/cancel", put(reservations::cancel_reservation))
        .layer(middleware::from_fn_with_state(
            auth_state.clone(),
            auth_middleware,
        ))
        .with_state(reservation_state.clone());

    // Administrators only; layers run outermost-last, so auth resolves first
    let admin_routes = Router::new()
        .route("/", get(reservations::list_all_reservations))
        .route("/{id}/approve", put(reservations::approve_reservation))
        .route("/{id}/reject", put(reservations::reject_reservation))
        .route("/{id}/complete", put(reservations::complete_reservation))
        .layer(middleware::from_fn(admin_middleware))
        .layer(middleware::from_fn_with_state(auth_state, auth_middleware))
        .with_state(reservation_state);

    let health_routes = Router::new()
        .route("/health", get(health::health_check))
        .with_state(HealthState {
            db,
            started_at: Arc::new(Instant::now()),
        });

    let swagger_routes = SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi());

    Router::new()
        .merge(swagger_routes)
        .merge(health_routes)
        .nest("/api/v1/reservations", reservation_routes)
        .nest("/api/v1/admin/reservations", admin_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
