//! Rentcar booking service
//!
//! Reads configuration from TOML (~/.config/rentcar-booking/config.toml or
//! `$RENTCAR_CONFIG`) and serves the reservation REST API.

use std::sync::Arc;

use tracing::{error, info, warn};

use rentcar_booking::domain::RepositoryProvider;
use rentcar_booking::shared::{listen_for_shutdown_signals, ShutdownSignal, SystemClock};
use rentcar_booking::{
    create_api_router, default_config_path, init_database, run_migrations, spawn_audit_logger,
    AppConfig, AuditEventBus, BookingService, SeaOrmBookingStore, SeaOrmRepositoryProvider,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // ── Load configuration ─────────────────────────────────────
    let config_path = default_config_path();
    let app_cfg = match AppConfig::load(&config_path) {
        Ok(cfg) => {
            tracing_subscriber::fmt()
                .with_env_filter(
                    tracing_subscriber::EnvFilter::try_from_default_env()
                        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cfg.logging.level)),
                )
                .init();
            info!("Configuration loaded from {}", config_path.display());
            cfg
        }
        Err(e) => {
            tracing_subscriber::fmt()
                .with_env_filter(tracing_subscriber::EnvFilter::new("info"))
                .init();
            error!("Failed to load config: {}. Using defaults.", e);
            AppConfig::default()
        }
    };

    info!("Starting rentcar booking service...");

    let jwt_config = app_cfg.jwt_config();
    info!("JWT issuer '{}'", jwt_config.issuer);

    // ── Database ───────────────────────────────────────────────
    let db = match init_database(&app_cfg.database_config()).await {
        Ok(db) => db,
        Err(e) => {
            error!("Failed to connect to database: {}", e);
            return Err(e.into());
        }
    };

    if let Err(e) = run_migrations(&db).await {
        error!("Failed to run migrations: {}", e);
        return Err(e.into());
    }

    // ── Services ───────────────────────────────────────────────
    let repos: Arc<dyn RepositoryProvider> = Arc::new(SeaOrmRepositoryProvider::new(db.clone()));
    let audit_bus = AuditEventBus::with_capacity(app_cfg.audit.capacity);

    let shutdown = ShutdownSignal::new();
    tokio::spawn(listen_for_shutdown_signals(shutdown.clone()));
    let audit_logger = spawn_audit_logger(&audit_bus, shutdown.clone());

    let booking = Arc::new(BookingService::new(
        Arc::new(SeaOrmBookingStore::new(db.clone())),
        repos.clone(),
        Arc::new(audit_bus),
        Arc::new(SystemClock),
    ));

    let api_router = create_api_router(booking, repos, db.clone(), jwt_config);

    // ── REST API ───────────────────────────────────────────────
    let api_addr = app_cfg.server.address();
    let listener = tokio::net::TcpListener::bind(&api_addr).await?;
    info!("REST API server listening on http://{}", api_addr);
    info!("Swagger UI available at http://{}/docs/", api_addr);

    let api_shutdown = shutdown.clone();
    let served = axum::serve(listener, api_router)
        .with_graceful_shutdown(async move {
            api_shutdown.wait().await;
            info!("REST API server received shutdown signal");
        })
        .await;

    // The server may also stop on its own error; make sure background tasks follow.
    shutdown.trigger();
    if let Err(e) = served {
        error!("REST API server error: {}", e);
    }

    if let Err(e) = audit_logger.await {
        warn!("Audit logger task ended abnormally: {}", e);
    }

    if let Err(e) = db.close().await {
        warn!("Error closing database connection: {}", e);
    } else {
        info!("Database connection closed");
    }

    info!("Rentcar booking service shutdown complete");
    Ok(())
}
