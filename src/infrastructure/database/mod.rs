pub mod entities;
pub mod migrator;
pub mod repositories;

#[cfg(test)]
pub(crate) mod testing;

pub use repositories::{SeaOrmBookingStore, SeaOrmRepositoryProvider};

use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use tracing::info;

use self::migrator::Migrator;

/// Single-node default. SQLite serializes all booking sessions behind one
/// write lock; use a `postgres://` URL for per-vehicle row locks.
const DEFAULT_URL: &str = "sqlite://./rentcar.db?mode=rwc";

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Database URL (e.g., "sqlite://./rentcar.db?mode=rwc")
    pub url: String,
    /// Pool size; `None` keeps the driver default
    pub max_connections: Option<u32>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            max_connections: None,
        }
    }
}

impl DatabaseConfig {
    /// Create config for SQLite
    pub fn sqlite(path: &str) -> Self {
        Self {
            url: format!("sqlite://{}?mode=rwc", path),
            max_connections: None,
        }
    }
}

/// Initialize database connection
pub async fn init_database(config: &DatabaseConfig) -> Result<DatabaseConnection, sea_orm::DbErr> {
    info!("Connecting to database: {}", config.url);

    let mut options = ConnectOptions::new(config.url.clone());
    options
        .connect_timeout(Duration::from_secs(10))
        .sqlx_logging(false);
    if let Some(max) = config.max_connections {
        options.max_connections(max);
    }

    let db = Database::connect(options).await?;
    info!("Database connected successfully");
    Ok(db)
}

/// Bring the schema up to date
pub async fn run_migrations(db: &DatabaseConnection) -> Result<(), sea_orm::DbErr> {
    info!("Running database migrations...");
    Migrator::up(db, None).await?;
    info!("Migrations completed");
    Ok(())
}
