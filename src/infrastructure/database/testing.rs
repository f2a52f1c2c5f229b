//! Fixtures for store-backed tests: a migrated SQLite file in a temp dir.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use tempfile::TempDir;

use super::entities::{account, vehicle};
use super::{init_database, run_migrations, DatabaseConfig};
use crate::domain::account::AccountRole;
use crate::domain::vehicle::VehicleStatus;

/// Fresh migrated database. Keep the `TempDir` alive for the test's duration.
pub async fn temp_db() -> (TempDir, DatabaseConnection) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("rentcar-test.db");
    let config = DatabaseConfig::sqlite(&path.display().to_string());

    let db = init_database(&config).await.expect("connect test database");
    run_migrations(&db).await.expect("migrate test database");
    (dir, db)
}

/// Migrated PostgreSQL database from `RENTCAR_TEST_POSTGRES_URL`, if set.
pub async fn postgres_db() -> Option<DatabaseConnection> {
    let url = std::env::var("RENTCAR_TEST_POSTGRES_URL").ok()?;
    let config = DatabaseConfig {
        url,
        max_connections: Some(4),
    };

    let db = init_database(&config).await.expect("connect postgres test database");
    run_migrations(&db).await.expect("migrate postgres test database");
    Some(db)
}

pub async fn seed_account(db: &DatabaseConnection, id: &str, username: &str, role: AccountRole) {
    let role = match role {
        AccountRole::User => account::AccountRole::User,
        AccountRole::Admin => account::AccountRole::Admin,
    };

    account::ActiveModel {
        id: Set(id.to_string()),
        username: Set(username.to_string()),
        role: Set(role),
        created_at: Set(Utc::now()),
    }
    .insert(db)
    .await
    .expect("seed account");
}

/// Insert a vehicle with a unique plate; returns its id.
pub async fn seed_vehicle(db: &DatabaseConnection, daily_rate: &str, status: VehicleStatus) -> i32 {
    let now = Utc::now();
    let plate = format!("B {} TST", uuid::Uuid::new_v4().simple());

    let model = vehicle::ActiveModel {
        brand: Set("Toyota".to_string()),
        model: Set("Avanza".to_string()),
        license_plate: Set(plate),
        daily_rate: Set(daily_rate.to_string()),
        status: Set(status.as_str().to_string()),
        lock_version: Set(0),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("seed vehicle");
    model.id
}
