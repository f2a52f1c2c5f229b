//! SeaORM implementation of RepositoryProvider

use sea_orm::DatabaseConnection;

use crate::domain::account::AccountDirectory;
use crate::domain::repositories::RepositoryProvider;
use crate::domain::reservation::ReservationRepository;
use crate::domain::vehicle::VehicleRepository;

use super::account_repository::SeaOrmAccountDirectory;
use super::reservation_repository::SeaOrmReservationRepository;
use super::vehicle_repository::SeaOrmVehicleRepository;

/// Unified repository provider backed by SeaORM.
///
/// Holds one connection pool and exposes per-aggregate repository accessors.
pub struct SeaOrmRepositoryProvider {
    vehicles: SeaOrmVehicleRepository,
    reservations: SeaOrmReservationRepository,
    accounts: SeaOrmAccountDirectory,
}

impl SeaOrmRepositoryProvider {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            vehicles: SeaOrmVehicleRepository::new(db.clone()),
            reservations: SeaOrmReservationRepository::new(db.clone()),
            accounts: SeaOrmAccountDirectory::new(db),
        }
    }
}

impl RepositoryProvider for SeaOrmRepositoryProvider {
    fn vehicles(&self) -> &dyn VehicleRepository {
        &self.vehicles
    }

    fn reservations(&self) -> &dyn ReservationRepository {
        &self.reservations
    }

    fn accounts(&self) -> &dyn AccountDirectory {
        &self.accounts
    }
}
