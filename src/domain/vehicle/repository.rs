//! Vehicle catalog interface

use async_trait::async_trait;

use super::model::{Vehicle, VehicleStatus};
use crate::shared::DomainResult;

/// Vehicle catalog as consumed by the booking core.
///
/// Status changes made by the rental lifecycle go through the locked
/// session in `ports::booking_store`; `set_status` here is the catalog's
/// own unserialized write.
#[async_trait]
pub trait VehicleRepository: Send + Sync {
    /// Find vehicle by ID
    async fn find_by_id(&self, id: i32) -> DomainResult<Option<Vehicle>>;

    /// Find several vehicles at once (unknown ids are skipped)
    async fn find_many(&self, ids: &[i32]) -> DomainResult<Vec<Vehicle>>;

    /// Overwrite the vehicle's status
    async fn set_status(&self, id: i32, status: VehicleStatus) -> DomainResult<()>;
}
