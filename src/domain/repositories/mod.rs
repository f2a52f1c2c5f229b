//! Repository access for the domain layer

use super::account::AccountDirectory;
use super::reservation::ReservationRepository;
use super::vehicle::VehicleRepository;

/// Provides access to all read-side repositories.
///
/// Consumers request only the repository they need:
///
/// ```ignore
/// async fn handle(repos: &dyn RepositoryProvider) {
///     let vehicle = repos.vehicles().find_by_id(7).await?;
///     let mine = repos.reservations().find_by_account("acc-1").await?;
/// }
/// ```
pub trait RepositoryProvider: Send + Sync {
    fn vehicles(&self) -> &dyn VehicleRepository;
    fn reservations(&self) -> &dyn ReservationRepository;
    fn accounts(&self) -> &dyn AccountDirectory;
}
