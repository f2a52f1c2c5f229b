//! Reservation ledger interface
//!
//! Read-only views of the ledger. Writes and the overlap check happen inside
//! a locked session (`ports::booking_store`), never through this trait.

use async_trait::async_trait;

use super::model::Reservation;
use crate::shared::DomainResult;

#[async_trait]
pub trait ReservationRepository: Send + Sync {
    /// Find reservation by ID
    async fn find_by_id(&self, id: i32) -> DomainResult<Option<Reservation>>;

    /// All reservations of one account, newest first
    async fn find_by_account(&self, account_id: &str) -> DomainResult<Vec<Reservation>>;

    /// All reservations (any status), newest first
    async fn find_all(&self) -> DomainResult<Vec<Reservation>>;
}
