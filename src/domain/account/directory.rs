use async_trait::async_trait;

use super::model::Account;
use crate::shared::DomainResult;

#[async_trait]
pub trait AccountDirectory: Send + Sync {
    /// Resolve an account by id or username.
    ///
    /// Fails with `DomainError::NotFound` when neither matches.
    async fn resolve_account(&self, identifier: &str) -> DomainResult<Account>;

    /// Usernames for a set of account ids (unknown ids are skipped)
    async fn usernames(&self, ids: &[String]) -> DomainResult<Vec<(String, String)>>;
}
