//! SeaORM implementation of AccountDirectory

use async_trait::async_trait;
use log::debug;
use sea_orm::{ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter};

use crate::domain::account::{Account, AccountDirectory, AccountRole};
use crate::domain::{DomainError, DomainResult};
use crate::infrastructure::database::entities::account;

pub struct SeaOrmAccountDirectory {
    db: DatabaseConnection,
}

impl SeaOrmAccountDirectory {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn entity_role_to_domain(role: account::AccountRole) -> AccountRole {
    match role {
        account::AccountRole::User => AccountRole::User,
        account::AccountRole::Admin => AccountRole::Admin,
    }
}

fn model_to_domain(m: account::Model) -> Account {
    Account {
        id: m.id,
        username: m.username,
        role: entity_role_to_domain(m.role),
    }
}

#[async_trait]
impl AccountDirectory for SeaOrmAccountDirectory {
    async fn resolve_account(&self, identifier: &str) -> DomainResult<Account> {
        debug!("Resolving account '{}'", identifier);

        account::Entity::find()
            .filter(
                Condition::any()
                    .add(account::Column::Id.eq(identifier))
                    .add(account::Column::Username.eq(identifier)),
            )
            .one(&self.db)
            .await?
            .map(model_to_domain)
            .ok_or_else(|| DomainError::not_found("Account", "identifier", identifier))
    }

    async fn usernames(&self, ids: &[String]) -> DomainResult<Vec<(String, String)>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let models = account::Entity::find()
            .filter(account::Column::Id.is_in(ids.iter().cloned()))
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(|m| (m.id, m.username)).collect())
    }
}
