//! Vehicle entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "vehicles")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub brand: String,
    pub model: String,

    #[sea_orm(unique)]
    pub license_plate: String,

    /// Decimal in its canonical text form
    pub daily_rate: String,

    /// Vehicle status: AVAILABLE, RENTED, MAINTENANCE
    pub status: String,

    /// Bumped by every locked session; on SQLite the bump is what takes the
    /// write lock
    pub lock_version: i32,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::reservation::Entity")]
    Reservations,
}

impl Related<super::reservation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reservations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
