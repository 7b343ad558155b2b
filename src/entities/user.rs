//! User entity - The owner of a set of jars and monthly reports.
//!
//! The ledger is effectively single-user, but every operation still takes the
//! owner's id explicitly so nothing depends on an ambient "first user" lookup.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// User database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Unique identifier for the user
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name, unique per ledger
    pub name: String,
    /// Monthly income that jar percentages are applied to
    pub income: f64,
    /// When the user was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between User and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One user owns many jars
    #[sea_orm(has_many = "super::jar::Entity")]
    Jars,
    /// One user has many monthly reports
    #[sea_orm(has_many = "super::monthly_report::Entity")]
    MonthlyReports,
}

impl Related<super::jar::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Jars.def()
    }
}

impl Related<super::monthly_report::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MonthlyReports.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
