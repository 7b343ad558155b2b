//! Jar entity - A budget envelope entitled to a fixed share of monthly income.
//!
//! `current_amount` is derived state: it is always recomputed from the jar's
//! transactions and never edited directly. It may be negative when the jar is
//! overspent.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Jar priority, used for ordering and filtering.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Funded and reviewed first
    #[sea_orm(string_value = "high")]
    High,
    /// Default priority
    #[default]
    #[sea_orm(string_value = "medium")]
    Medium,
    /// Nice-to-have
    #[sea_orm(string_value = "low")]
    Low,
}

/// Jar database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "jars")]
pub struct Model {
    /// Unique identifier for the jar
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning user
    pub user_id: i64,
    /// Human-readable name (e.g., "Necessities", "Education")
    pub name: String,
    /// Optional free-form description
    pub description: Option<String>,
    /// Share of monthly income, 0-100
    pub percentage: f64,
    /// Savings target for the jar
    pub target_amount: f64,
    /// Income minus expenses over all of the jar's transactions
    pub current_amount: f64,
    /// Ordering priority
    pub priority: Priority,
    /// Budget category for organization
    pub category: String,
    /// Display color, e.g. "#10B981"
    pub color: String,
    /// Display icon name
    pub icon: String,
    /// Inactive jars are excluded from allocation and reports
    pub is_active: bool,
    /// When the jar was created
    pub created_at: DateTimeUtc,
    /// When the jar was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Jar and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each jar belongs to one user
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
    /// One jar has many transactions
    #[sea_orm(has_many = "super::transaction::Entity")]
    Transactions,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
