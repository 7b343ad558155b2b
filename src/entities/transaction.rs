//! Transaction entity - A single income or expense entry owned by one jar.
//!
//! Amounts are always positive; the direction comes from `kind`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Direction of a transaction.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Money added to the jar
    #[sea_orm(string_value = "income")]
    Income,
    /// Money spent from the jar
    #[sea_orm(string_value = "expense")]
    Expense,
}

impl TransactionKind {
    /// Signed contribution of `amount` to a jar balance.
    #[must_use]
    pub fn signed(self, amount: f64) -> f64 {
        match self {
            Self::Income => amount,
            Self::Expense => -amount,
        }
    }
}

/// Transaction database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    /// Unique identifier for the transaction
    #[sea_orm(primary_key)]
    pub id: i64,
    /// ID of the jar this transaction belongs to
    pub jar_id: i64,
    /// Transaction amount, always greater than zero
    pub amount: f64,
    /// Income or expense
    pub kind: TransactionKind,
    /// Spending/income category (e.g., "food", "salary")
    pub category: String,
    /// Human-readable description of the transaction
    pub description: String,
    /// When the transaction happened; may be backdated
    pub date: DateTimeUtc,
    /// When the row was created
    pub created_at: DateTimeUtc,
    /// When the row was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Transaction and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each transaction belongs to one jar
    #[sea_orm(
        belongs_to = "super::jar::Entity",
        from = "Column::JarId",
        to = "super::jar::Column::Id"
    )]
    Jar,
}

impl Related<super::jar::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Jar.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
