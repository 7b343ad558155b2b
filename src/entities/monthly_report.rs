//! Monthly report entity - A per-user snapshot of one calendar month.
//!
//! A report is keyed by `(user_id, year, month)` (enforced by a unique index
//! created alongside the table). The per-jar lines are stored as JSON so the
//! jar names, categories and percentages are frozen at generation time and
//! later jar edits cannot rewrite history.

use super::transaction::TransactionKind;
use sea_orm::FromJsonQueryResult;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Copy of a transaction that fell inside a report's window.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransactionSummary {
    /// Source transaction id
    pub transaction_id: i64,
    /// Amount at generation time
    pub amount: f64,
    /// Income or expense
    pub kind: TransactionKind,
    /// Description at generation time
    pub description: String,
    /// Category at generation time
    pub category: String,
    /// Transaction date
    pub date: DateTimeUtc,
}

/// Figures for one jar within a monthly report.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct JarReportLine {
    /// Source jar id
    pub jar_id: i64,
    /// Jar name at generation time
    pub jar_name: String,
    /// Jar category at generation time
    pub jar_category: String,
    /// Jar percentage at generation time
    pub percentage: f64,
    /// `user_income * percentage / 100`
    pub allocated_amount: f64,
    /// Sum of in-window expenses
    pub actual_spent: f64,
    /// Sum of in-window income
    pub actual_income: f64,
    /// `allocated_amount - actual_spent`, may be negative
    pub savings: f64,
    /// Transactions that fell in the window
    pub transactions: Vec<TransactionSummary>,
}

/// Ordered list of jar lines, stored as a single JSON column.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct JarReportLines(pub Vec<JarReportLine>);

/// Monthly report database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "monthly_reports")]
pub struct Model {
    /// Unique identifier for the report
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning user
    pub user_id: i64,
    /// Calendar year
    pub year: i32,
    /// Calendar month, 1-12
    pub month: u32,
    /// User income snapshot at generation time
    pub user_income: f64,
    /// Sum of the jar allocations
    pub total_allocated: f64,
    /// Sum of in-window expenses over all jars
    pub total_spent: f64,
    /// Sum of the jar savings
    pub total_savings: f64,
    /// Previous month's `carry_over_to_next_month`, or 0
    pub carry_over_from_previous_month: f64,
    /// `total_savings + carry_over_from_previous_month`
    pub carry_over_to_next_month: f64,
    /// Per-jar figures, in jar order
    pub jars_report: JarReportLines,
    /// Finalized reports are immutable
    pub is_finalized: bool,
    /// When the report was finalized
    pub finalized_at: Option<DateTimeUtc>,
    /// When the report was first generated
    pub created_at: DateTimeUtc,
    /// When the report was last regenerated
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between `MonthlyReport` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each report belongs to one user
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Lifecycle state of a report.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportState {
    /// Mutable; regenerating replaces every figure
    Draft,
    /// Terminal; no further writes
    Finalized,
}

impl Model {
    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> ReportState {
        if self.is_finalized {
            ReportState::Finalized
        } else {
            ReportState::Draft
        }
    }
}
