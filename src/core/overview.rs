//! All-time financial overview across a user's jars and ledger.

use crate::{
    core::{
        jar,
        transaction::{self, TransactionFilter},
    },
    entities::{Jar, jar as jar_entity},
    errors::Result,
};
use sea_orm::prelude::*;
use serde::{Deserialize, Serialize};

/// Headline figures for a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinanceOverview {
    /// All-time income
    pub total_income: f64,
    /// All-time expenses
    pub total_expenses: f64,
    /// `max(0, total_income - total_expenses)`
    pub total_savings: f64,
    /// Number of jars, active or not
    pub jars_count: u64,
    /// Number of active jars
    pub active_jars_count: u64,
    /// Sum of active jar percentages
    pub total_allocated: f64,
    /// `100 - total_allocated`
    pub remaining_percentage: f64,
}

/// Computes the overview for one user.
pub async fn finance_overview(db: &DatabaseConnection, user_id: i64) -> Result<FinanceOverview> {
    let stats = transaction::aggregate_stats(db, user_id, &TransactionFilter::default()).await?;
    let allocation = jar::allocation_summary(db, user_id).await?;

    let jars_count = Jar::find()
        .filter(jar_entity::Column::UserId.eq(user_id))
        .count(db)
        .await?;
    let active_jars_count = Jar::find()
        .filter(jar_entity::Column::UserId.eq(user_id))
        .filter(jar_entity::Column::IsActive.eq(true))
        .count(db)
        .await?;

    Ok(FinanceOverview {
        total_income: stats.total_income,
        total_expenses: stats.total_expenses,
        total_savings: (stats.total_income - stats.total_expenses).max(0.0),
        jars_count,
        active_jars_count,
        total_allocated: allocation.total_percentage,
        remaining_percentage: allocation.remaining_percentage,
    })
}
