//! Report generation business logic.
//!
//! A monthly report is a snapshot of one user's active jars and the transactions
//! dated inside one calendar month. Generating a report is an upsert keyed by
//! `(user_id, year, month)`: while the report is a draft, every call recomputes it
//! from the current ledger, so repeated calls with unchanged data produce the same
//! figures. Once finalized, generation is refused with [`Error::ReportLocked`].
//!
//! The previous month's `carry_over_to_next_month` is read whether or not that
//! report has been finalized.

use crate::{
    core::{period::Period, user},
    entities::{
        Jar, JarReportLine, JarReportLines, MonthlyReport, Transaction, TransactionKind,
        TransactionSummary, jar, monthly_report, transaction,
    },
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{QueryOrder, QuerySelect, Set, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tokio::sync::Mutex;
use tracing::{info, instrument};

static GENERATION_LOCK: Mutex<()> = Mutex::const_new(());

/// Report-level totals, each the sum of the corresponding per-jar figure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportTotals {
    /// Sum of `allocated_amount`
    pub total_allocated: f64,
    /// Sum of `actual_spent`
    pub total_spent: f64,
    /// Sum of `savings`
    pub total_savings: f64,
}

/// Filter for [`list_reports`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportFilter {
    /// Only this year
    pub year: Option<i32>,
    /// Only this month
    pub month: Option<u32>,
    /// Maximum number of reports, newest first
    pub limit: Option<u64>,
}

/// Expense total for one transaction category within a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySpending {
    /// Category name
    pub category: String,
    /// Sum of expenses in the category
    pub amount: f64,
    /// Share of the report's `total_spent`, in percent
    pub share_percent: f64,
}

/// Savings figures for one jar line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JarSavings {
    /// Source jar id
    pub jar_id: i64,
    /// Jar name at generation time
    pub jar_name: String,
    /// Savings amount
    pub savings: f64,
    /// `savings / allocated_amount * 100`, or 0 when nothing was allocated
    pub savings_percent: f64,
}

/// Derived presentation data for a stored report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    /// Report period
    pub period: Period,
    /// Whether the report is locked
    pub is_finalized: bool,
    /// Expenses per category, largest first
    pub category_spending: Vec<CategorySpending>,
    /// Savings per jar, in report order
    pub jar_savings: Vec<JarSavings>,
}

/// Builds the per-jar lines for a report.
///
/// `transactions` must already be restricted to the report window; transactions
/// whose jar is not in `jars` are ignored.
#[must_use]
pub fn build_jar_lines(
    user_income: f64,
    jars: &[jar::Model],
    transactions: &[transaction::Model],
) -> Vec<JarReportLine> {
    jars.iter()
        .map(|j| {
            let in_jar: Vec<&transaction::Model> =
                transactions.iter().filter(|t| t.jar_id == j.id).collect();
            let total_of = |kind: TransactionKind| -> f64 {
                in_jar
                    .iter()
                    .filter(|t| t.kind == kind)
                    .map(|t| t.amount)
                    .sum()
            };

            let allocated_amount = user_income * j.percentage / 100.0;
            let actual_spent = total_of(TransactionKind::Expense);
            let actual_income = total_of(TransactionKind::Income);

            JarReportLine {
                jar_id: j.id,
                jar_name: j.name.clone(),
                jar_category: j.category.clone(),
                percentage: j.percentage,
                allocated_amount,
                actual_spent,
                actual_income,
                savings: allocated_amount - actual_spent,
                transactions: in_jar
                    .into_iter()
                    .map(|t| TransactionSummary {
                        transaction_id: t.id,
                        amount: t.amount,
                        kind: t.kind,
                        description: t.description.clone(),
                        category: t.category.clone(),
                        date: t.date,
                    })
                    .collect(),
            }
        })
        .collect()
}

/// Sums the per-jar figures.
#[must_use]
pub fn compute_totals(lines: &[JarReportLine]) -> ReportTotals {
    lines.iter().fold(ReportTotals::default(), |acc, line| ReportTotals {
        total_allocated: acc.total_allocated + line.allocated_amount,
        total_spent: acc.total_spent + line.actual_spent,
        total_savings: acc.total_savings + line.savings,
    })
}

/// Looks up the report for a period, if one exists.
pub async fn find_report<C>(
    db: &C,
    user_id: i64,
    period: Period,
) -> Result<Option<monthly_report::Model>>
where
    C: ConnectionTrait,
{
    MonthlyReport::find()
        .filter(monthly_report::Column::UserId.eq(user_id))
        .filter(monthly_report::Column::Year.eq(period.year()))
        .filter(monthly_report::Column::Month.eq(period.month()))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Generates (or regenerates) the draft report for `year`/`month`.
///
/// Jars, transactions, the previous report and the write all go through a single
/// database transaction, so the snapshot is consistent.
#[instrument(skip(db))]
pub async fn generate_report(
    db: &DatabaseConnection,
    user_id: i64,
    year: i32,
    month: u32,
) -> Result<monthly_report::Model> {
    let period = Period::new(year, month)?;
    let (start, end) = period.window()?;

    let _guard = GENERATION_LOCK.lock().await;
    let txn = db.begin().await?;

    let existing = find_report(&txn, user_id, period).await?;
    if existing.as_ref().is_some_and(|r| r.is_finalized) {
        return Err(Error::ReportLocked { year, month });
    }

    let owner = user::get_user(&txn, user_id).await?;
    let jars = Jar::find()
        .filter(jar::Column::UserId.eq(user_id))
        .filter(jar::Column::IsActive.eq(true))
        .order_by_asc(jar::Column::Id)
        .all(&txn)
        .await?;
    let jar_ids: Vec<i64> = jars.iter().map(|j| j.id).collect();
    let transactions = Transaction::find()
        .filter(transaction::Column::JarId.is_in(jar_ids))
        .filter(transaction::Column::Date.gte(start))
        .filter(transaction::Column::Date.lt(end))
        .order_by_asc(transaction::Column::Date)
        .order_by_asc(transaction::Column::Id)
        .all(&txn)
        .await?;

    let lines = build_jar_lines(owner.income, &jars, &transactions);
    let totals = compute_totals(&lines);

    let carry_over_from_previous_month = find_report(&txn, user_id, period.previous())
        .await?
        .map_or(0.0, |previous| previous.carry_over_to_next_month);
    let carry_over_to_next_month = totals.total_savings + carry_over_from_previous_month;

    let now = Utc::now();
    let mut snapshot = monthly_report::ActiveModel {
        user_id: Set(user_id),
        year: Set(year),
        month: Set(month),
        user_income: Set(owner.income),
        total_allocated: Set(totals.total_allocated),
        total_spent: Set(totals.total_spent),
        total_savings: Set(totals.total_savings),
        carry_over_from_previous_month: Set(carry_over_from_previous_month),
        carry_over_to_next_month: Set(carry_over_to_next_month),
        jars_report: Set(JarReportLines(lines)),
        is_finalized: Set(false),
        finalized_at: Set(None),
        updated_at: Set(now),
        ..Default::default()
    };

    let report_id = if let Some(existing) = existing {
        // Only a draft row may be overwritten, even if a finalize slipped in
        let result = MonthlyReport::update_many()
            .set(snapshot)
            .filter(monthly_report::Column::Id.eq(existing.id))
            .filter(monthly_report::Column::IsFinalized.eq(false))
            .exec(&txn)
            .await?;
        if result.rows_affected == 0 {
            return Err(Error::ReportLocked { year, month });
        }
        existing.id
    } else {
        snapshot.created_at = Set(now);
        snapshot.insert(&txn).await?.id
    };

    let report = MonthlyReport::find_by_id(report_id)
        .one(&txn)
        .await?
        .ok_or(Error::ReportNotFound { year, month })?;
    txn.commit().await?;

    info!(
        report_id,
        total_spent = report.total_spent,
        total_savings = report.total_savings,
        carry_over = report.carry_over_to_next_month,
        "Generated monthly report for {}",
        period
    );
    Ok(report)
}

/// Loads the report for `year`/`month`, failing with [`Error::ReportNotFound`].
pub async fn get_report(
    db: &DatabaseConnection,
    user_id: i64,
    year: i32,
    month: u32,
) -> Result<monthly_report::Model> {
    let period = Period::new(year, month)?;
    find_report(db, user_id, period)
        .await?
        .ok_or(Error::ReportNotFound { year, month })
}

/// Lists the user's reports, newest period first.
pub async fn list_reports(
    db: &DatabaseConnection,
    user_id: i64,
    filter: &ReportFilter,
) -> Result<Vec<monthly_report::Model>> {
    let mut query = MonthlyReport::find().filter(monthly_report::Column::UserId.eq(user_id));
    if let Some(year) = filter.year {
        query = query.filter(monthly_report::Column::Year.eq(year));
    }
    if let Some(month) = filter.month {
        query = query.filter(monthly_report::Column::Month.eq(month));
    }
    query = query
        .order_by_desc(monthly_report::Column::Year)
        .order_by_desc(monthly_report::Column::Month);
    if let Some(limit) = filter.limit {
        query = query.limit(limit);
    }
    query.all(db).await.map_err(Into::into)
}

fn percent_of(part: f64, whole: f64) -> f64 {
    if whole > 0.0 { part * 100.0 / whole } else { 0.0 }
}

/// Derives category spending and per-jar savings percentages from a stored report.
pub fn summarize_report(report: &monthly_report::Model) -> Result<ReportSummary> {
    let mut by_category: BTreeMap<&str, f64> = BTreeMap::new();
    for line in &report.jars_report.0 {
        for t in line.transactions.iter().filter(|t| t.kind == TransactionKind::Expense) {
            *by_category.entry(t.category.as_str()).or_insert(0.0) += t.amount;
        }
    }

    let mut category_spending: Vec<CategorySpending> = by_category
        .into_iter()
        .map(|(category, amount)| CategorySpending {
            category: category.to_string(),
            amount,
            share_percent: percent_of(amount, report.total_spent),
        })
        .collect();
    category_spending.sort_by(|a, b| b.amount.total_cmp(&a.amount));

    let jar_savings = report
        .jars_report
        .0
        .iter()
        .map(|line| JarSavings {
            jar_id: line.jar_id,
            jar_name: line.jar_name.clone(),
            savings: line.savings,
            savings_percent: percent_of(line.savings, line.allocated_amount),
        })
        .collect();

    Ok(ReportSummary {
        period: Period::new(report.year, report.month)?,
        is_finalized: report.is_finalized,
        category_spending,
        jar_savings,
    })
}

/// Formats a report into a human-readable summary string, suitable for logs.
#[must_use]
pub fn format_report_summary(report: &monthly_report::Model) -> String {
    use std::fmt::Write;

    let status = if report.is_finalized { "finalized" } else { "draft" };
    let mut summary = format!(
        "Monthly Report - {}/{:02} ({status})\n",
        report.year, report.month
    );
    let _ = writeln!(
        summary,
        "  Income: {:.2} | Allocated: {:.2} | Spent: {:.2} | Savings: {:.2}",
        report.user_income, report.total_allocated, report.total_spent, report.total_savings
    );
    let _ = writeln!(
        summary,
        "  Carry-over: {:.2} in → {:.2} out\n",
        report.carry_over_from_previous_month, report.carry_over_to_next_month
    );

    for line in &report.jars_report.0 {
        let _ = writeln!(
            summary,
            "  {} ({}%) | allocated {:.2} | spent {:.2} | income {:.2} | savings {:.2}",
            line.jar_name,
            line.percentage,
            line.allocated_amount,
            line.actual_spent,
            line.actual_income,
            line.savings
        );
    }

    summary
}
