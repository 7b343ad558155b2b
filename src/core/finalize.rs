//! Report finalization - Locks a draft report for good.
//!
//! Finalizing is a single conditional `UPDATE ... WHERE is_finalized = false`, so of
//! two concurrent calls exactly one flips the flag and the other sees
//! [`Error::ReportLocked`]. Nothing else changes: the following month's report, if
//! one already exists, is left as it is. The locked report simply becomes the
//! carry-over source the next time that following month is generated.

use crate::{
    core::{period::Period, report},
    entities::{MonthlyReport, monthly_report},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{TransactionTrait, prelude::*, sea_query::Expr};
use tracing::{info, instrument};

/// Transitions the report for `year`/`month` from draft to finalized.
///
/// Fails with [`Error::ReportNotFound`] if it was never generated and
/// [`Error::ReportLocked`] if it is already finalized.
#[instrument(skip(db))]
pub async fn finalize_report(
    db: &DatabaseConnection,
    user_id: i64,
    year: i32,
    month: u32,
) -> Result<monthly_report::Model> {
    let period = Period::new(year, month)?;
    let finalized_at = Utc::now();

    let txn = db.begin().await?;
    let result = MonthlyReport::update_many()
        .col_expr(monthly_report::Column::IsFinalized, Expr::value(true))
        .col_expr(monthly_report::Column::FinalizedAt, Expr::value(finalized_at))
        .filter(monthly_report::Column::UserId.eq(user_id))
        .filter(monthly_report::Column::Year.eq(year))
        .filter(monthly_report::Column::Month.eq(month))
        .filter(monthly_report::Column::IsFinalized.eq(false))
        .exec(&txn)
        .await?;

    let stored = report::find_report(&txn, user_id, period).await?;
    let Some(finalized) = stored else {
        return Err(Error::ReportNotFound { year, month });
    };
    if result.rows_affected == 0 {
        return Err(Error::ReportLocked { year, month });
    }
    txn.commit().await?;

    info!(
        report_id = finalized.id,
        carry_over = finalized.carry_over_to_next_month,
        "Finalized monthly report for {}",
        period
    );
    Ok(finalized)
}
