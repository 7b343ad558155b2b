//! Jar business logic - The jar registry and the allocation invariant.
//!
//! For every user, the percentages of their active jars never sum past 100. The
//! check and the write it guards run under one process-wide lock and inside one
//! database transaction, so two concurrent creates or updates cannot both pass
//! validation against the same stale total.

use crate::{
    core::user,
    entities::{Jar, Priority, Transaction, TransactionKind, jar, transaction},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*, sea_query::Expr};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};

/// Ceiling for the sum of active jar percentages.
pub const MAX_TOTAL_PERCENTAGE: f64 = 100.0;

// Tolerance for float sums such as 33.3 + 33.3 + 33.4.
const PERCENT_EPSILON: f64 = 1e-9;

static ALLOCATION_LOCK: Mutex<()> = Mutex::const_new(());

/// Input for [`create_jar`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewJar {
    /// Jar name, must not be blank
    pub name: String,
    /// Optional description
    pub description: Option<String>,
    /// Share of income, 0-100
    pub percentage: f64,
    /// Savings target, non-negative
    pub target_amount: f64,
    /// Ordering priority
    pub priority: Priority,
    /// Category, must not be blank
    pub category: String,
    /// Display color, must not be blank
    pub color: String,
    /// Display icon, must not be blank
    pub icon: String,
}

/// Partial update for [`update_jar`]. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JarChanges {
    /// New name
    pub name: Option<String>,
    /// New description; `Some(None)` clears it
    pub description: Option<Option<String>>,
    /// New percentage
    pub percentage: Option<f64>,
    /// New savings target
    pub target_amount: Option<f64>,
    /// New priority
    pub priority: Option<Priority>,
    /// New category
    pub category: Option<String>,
    /// New display color
    pub color: Option<String>,
    /// New display icon
    pub icon: Option<String>,
    /// Activate or deactivate
    pub is_active: Option<bool>,
}

/// Filter for [`list_jars`]. Empty filter lists every jar of the user.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JarFilter {
    /// Only active or only inactive jars
    pub is_active: Option<bool>,
    /// Only jars with this priority
    pub priority: Option<Priority>,
    /// Only jars in this category
    pub category: Option<String>,
}

/// Allocation totals over a user's active jars.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AllocationSummary {
    /// Sum of active jar percentages
    pub total_percentage: f64,
    /// `100 - total_percentage`
    pub remaining_percentage: f64,
}

fn validate_name(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::validation(format!("Jar {field} cannot be empty")));
    }
    Ok(())
}

fn validate_percentage(percentage: f64) -> Result<()> {
    if !percentage.is_finite() || !(0.0..=MAX_TOTAL_PERCENTAGE).contains(&percentage) {
        return Err(Error::validation(format!(
            "Percentage must be between 0 and 100, got {percentage}"
        )));
    }
    Ok(())
}

fn validate_target(target_amount: f64) -> Result<()> {
    if !target_amount.is_finite() || target_amount < 0.0 {
        return Err(Error::validation(format!(
            "Target amount must be non-negative, got {target_amount}"
        )));
    }
    Ok(())
}

fn validate_changes(changes: &JarChanges) -> Result<()> {
    if let Some(name) = &changes.name {
        validate_name("name", name)?;
    }
    if let Some(category) = &changes.category {
        validate_name("category", category)?;
    }
    if let Some(color) = &changes.color {
        validate_name("color", color)?;
    }
    if let Some(icon) = &changes.icon {
        validate_name("icon", icon)?;
    }
    if let Some(percentage) = changes.percentage {
        validate_percentage(percentage)?;
    }
    if let Some(target_amount) = changes.target_amount {
        validate_target(target_amount)?;
    }
    Ok(())
}

fn validate_new_jar(new_jar: &NewJar) -> Result<()> {
    validate_name("name", &new_jar.name)?;
    validate_name("category", &new_jar.category)?;
    validate_name("color", &new_jar.color)?;
    validate_name("icon", &new_jar.icon)?;
    validate_percentage(new_jar.percentage)?;
    validate_target(new_jar.target_amount)
}

fn ensure_within_allocation(current: f64, requested: f64) -> Result<()> {
    if current + requested > MAX_TOTAL_PERCENTAGE + PERCENT_EPSILON {
        return Err(Error::AllocationExceeded { current, requested });
    }
    Ok(())
}

/// Sums the percentages of the user's active jars, optionally leaving one jar out.
pub async fn active_percentage_total<C>(
    db: &C,
    user_id: i64,
    exclude: Option<i64>,
) -> Result<f64>
where
    C: ConnectionTrait,
{
    let mut query = Jar::find()
        .filter(jar::Column::UserId.eq(user_id))
        .filter(jar::Column::IsActive.eq(true));
    if let Some(jar_id) = exclude {
        query = query.filter(jar::Column::Id.ne(jar_id));
    }
    let jars = query.all(db).await?;
    Ok(jars.iter().map(|j| j.percentage).sum())
}

// Caller holds ALLOCATION_LOCK and owns the transaction.
async fn insert_jar<C>(db: &C, user_id: i64, new_jar: NewJar) -> Result<jar::Model>
where
    C: ConnectionTrait,
{
    let current = active_percentage_total(db, user_id, None).await?;
    ensure_within_allocation(current, new_jar.percentage)?;

    let now = chrono::Utc::now();
    let jar = jar::ActiveModel {
        user_id: Set(user_id),
        name: Set(new_jar.name.trim().to_string()),
        description: Set(new_jar.description),
        percentage: Set(new_jar.percentage),
        target_amount: Set(new_jar.target_amount),
        current_amount: Set(0.0),
        priority: Set(new_jar.priority),
        category: Set(new_jar.category.trim().to_string()),
        color: Set(new_jar.color.trim().to_string()),
        icon: Set(new_jar.icon.trim().to_string()),
        is_active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;
    Ok(jar)
}

/// Creates a jar for the user with a zero balance.
///
/// Fails with [`Error::AllocationExceeded`] when the user's active percentages plus
/// the new one would exceed 100.
#[instrument(skip(db, new_jar), fields(name = %new_jar.name, percentage = new_jar.percentage))]
pub async fn create_jar(
    db: &DatabaseConnection,
    user_id: i64,
    new_jar: NewJar,
) -> Result<jar::Model> {
    validate_new_jar(&new_jar)?;

    let _guard = ALLOCATION_LOCK.lock().await;
    let txn = db.begin().await?;

    user::get_user(&txn, user_id).await?;
    let jar = insert_jar(&txn, user_id, new_jar).await?;

    txn.commit().await?;
    info!(jar_id = jar.id, "Created jar {} at {}%", jar.name, jar.percentage);
    Ok(jar)
}

/// Creates several jars in order, all or none.
///
/// Each jar is checked against the ones before it, so the first jar that would
/// push the total past 100 fails the whole batch and nothing is written.
#[instrument(skip(db, new_jars), fields(count = new_jars.len()))]
pub async fn create_jars(
    db: &DatabaseConnection,
    user_id: i64,
    new_jars: Vec<NewJar>,
) -> Result<Vec<jar::Model>> {
    for new_jar in &new_jars {
        validate_new_jar(new_jar)?;
    }

    let _guard = ALLOCATION_LOCK.lock().await;
    let txn = db.begin().await?;

    user::get_user(&txn, user_id).await?;
    let mut created = Vec::with_capacity(new_jars.len());
    for new_jar in new_jars {
        created.push(insert_jar(&txn, user_id, new_jar).await?);
    }

    txn.commit().await?;
    info!(user_id, "Created {} jars", created.len());
    Ok(created)
}

/// Loads one of the user's jars. Jars owned by someone else are reported as missing.
pub async fn get_jar<C>(db: &C, user_id: i64, jar_id: i64) -> Result<jar::Model>
where
    C: ConnectionTrait,
{
    Jar::find_by_id(jar_id)
        .filter(jar::Column::UserId.eq(user_id))
        .one(db)
        .await?
        .ok_or(Error::JarNotFound { id: jar_id })
}

/// Applies a partial update to a jar.
///
/// The allocation invariant is re-checked against the user's other active jars
/// whenever the jar ends up active and either its percentage changes or it is being
/// re-activated.
#[instrument(skip(db, changes))]
pub async fn update_jar(
    db: &DatabaseConnection,
    user_id: i64,
    jar_id: i64,
    changes: JarChanges,
) -> Result<jar::Model> {
    validate_changes(&changes)?;

    let _guard = ALLOCATION_LOCK.lock().await;
    let txn = db.begin().await?;

    let existing = get_jar(&txn, user_id, jar_id).await?;
    let percentage = changes.percentage.unwrap_or(existing.percentage);
    let will_be_active = changes.is_active.unwrap_or(existing.is_active);
    let percentage_changed = (percentage - existing.percentage).abs() > PERCENT_EPSILON;
    let reactivated = will_be_active && !existing.is_active;

    if will_be_active && (percentage_changed || reactivated) {
        let others = active_percentage_total(&txn, user_id, Some(jar_id)).await?;
        ensure_within_allocation(others, percentage)?;
    }

    let mut active: jar::ActiveModel = existing.into();
    if let Some(name) = changes.name {
        active.name = Set(name.trim().to_string());
    }
    if let Some(description) = changes.description {
        active.description = Set(description);
    }
    if let Some(target_amount) = changes.target_amount {
        active.target_amount = Set(target_amount);
    }
    if let Some(priority) = changes.priority {
        active.priority = Set(priority);
    }
    if let Some(category) = changes.category {
        active.category = Set(category.trim().to_string());
    }
    if let Some(color) = changes.color {
        active.color = Set(color.trim().to_string());
    }
    if let Some(icon) = changes.icon {
        active.icon = Set(icon.trim().to_string());
    }
    active.percentage = Set(percentage);
    active.is_active = Set(will_be_active);
    active.updated_at = Set(chrono::Utc::now());

    let jar = active.update(&txn).await?;
    txn.commit().await?;
    info!(jar_id, "Updated jar {}", jar.name);
    Ok(jar)
}

/// Deletes a jar that no transaction references.
///
/// Jars with history are never cascaded; deactivate them instead.
#[instrument(skip(db))]
pub async fn delete_jar(
    db: &DatabaseConnection,
    user_id: i64,
    jar_id: i64,
) -> Result<jar::Model> {
    let txn = db.begin().await?;

    let jar = get_jar(&txn, user_id, jar_id).await?;
    let count = Transaction::find()
        .filter(transaction::Column::JarId.eq(jar_id))
        .count(&txn)
        .await?;
    if count > 0 {
        return Err(Error::JarHasTransactions { id: jar_id, count });
    }

    Jar::delete_by_id(jar_id).exec(&txn).await?;
    txn.commit().await?;
    info!(jar_id, "Deleted jar {}", jar.name);
    Ok(jar)
}

/// Lists the user's jars, highest priority first and then by name.
pub async fn list_jars(
    db: &DatabaseConnection,
    user_id: i64,
    filter: &JarFilter,
) -> Result<Vec<jar::Model>> {
    let mut query = Jar::find().filter(jar::Column::UserId.eq(user_id));
    if let Some(is_active) = filter.is_active {
        query = query.filter(jar::Column::IsActive.eq(is_active));
    }
    if let Some(priority) = filter.priority {
        query = query.filter(jar::Column::Priority.eq(priority));
    }
    if let Some(category) = &filter.category {
        query = query.filter(jar::Column::Category.eq(category.as_str()));
    }

    let mut jars = query.order_by_asc(jar::Column::Name).all(db).await?;
    jars.sort_by_key(|j| j.priority);
    Ok(jars)
}

/// Total and remaining percentage over the user's active jars.
pub async fn allocation_summary(
    db: &DatabaseConnection,
    user_id: i64,
) -> Result<AllocationSummary> {
    let total_percentage = active_percentage_total(db, user_id, None).await?;
    Ok(AllocationSummary {
        total_percentage,
        remaining_percentage: MAX_TOTAL_PERCENTAGE - total_percentage,
    })
}

/// Recomputes a jar's `current_amount` from its full transaction history.
///
/// The aggregate and the store happen in a single `UPDATE ... SET current_amount =
/// (SELECT ...)` statement, so a concurrent write to the same jar can never be lost
/// between reading the sum and writing it back. Backdated or reordered entries give
/// the same balance as any other write order.
pub async fn recompute_balance<C>(db: &C, jar_id: i64) -> Result<f64>
where
    C: ConnectionTrait,
{
    let balance_sql = format!(
        "(SELECT COALESCE(SUM(CASE WHEN kind = '{}' THEN amount ELSE -amount END), 0.0) \
         FROM transactions WHERE jar_id = ?)",
        TransactionKind::Income.to_value()
    );

    let result = Jar::update_many()
        .col_expr(
            jar::Column::CurrentAmount,
            Expr::cust_with_values(balance_sql, [jar_id]),
        )
        .filter(jar::Column::Id.eq(jar_id))
        .exec(db)
        .await?;
    if result.rows_affected == 0 {
        return Err(Error::JarNotFound { id: jar_id });
    }

    let jar = Jar::find_by_id(jar_id)
        .one(db)
        .await?
        .ok_or(Error::JarNotFound { id: jar_id })?;
    debug!(jar_id, balance = jar.current_amount, "Recomputed jar balance");
    Ok(jar.current_amount)
}
