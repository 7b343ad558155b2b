//! Transaction business logic - The ledger.
//!
//! Every mutating operation writes the transaction row and then calls
//! [`jar::recompute_balance`] for each affected jar, all inside one database
//! transaction. That single call site is the only place jar balances change, so
//! a jar's `current_amount` always equals its income minus its expenses.
//!
//! Overspending is allowed: an expense larger than the jar's balance simply drives
//! the balance negative. Callers that want to refuse such expenses can use
//! [`ensure_sufficient_funds`] before recording.

use crate::{
    core::jar,
    entities::{Jar, Transaction, TransactionKind, jar as jar_entity, transaction},
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use sea_orm::{JoinType, QueryOrder, QuerySelect, Select, Set, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{info, instrument};

/// Input for [`record_transaction`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTransaction {
    /// Owning jar
    pub jar_id: i64,
    /// Positive amount
    pub amount: f64,
    /// Income or expense
    pub kind: TransactionKind,
    /// Category, must not be blank
    pub category: String,
    /// Free-form description
    pub description: String,
    /// When it happened; defaults to now
    pub date: Option<DateTime<Utc>>,
}

/// Partial update for [`update_transaction`]. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransactionChanges {
    /// Move the transaction to another jar
    pub jar_id: Option<i64>,
    /// New amount
    pub amount: Option<f64>,
    /// New direction
    pub kind: Option<TransactionKind>,
    /// New category
    pub category: Option<String>,
    /// New description
    pub description: Option<String>,
    /// New date
    pub date: Option<DateTime<Utc>>,
}

/// Filter shared by [`list_transactions`] and [`aggregate_stats`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransactionFilter {
    /// Only this jar
    pub jar_id: Option<i64>,
    /// Only income or only expenses
    pub kind: Option<TransactionKind>,
    /// Only this category
    pub category: Option<String>,
    /// Inclusive lower bound on the date
    pub start_date: Option<DateTime<Utc>>,
    /// Inclusive upper bound on the date
    pub end_date: Option<DateTime<Utc>>,
    /// Maximum number of rows, newest first (listing only)
    pub limit: Option<u64>,
}

/// Income/expense totals for one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryStats {
    /// Category name
    pub category: String,
    /// Income in this category
    pub income: f64,
    /// Expenses in this category
    pub expense: f64,
    /// Number of transactions in this category
    pub total_transactions: u64,
}

/// Aggregate figures over a set of transactions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionStats {
    /// Number of transactions
    pub total_transactions: u64,
    /// Sum of income amounts
    pub total_income: f64,
    /// Sum of expense amounts
    pub total_expenses: f64,
    /// Number of income transactions
    pub income_count: u64,
    /// Number of expense transactions
    pub expense_count: u64,
    /// `total_income - total_expenses`
    pub net_amount: f64,
    /// Per-category breakdown, sorted by category
    pub category_breakdown: Vec<CategoryStats>,
}

fn validate_amount(amount: f64) -> Result<()> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(Error::validation(format!(
            "Amount must be greater than zero, got {amount}"
        )));
    }
    Ok(())
}

fn validate_category(category: &str) -> Result<()> {
    if category.trim().is_empty() {
        return Err(Error::validation("Transaction category cannot be empty"));
    }
    Ok(())
}

/// Records a transaction against one of the user's jars and recomputes that jar's
/// balance.
#[instrument(
    skip(db, new_transaction),
    fields(jar_id = new_transaction.jar_id, amount = new_transaction.amount)
)]
pub async fn record_transaction(
    db: &DatabaseConnection,
    user_id: i64,
    new_transaction: NewTransaction,
) -> Result<transaction::Model> {
    validate_amount(new_transaction.amount)?;
    validate_category(&new_transaction.category)?;

    let txn = db.begin().await?;
    jar::get_jar(&txn, user_id, new_transaction.jar_id).await?;

    let now = Utc::now();
    let created = transaction::ActiveModel {
        jar_id: Set(new_transaction.jar_id),
        amount: Set(new_transaction.amount),
        kind: Set(new_transaction.kind),
        category: Set(new_transaction.category.trim().to_string()),
        description: Set(new_transaction.description),
        date: Set(new_transaction.date.unwrap_or(now)),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let balance = jar::recompute_balance(&txn, created.jar_id).await?;
    txn.commit().await?;

    info!(
        transaction_id = created.id,
        balance, "Recorded {:?} of {:.2}", created.kind, created.amount
    );
    Ok(created)
}

/// Loads one of the user's transactions.
pub async fn get_transaction<C>(
    db: &C,
    user_id: i64,
    transaction_id: i64,
) -> Result<transaction::Model>
where
    C: ConnectionTrait,
{
    Transaction::find_by_id(transaction_id)
        .join(JoinType::InnerJoin, transaction::Relation::Jar.def())
        .filter(jar_entity::Column::UserId.eq(user_id))
        .one(db)
        .await?
        .ok_or(Error::TransactionNotFound { id: transaction_id })
}

/// Applies a partial update. When the transaction moves to another jar, both the old
/// and the new jar balances are recomputed.
#[instrument(skip(db, changes))]
pub async fn update_transaction(
    db: &DatabaseConnection,
    user_id: i64,
    transaction_id: i64,
    changes: TransactionChanges,
) -> Result<transaction::Model> {
    if let Some(amount) = changes.amount {
        validate_amount(amount)?;
    }
    if let Some(category) = &changes.category {
        validate_category(category)?;
    }

    let txn = db.begin().await?;
    let existing = get_transaction(&txn, user_id, transaction_id).await?;
    let previous_jar = existing.jar_id;

    if let Some(jar_id) = changes.jar_id {
        jar::get_jar(&txn, user_id, jar_id).await?;
    }

    let mut active: transaction::ActiveModel = existing.into();
    if let Some(jar_id) = changes.jar_id {
        active.jar_id = Set(jar_id);
    }
    if let Some(amount) = changes.amount {
        active.amount = Set(amount);
    }
    if let Some(kind) = changes.kind {
        active.kind = Set(kind);
    }
    if let Some(category) = changes.category {
        active.category = Set(category.trim().to_string());
    }
    if let Some(description) = changes.description {
        active.description = Set(description);
    }
    if let Some(date) = changes.date {
        active.date = Set(date);
    }
    active.updated_at = Set(Utc::now());
    let updated = active.update(&txn).await?;

    jar::recompute_balance(&txn, updated.jar_id).await?;
    if previous_jar != updated.jar_id {
        jar::recompute_balance(&txn, previous_jar).await?;
    }
    txn.commit().await?;

    info!(transaction_id, "Updated transaction");
    Ok(updated)
}

/// Deletes a transaction and recomputes its jar's balance.
#[instrument(skip(db))]
pub async fn delete_transaction(
    db: &DatabaseConnection,
    user_id: i64,
    transaction_id: i64,
) -> Result<transaction::Model> {
    let txn = db.begin().await?;
    let existing = get_transaction(&txn, user_id, transaction_id).await?;

    Transaction::delete_by_id(transaction_id).exec(&txn).await?;
    jar::recompute_balance(&txn, existing.jar_id).await?;
    txn.commit().await?;

    info!(transaction_id, jar_id = existing.jar_id, "Deleted transaction");
    Ok(existing)
}

fn filtered_query(user_id: i64, filter: &TransactionFilter) -> Select<Transaction> {
    let mut query = Transaction::find()
        .join(JoinType::InnerJoin, transaction::Relation::Jar.def())
        .filter(jar_entity::Column::UserId.eq(user_id));
    if let Some(jar_id) = filter.jar_id {
        query = query.filter(transaction::Column::JarId.eq(jar_id));
    }
    if let Some(kind) = filter.kind {
        query = query.filter(transaction::Column::Kind.eq(kind));
    }
    if let Some(category) = &filter.category {
        query = query.filter(transaction::Column::Category.eq(category.as_str()));
    }
    if let Some(start) = filter.start_date {
        query = query.filter(transaction::Column::Date.gte(start));
    }
    if let Some(end) = filter.end_date {
        query = query.filter(transaction::Column::Date.lte(end));
    }
    query
}

/// Lists the user's transactions, newest first.
pub async fn list_transactions(
    db: &DatabaseConnection,
    user_id: i64,
    filter: &TransactionFilter,
) -> Result<Vec<transaction::Model>> {
    let mut query = filtered_query(user_id, filter)
        .order_by_desc(transaction::Column::Date)
        .order_by_desc(transaction::Column::Id);
    if let Some(limit) = filter.limit {
        query = query.limit(limit);
    }
    query.all(db).await.map_err(Into::into)
}

/// Folds transactions into totals and a per-category breakdown.
#[must_use]
pub fn summarize_transactions(transactions: &[transaction::Model]) -> TransactionStats {
    let mut stats = TransactionStats::default();
    let mut categories: BTreeMap<&str, CategoryStats> = BTreeMap::new();

    for t in transactions {
        stats.total_transactions += 1;
        let entry = categories
            .entry(t.category.as_str())
            .or_insert_with(|| CategoryStats {
                category: t.category.clone(),
                income: 0.0,
                expense: 0.0,
                total_transactions: 0,
            });
        entry.total_transactions += 1;

        match t.kind {
            TransactionKind::Income => {
                stats.total_income += t.amount;
                stats.income_count += 1;
                entry.income += t.amount;
            }
            TransactionKind::Expense => {
                stats.total_expenses += t.amount;
                stats.expense_count += 1;
                entry.expense += t.amount;
            }
        }
    }

    stats.net_amount = stats.total_income - stats.total_expenses;
    stats.category_breakdown = categories.into_values().collect();
    stats
}

/// Totals and per-category breakdown for the transactions matching `filter`.
/// `filter.limit` is ignored.
pub async fn aggregate_stats(
    db: &DatabaseConnection,
    user_id: i64,
    filter: &TransactionFilter,
) -> Result<TransactionStats> {
    let transactions = filtered_query(user_id, filter).all(db).await?;
    Ok(summarize_transactions(&transactions))
}

/// Optional caller-side guard: fails with [`Error::InsufficientFunds`] when spending
/// `amount` would take the jar below zero. The ledger itself never calls this.
pub async fn ensure_sufficient_funds(
    db: &DatabaseConnection,
    user_id: i64,
    jar_id: i64,
    amount: f64,
) -> Result<()> {
    validate_amount(amount)?;
    let jar = jar::get_jar(db, user_id, jar_id).await?;
    if jar.current_amount < amount {
        return Err(Error::InsufficientFunds {
            current: jar.current_amount,
            required: amount,
        });
    }
    Ok(())
}

/// Sum of a user's jar balances, straight from the jar rows.
pub async fn total_balance(db: &DatabaseConnection, user_id: i64) -> Result<f64> {
    let jars = Jar::find()
        .filter(jar_entity::Column::UserId.eq(user_id))
        .all(db)
        .await?;
    Ok(jars.iter().map(|j| j.current_amount).sum())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::*;
    use chrono::TimeZone;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn expense(jar_id: i64, amount: f64) -> NewTransaction {
        NewTransaction {
            jar_id,
            amount,
            kind: TransactionKind::Expense,
            category: "food".to_string(),
            description: "lunch".to_string(),
            date: None,
        }
    }

    #[tokio::test]
    async fn test_record_transaction_validation() {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        for amount in [0.0, -5.0, f64::NAN, f64::INFINITY] {
            let result = record_transaction(&db, 1, expense(1, amount)).await;
            assert!(matches!(result, Err(Error::Validation { .. })));
        }

        let mut blank = expense(1, 5.0);
        blank.category = String::new();
        let result = record_transaction(&db, 1, blank).await;
        assert!(matches!(result, Err(Error::Validation { .. })));
    }

    #[tokio::test]
    async fn test_record_transaction_unknown_jar() -> Result<()> {
        let (db, user) = setup_with_user().await?;
        let result = record_transaction(&db, user.id, expense(404, 10.0)).await;
        assert!(matches!(result, Err(Error::JarNotFound { id: 404 })));
        Ok(())
    }

    #[tokio::test]
    async fn test_balance_is_income_minus_expense() -> Result<()> {
        let (db, user, jar) = setup_with_jar().await?;
        create_test_transaction(&db, user.id, jar.id, 100.0, TransactionKind::Income).await?;
        create_test_transaction(&db, user.id, jar.id, 30.0, TransactionKind::Expense).await?;
        create_test_transaction(&db, user.id, jar.id, 20.0, TransactionKind::Expense).await?;

        let jar = jar::get_jar(&db, user.id, jar.id).await?;
        assert_eq!(jar.current_amount, 50.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_overspending_goes_negative() -> Result<()> {
        let (db, user, jar) = setup_with_jar().await?;
        create_test_transaction(&db, user.id, jar.id, 10.0, TransactionKind::Income).await?;
        record_transaction(&db, user.id, expense(jar.id, 25.0)).await?;

        let jar = jar::get_jar(&db, user.id, jar.id).await?;
        assert_eq!(jar.current_amount, -15.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_backdated_entry_gives_same_balance() -> Result<()> {
        let (db, user, jar) = setup_with_jar().await?;
        create_test_transaction(&db, user.id, jar.id, 40.0, TransactionKind::Expense).await?;

        let mut backdated = NewTransaction {
            kind: TransactionKind::Income,
            ..expense(jar.id, 100.0)
        };
        backdated.date = Some(Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap());
        record_transaction(&db, user.id, backdated).await?;

        let jar = jar::get_jar(&db, user.id, jar.id).await?;
        assert_eq!(jar.current_amount, 60.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_amount_and_kind_recomputes() -> Result<()> {
        let (db, user, jar) = setup_with_jar().await?;
        let t = create_test_transaction(
            &db,
            user.id,
            jar.id,
            40.0,
            TransactionKind::Expense,
        )
        .await?;

        update_transaction(
            &db,
            user.id,
            t.id,
            TransactionChanges {
                amount: Some(70.0),
                kind: Some(TransactionKind::Income),
                ..Default::default()
            },
        )
        .await?;

        let jar = jar::get_jar(&db, user.id, jar.id).await?;
        assert_eq!(jar.current_amount, 70.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_jar_reassignment_recomputes_both() -> Result<()> {
        let (db, user, from) = setup_with_jar().await?;
        let to = create_test_jar(&db, user.id, "Second", 10.0).await?;
        let t = create_test_transaction(
            &db,
            user.id,
            from.id,
            40.0,
            TransactionKind::Expense,
        )
        .await?;

        let moved = update_transaction(
            &db,
            user.id,
            t.id,
            TransactionChanges {
                jar_id: Some(to.id),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(moved.jar_id, to.id);

        assert_eq!(jar::get_jar(&db, user.id, from.id).await?.current_amount, 0.0);
        assert_eq!(jar::get_jar(&db, user.id, to.id).await?.current_amount, -40.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_to_unknown_jar_changes_nothing() -> Result<()> {
        let (db, user, jar) = setup_with_jar().await?;
        let t = create_test_transaction(
            &db,
            user.id,
            jar.id,
            40.0,
            TransactionKind::Expense,
        )
        .await?;

        let result = update_transaction(
            &db,
            user.id,
            t.id,
            TransactionChanges {
                jar_id: Some(999),
                amount: Some(1.0),
                ..Default::default()
            },
        )
        .await;
        assert!(matches!(result, Err(Error::JarNotFound { id: 999 })));

        let unchanged = get_transaction(&db, user.id, t.id).await?;
        assert_eq!(unchanged.amount, 40.0);
        assert_eq!(unchanged.jar_id, jar.id);
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_transaction_recomputes() -> Result<()> {
        let (db, user, jar) = setup_with_jar().await?;
        create_test_transaction(&db, user.id, jar.id, 100.0, TransactionKind::Income).await?;
        let t = create_test_transaction(
            &db,
            user.id,
            jar.id,
            30.0,
            TransactionKind::Expense,
        )
        .await?;

        delete_transaction(&db, user.id, t.id).await?;

        assert_eq!(jar::get_jar(&db, user.id, jar.id).await?.current_amount, 100.0);
        assert!(matches!(
            get_transaction(&db, user.id, t.id).await,
            Err(Error::TransactionNotFound { .. })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_missing_transaction() -> Result<()> {
        let (db, user) = setup_with_user().await?;
        let result = delete_transaction(&db, user.id, 12).await;
        assert!(matches!(result, Err(Error::TransactionNotFound { id: 12 })));
        Ok(())
    }

    #[tokio::test]
    async fn test_other_users_transactions_are_hidden() -> Result<()> {
        let (db, user, jar) = setup_with_jar().await?;
        let t = create_test_transaction(&db, user.id, jar.id, 5.0, TransactionKind::Expense).await?;
        let other = crate::core::user::create_user(&db, "Other".to_string(), 0.0).await?;

        assert!(matches!(
            get_transaction(&db, other.id, t.id).await,
            Err(Error::TransactionNotFound { .. })
        ));
        let listed = list_transactions(&db, other.id, &TransactionFilter::default()).await?;
        assert!(listed.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_list_transactions_filters() -> Result<()> {
        let (db, user, jar) = setup_with_jar().await?;
        let second = create_test_jar(&db, user.id, "Second", 10.0).await?;

        let jan = Utc.with_ymd_and_hms(2024, 1, 10, 12, 0, 0).unwrap();
        let feb = Utc.with_ymd_and_hms(2024, 2, 10, 12, 0, 0).unwrap();
        create_dated_transaction(&db, user.id, jar.id, 10.0, TransactionKind::Expense, jan).await?;
        create_dated_transaction(&db, user.id, jar.id, 20.0, TransactionKind::Income, feb).await?;
        create_dated_transaction(&db, user.id, second.id, 30.0, TransactionKind::Expense, feb)
            .await?;

        let all = list_transactions(&db, user.id, &TransactionFilter::default()).await?;
        assert_eq!(all.len(), 3);
        assert_eq!(all[2].date, jan);

        let by_jar = list_transactions(
            &db,
            user.id,
            &TransactionFilter {
                jar_id: Some(jar.id),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(by_jar.len(), 2);

        let expenses = list_transactions(
            &db,
            user.id,
            &TransactionFilter {
                kind: Some(TransactionKind::Expense),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(expenses.len(), 2);

        let february = list_transactions(
            &db,
            user.id,
            &TransactionFilter {
                start_date: Some(Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap()),
                end_date: Some(Utc.with_ymd_and_hms(2024, 2, 29, 23, 59, 59).unwrap()),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(february.len(), 2);

        let limited = list_transactions(
            &db,
            user.id,
            &TransactionFilter {
                limit: Some(1),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(limited.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_aggregate_stats() -> Result<()> {
        let (db, user, jar) = setup_with_jar().await?;
        create_test_transaction(&db, user.id, jar.id, 1_000.0, TransactionKind::Income).await?;
        record_transaction(&db, user.id, expense(jar.id, 200.0)).await?;
        record_transaction(
            &db,
            user.id,
            NewTransaction {
                category: "rent".to_string(),
                ..expense(jar.id, 500.0)
            },
        )
        .await?;

        let stats = aggregate_stats(&db, user.id, &TransactionFilter::default()).await?;
        assert_eq!(stats.total_transactions, 3);
        assert_eq!(stats.total_income, 1_000.0);
        assert_eq!(stats.total_expenses, 700.0);
        assert_eq!(stats.income_count, 1);
        assert_eq!(stats.expense_count, 2);
        assert_eq!(stats.net_amount, 300.0);

        let categories: Vec<_> = stats
            .category_breakdown
            .iter()
            .map(|c| c.category.as_str())
            .collect();
        assert_eq!(categories, ["food", "rent", "test"]);
        assert_eq!(stats.category_breakdown[1].expense, 500.0);
        Ok(())
    }

    #[test]
    fn test_summarize_empty() {
        let stats = summarize_transactions(&[]);
        assert_eq!(stats, TransactionStats::default());
    }

    #[tokio::test]
    async fn test_ensure_sufficient_funds() -> Result<()> {
        let (db, user, jar) = setup_with_jar().await?;
        create_test_transaction(&db, user.id, jar.id, 50.0, TransactionKind::Income).await?;

        ensure_sufficient_funds(&db, user.id, jar.id, 50.0).await?;
        let result = ensure_sufficient_funds(&db, user.id, jar.id, 60.0).await;
        match result {
            Err(Error::InsufficientFunds { current, required }) => {
                assert_eq!(current, 50.0);
                assert_eq!(required, 60.0);
            }
            other => panic!("expected InsufficientFunds, got {other:?}"),
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_concurrent_writes_to_one_jar_keep_balance_consistent() -> Result<()> {
        let (db, user, jar) = setup_with_jar().await?;
        let income = |amount| NewTransaction {
            kind: TransactionKind::Income,
            ..expense(jar.id, amount)
        };

        let (a, b, c, d, e) = tokio::join!(
            record_transaction(&db, user.id, income(100.0)),
            record_transaction(&db, user.id, expense(jar.id, 30.0)),
            record_transaction(&db, user.id, expense(jar.id, 20.0)),
            record_transaction(&db, user.id, income(5.0)),
            record_transaction(&db, user.id, expense(jar.id, 7.5)),
        );
        for result in [a, b, c, d, e] {
            result?;
        }

        let history = list_transactions(
            &db,
            user.id,
            &TransactionFilter {
                jar_id: Some(jar.id),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(history.len(), 5);
        let expected: f64 = history.iter().map(|t| t.kind.signed(t.amount)).sum();
        let balance = jar::get_jar(&db, user.id, jar.id).await?.current_amount;
        assert_eq!(balance, expected);
        assert_eq!(balance, 47.5);
        Ok(())
    }

    #[tokio::test]
    async fn test_balance_matches_history_after_mixed_writes() -> Result<()> {
        let (db, user, jar) = setup_with_jar().await?;
        let second = create_test_jar(&db, user.id, "Second", 10.0).await?;

        let a = create_test_transaction(&db, user.id, jar.id, 80.0, TransactionKind::Income).await?;
        let b = create_test_transaction(
            &db,
            user.id,
            jar.id,
            15.0,
            TransactionKind::Expense,
        )
        .await?;
        create_test_transaction(&db, user.id, second.id, 5.0, TransactionKind::Expense).await?;
        update_transaction(
            &db,
            user.id,
            b.id,
            TransactionChanges {
                jar_id: Some(second.id),
                ..Default::default()
            },
        )
        .await?;
        delete_transaction(&db, user.id, a.id).await?;

        for j in [jar.id, second.id] {
            let history = list_transactions(
                &db,
                user.id,
                &TransactionFilter {
                    jar_id: Some(j),
                    ..Default::default()
                },
            )
            .await?;
            let expected: f64 = history.iter().map(|t| t.kind.signed(t.amount)).sum();
            assert_eq!(jar::get_jar(&db, user.id, j).await?.current_amount, expected);
        }
        assert_eq!(total_balance(&db, user.id).await?, -20.0);
        Ok(())
    }
}
