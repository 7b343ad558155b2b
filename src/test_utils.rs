//! Shared test utilities for the jar ledger.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use crate::{
    core::{
        jar::{self, NewJar},
        transaction::{self, NewTransaction},
        user,
    },
    entities::{
        Priority, TransactionKind, jar as jar_entity, transaction as transaction_entity,
        user as user_entity,
    },
    errors::Result,
};
use chrono::{DateTime, Utc};
use sea_orm::DatabaseConnection;
use tracing_subscriber::EnvFilter;

/// Installs a test-writer subscriber so `tracing` output shows up under `cargo test`.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .with_test_writer()
        .try_init();
}

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    init_test_tracing();
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Builds a [`NewJar`] with sensible defaults.
///
/// # Defaults
/// * `category`: "test"
/// * `priority`: medium
/// * `target_amount`: 0.0
/// * `color` / `icon`: "#6B7280" / "jar"
#[must_use]
pub fn new_jar(name: &str, percentage: f64) -> NewJar {
    NewJar {
        name: name.to_string(),
        description: None,
        percentage,
        target_amount: 0.0,
        priority: Priority::Medium,
        category: "test".to_string(),
        color: "#6B7280".to_string(),
        icon: "jar".to_string(),
    }
}

/// Creates a test jar with default settings.
pub async fn create_test_jar(
    db: &DatabaseConnection,
    user_id: i64,
    name: &str,
    percentage: f64,
) -> Result<jar_entity::Model> {
    jar::create_jar(db, user_id, new_jar(name, percentage)).await
}

/// Records a transaction dated now.
///
/// # Defaults
/// * `category`: "test"
/// * `description`: "Test transaction"
pub async fn create_test_transaction(
    db: &DatabaseConnection,
    user_id: i64,
    jar_id: i64,
    amount: f64,
    kind: TransactionKind,
) -> Result<transaction_entity::Model> {
    create_transaction_at(db, user_id, jar_id, amount, kind, None).await
}

/// Records a transaction with an explicit date.
pub async fn create_dated_transaction(
    db: &DatabaseConnection,
    user_id: i64,
    jar_id: i64,
    amount: f64,
    kind: TransactionKind,
    date: DateTime<Utc>,
) -> Result<transaction_entity::Model> {
    create_transaction_at(db, user_id, jar_id, amount, kind, Some(date)).await
}

async fn create_transaction_at(
    db: &DatabaseConnection,
    user_id: i64,
    jar_id: i64,
    amount: f64,
    kind: TransactionKind,
    date: Option<DateTime<Utc>>,
) -> Result<transaction_entity::Model> {
    transaction::record_transaction(
        db,
        user_id,
        NewTransaction {
            jar_id,
            amount,
            kind,
            category: "test".to_string(),
            description: "Test transaction".to_string(),
            date,
        },
    )
    .await
}

/// Sets up a database with one user earning 10,000,000 a month.
pub async fn setup_with_user() -> Result<(DatabaseConnection, user_entity::Model)> {
    let db = setup_test_db().await?;
    let user = user::create_user(&db, "Test User".to_string(), 10_000_000.0).await?;
    Ok((db, user))
}

/// Sets up a database with one user and one 20% jar.
pub async fn setup_with_jar() -> Result<(
    DatabaseConnection,
    user_entity::Model,
    jar_entity::Model,
)> {
    let (db, user) = setup_with_user().await?;
    let jar = create_test_jar(&db, user.id, "Test Jar", 20.0).await?;
    Ok((db, user, jar))
}
