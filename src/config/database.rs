//! Database configuration module for the jar ledger.
//!
//! This module handles `SQLite` database connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with `Schema::create_table_from_entity`,
//! so the schema always matches the Rust structs. The one constraint an entity cannot
//! express, the uniqueness of `(user_id, year, month)` on monthly reports, is added as an
//! explicit index.

use crate::entities::{Jar, MonthlyReport, Transaction, User, monthly_report};
use crate::errors::Result;
use sea_orm::sea_query::{Index, IndexCreateStatement, TableCreateStatement};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema};
use tracing::{debug, info};

const DEFAULT_DATABASE_URL: &str = "sqlite://jar_ledger.sqlite?mode=rwc";

/// Name of the unique index on the monthly report key.
pub const REPORT_PERIOD_INDEX: &str = "idx_monthly_reports_user_period";

/// Gets the database URL from the `DATABASE_URL` environment variable, or the default
/// local `SQLite` file if it is not set.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Establishes a connection to the database named by [`get_database_url`].
pub async fn create_connection() -> Result<DatabaseConnection> {
    let database_url = get_database_url();
    info!("Connecting to database at {}", database_url);
    Database::connect(&database_url).await.map_err(Into::into)
}

fn table_for<E: EntityTrait>(schema: &Schema, entity: E) -> TableCreateStatement {
    let mut statement = schema.create_table_from_entity(entity);
    statement.if_not_exists();
    statement
}

fn report_period_index() -> IndexCreateStatement {
    Index::create()
        .name(REPORT_PERIOD_INDEX)
        .table(MonthlyReport)
        .col(monthly_report::Column::UserId)
        .col(monthly_report::Column::Year)
        .col(monthly_report::Column::Month)
        .unique()
        .if_not_exists()
        .to_owned()
}

/// Creates all tables (if missing) plus the unique report index.
///
/// Safe to call on every start-up.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let statements = [
        table_for(&schema, User),
        table_for(&schema, Jar),
        table_for(&schema, Transaction),
        table_for(&schema, MonthlyReport),
    ];
    for statement in &statements {
        db.execute(builder.build(statement)).await?;
    }
    db.execute(builder.build(&report_period_index())).await?;

    debug!("Database schema is up to date");
    Ok(())
}
