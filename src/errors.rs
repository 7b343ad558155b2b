//! Unified error types for the jar ledger.
//!
//! Every operation returns one of these variants as a structured value. The
//! domain variants mirror the failure modes callers are expected to handle;
//! the remaining ones wrap infrastructure failures.

use thiserror::Error;

/// Errors produced by the jar ledger engine.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed or out-of-range input.
    #[error("Validation error: {message}")]
    Validation {
        /// What was wrong with the input
        message: String,
    },

    /// The active percentage total would exceed 100.
    #[error(
        "Total percentage would exceed 100%. Current: {current}%, requested: {requested}%"
    )]
    AllocationExceeded {
        /// Sum of the other active jars' percentages
        current: f64,
        /// Percentage the caller tried to add
        requested: f64,
    },

    /// No jar with this id exists for the user.
    #[error("Jar not found: {id}")]
    JarNotFound {
        /// Jar id that was looked up
        id: i64,
    },

    /// Jar deletion blocked because transactions still reference it.
    #[error("Cannot delete jar {id} with {count} transactions")]
    JarHasTransactions {
        /// Jar id
        id: i64,
        /// Number of transactions referencing the jar
        count: u64,
    },

    /// No transaction with this id exists for the user.
    #[error("Transaction not found: {id}")]
    TransactionNotFound {
        /// Transaction id that was looked up
        id: i64,
    },

    /// No user with this id exists.
    #[error("User not found: {id}")]
    UserNotFound {
        /// User id that was looked up
        id: i64,
    },

    /// No report exists for the period.
    #[error("Monthly report not found for {year}/{month:02}")]
    ReportNotFound {
        /// Report year
        year: i32,
        /// Report month (1-12)
        month: u32,
    },

    /// The report for the period is finalized and can no longer change.
    #[error("Monthly report for {year}/{month:02} is finalized")]
    ReportLocked {
        /// Report year
        year: i32,
        /// Report month (1-12)
        month: u32,
    },

    /// Caller-level balance check failed. The engine never raises this on its own.
    #[error("Insufficient funds. Current: {current:.2}, required: {required:.2}")]
    InsufficientFunds {
        /// Current jar balance
        current: f64,
        /// Amount the caller wanted to spend
        required: f64,
    },

    /// Configuration could not be loaded or is invalid.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the problem
        message: String,
    },

    /// Database failure.
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Shorthand for building a [`Error::Validation`].
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
