//! Core business logic - framework-agnostic jar, ledger and reporting operations.
//!
//! Every function takes the database connection and the owning user's id
//! explicitly and returns a typed value or a structured [`crate::errors::Error`].

/// Final lock on monthly reports
pub mod finalize;
/// Jar registry and the allocation invariant
pub mod jar;
/// All-time figures across jars and ledger
pub mod overview;
/// Calendar month arithmetic
pub mod period;
/// Monthly report generation and queries
pub mod report;
/// Ledger of income and expense transactions
pub mod transaction;
/// Owner profile and income
pub mod user;
