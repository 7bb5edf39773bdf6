//! Domain Error Types
//!
//! Pure domain errors that don't depend on infrastructure.

use thiserror::Error;

use super::currency::CurrencyError;

/// Validation errors raised before any store interaction.
///
/// These represent bad caller input; no unit of work is opened when one
/// of them is returned.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    /// Transfer to same account
    #[error("Cannot transfer to the same account")]
    SameAccountTransfer,

    /// Zero or negative transfer amount
    #[error("Invalid amount: {0} (must be positive)")]
    InvalidAmount(i64),

    /// Negative opening balance
    #[error("Invalid initial balance: {0} (must not be negative)")]
    InvalidInitialBalance(i64),

    /// Empty account owner
    #[error("Account owner must not be empty")]
    EmptyOwner,

    #[error(transparent)]
    Currency(#[from] CurrencyError),

    /// Page id / page size out of range
    #[error("Invalid pagination: {0}")]
    InvalidPagination(String),
}
