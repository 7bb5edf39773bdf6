//! Store Errors
//!
//! Error types for repository, unit-of-work and transfer engine operations.

use crate::domain::DomainError;

/// SQLSTATE raised when a serializable transaction cannot be ordered.
const SERIALIZATION_FAILURE: &str = "40001";
/// SQLSTATE raised when the server breaks a lock cycle.
const DEADLOCK_DETECTED: &str = "40P01";

/// Errors that can occur in the store
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Bad caller input, rejected before any unit of work was opened
    #[error(transparent)]
    Validation(#[from] DomainError),

    /// Referenced account does not exist
    #[error("Account not found: {0}")]
    AccountNotFound(i64),

    /// Transfer lookup by id missed
    #[error("Transfer not found: {0}")]
    TransferNotFound(i64),

    /// Entry lookup by id missed
    #[error("Entry not found: {0}")]
    EntryNotFound(i64),

    /// Connectivity, constraint violation, deadlock, serialization failure
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The unit of work failed and rolling it back failed as well
    #[error("Transaction error: {cause}; rollback error: {rollback}")]
    Rollback {
        cause: Box<StoreError>,
        rollback: sqlx::Error,
    },

    /// Cancellation signal fired before commit; the unit of work was rolled back
    #[error("Transaction cancelled before commit")]
    Cancelled,
}

impl StoreError {
    /// Check if this error is a missing account, transfer or entry
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            StoreError::AccountNotFound(_)
                | StoreError::TransferNotFound(_)
                | StoreError::EntryNotFound(_)
        )
    }

    /// Check if this error is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, StoreError::Validation(_))
    }

    /// Check if the server aborted the transaction to break a lock cycle
    pub fn is_deadlock(&self) -> bool {
        self.sqlstate().as_deref() == Some(DEADLOCK_DETECTED)
    }

    /// Check if a caller may reasonably retry the whole transfer.
    ///
    /// The engine itself never retries.
    pub fn is_retryable(&self) -> bool {
        match self {
            StoreError::Database(sqlx::Error::PoolTimedOut) => true,
            StoreError::Database(sqlx::Error::Io(_)) => true,
            StoreError::Database(_) => matches!(
                self.sqlstate().as_deref(),
                Some(SERIALIZATION_FAILURE) | Some(DEADLOCK_DETECTED)
            ),
            _ => false,
        }
    }

    /// Check if state integrity can no longer be confirmed (alert, do not retry)
    pub fn is_fatal(&self) -> bool {
        matches!(self, StoreError::Rollback { .. })
    }

    fn sqlstate(&self) -> Option<String> {
        match self {
            StoreError::Database(sqlx::Error::Database(db_err)) => {
                db_err.code().map(|code| code.into_owned())
            }
            _ => None,
        }
    }
}

/// Map a foreign-key violation on `constraint` to `AccountNotFound(account_id)`.
///
/// Any other error passes through as `Database`.
pub(crate) fn map_account_fk(err: sqlx::Error, constraint: &str, account_id: i64) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_foreign_key_violation() && db_err.constraint() == Some(constraint) {
            return StoreError::AccountNotFound(account_id);
        }
    }
    StoreError::Database(err)
}
