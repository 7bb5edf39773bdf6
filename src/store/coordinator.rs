//! Transaction Coordinator
//!
//! Runs a caller-supplied unit of work inside one database transaction:
//! commit on success, rollback on any error, cancellation or panic.

use std::future::Future;
use std::pin::Pin;

use sqlx::{PgConnection, PgPool, Postgres, Transaction};

use super::StoreError;

/// Future returned by a unit of work, borrowing the transaction's connection.
pub type TxFuture<'c, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + Send + 'c>>;

/// Handle on the ledger database.
///
/// Holds only the pool; the transaction handle is never stored here, it is
/// lent to exactly one unit of work at a time.
#[derive(Debug, Clone)]
pub struct Store {
    pool: PgPool,
}

impl Store {
    /// Create a new Store with a database pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Execute `unit_of_work` inside a transaction.
    ///
    /// ```ignore
    /// let account = store
    ///     .run_in_transaction(|conn| Box::pin(async move {
    ///         account::add_account_balance(&mut *conn, id, 10).await
    ///     }))
    ///     .await?;
    /// ```
    pub async fn run_in_transaction<T, F>(&self, unit_of_work: F) -> Result<T, StoreError>
    where
        T: Send,
        F: for<'c> FnOnce(&'c mut PgConnection) -> TxFuture<'c, T> + Send,
    {
        self.run_in_transaction_until(unit_of_work, std::future::pending())
            .await
    }

    /// Like `run_in_transaction`, but aborts with `StoreError::Cancelled` if
    /// `cancel` resolves before the unit of work finishes, including while
    /// still waiting for a connection.
    ///
    /// Commit itself is not raced against `cancel`: once the unit of work has
    /// succeeded the outcome is whatever the commit reports.
    pub async fn run_in_transaction_until<T, F, C>(
        &self,
        unit_of_work: F,
        cancel: C,
    ) -> Result<T, StoreError>
    where
        T: Send,
        F: for<'c> FnOnce(&'c mut PgConnection) -> TxFuture<'c, T> + Send,
        C: Future<Output = ()> + Send,
    {
        tokio::pin!(cancel);

        // Waiting for a pooled connection counts against the same signal.
        let mut tx = tokio::select! {
            biased;
            _ = &mut cancel => return Err(StoreError::Cancelled),
            tx = self.pool.begin() => tx?,
        };

        // Dropping the unit-of-work future releases its borrow of `tx`.
        let outcome = tokio::select! {
            biased;
            _ = &mut cancel => Err(StoreError::Cancelled),
            result = unit_of_work(&mut *tx) => result,
        };

        match outcome {
            Ok(value) => {
                tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(rollback(tx, err).await),
        }
    }
}

/// Roll back and hand back the error that caused it, combined with the
/// rollback failure if there was one.
async fn rollback(tx: Transaction<'static, Postgres>, cause: StoreError) -> StoreError {
    match tx.rollback().await {
        Ok(()) => {
            tracing::warn!(error = %cause, "Transaction rolled back");
            cause
        }
        Err(rollback_err) => {
            tracing::error!(
                error = %cause,
                rollback_error = %rollback_err,
                "Transaction rollback failed"
            );
            StoreError::Rollback {
                cause: Box::new(cause),
                rollback: rollback_err,
            }
        }
    }
}
