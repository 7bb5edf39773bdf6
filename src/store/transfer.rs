//! Transfer Engine
//!
//! Moves money between two accounts inside a single unit of work: one
//! transfer record, two balancing entries and two balance updates, all
//! committed together or not at all.

use std::future::Future;
use std::time::Duration;

use sqlx::PgConnection;

use crate::domain::{TransferSide, TransferTxParams, TransferTxResult};

use super::{account, ledger, Store, StoreError};

impl Store {
    /// Transfer `params.amount` from `params.from_account_id` to
    /// `params.to_account_id`.
    ///
    /// Not idempotent: calling twice moves the money twice.
    pub async fn transfer_tx(
        &self,
        params: TransferTxParams,
    ) -> Result<TransferTxResult, StoreError> {
        self.transfer_tx_until(params, std::future::pending()).await
    }

    /// `transfer_tx` bounded by a deadline. Elapsing before commit rolls the
    /// transfer back with `StoreError::Cancelled`.
    pub async fn transfer_tx_with_timeout(
        &self,
        params: TransferTxParams,
        deadline: Duration,
    ) -> Result<TransferTxResult, StoreError> {
        self.transfer_tx_until(params, tokio::time::sleep(deadline))
            .await
    }

    /// `transfer_tx` that gives up as soon as `cancel` resolves, provided the
    /// unit of work has not reached commit yet.
    pub async fn transfer_tx_until<C>(
        &self,
        params: TransferTxParams,
        cancel: C,
    ) -> Result<TransferTxResult, StoreError>
    where
        C: Future<Output = ()> + Send,
    {
        params.validate()?;

        let result = self
            .run_in_transaction_until(
                move |conn| Box::pin(execute_transfer(conn, params)),
                cancel,
            )
            .await?;

        tracing::debug!(
            transfer_id = result.transfer.id,
            from_account_id = params.from_account_id,
            to_account_id = params.to_account_id,
            amount = params.amount,
            "Transfer committed"
        );

        Ok(result)
    }
}

/// Body of the transfer unit of work.
async fn execute_transfer(
    conn: &mut PgConnection,
    params: TransferTxParams,
) -> Result<TransferTxResult, StoreError> {
    let TransferTxParams {
        from_account_id,
        to_account_id,
        amount,
    } = params;

    let transfer = ledger::create_transfer(&mut *conn, from_account_id, to_account_id, amount).await?;

    let from_entry =
        ledger::create_entry(&mut *conn, from_account_id, params.delta(TransferSide::From)).await?;
    let to_entry =
        ledger::create_entry(&mut *conn, to_account_id, params.delta(TransferSide::To)).await?;

    // Lower account id first, whichever side it is on.
    let [(first_side, first_id), (second_side, second_id)] = params.lock_order();
    let first = account::add_account_balance(&mut *conn, first_id, params.delta(first_side)).await?;
    let second =
        account::add_account_balance(&mut *conn, second_id, params.delta(second_side)).await?;

    let (from_account, to_account) = match first_side {
        TransferSide::From => (first, second),
        TransferSide::To => (second, first),
    };

    Ok(TransferTxResult {
        transfer,
        from_entry,
        to_entry,
        from_account,
        to_account,
    })
}
