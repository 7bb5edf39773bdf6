//! Transfer Handler
//!
//! Validates a transfer request against both accounts, runs it through the
//! transfer engine under the configured deadline and queues the follow-up
//! notification.

use std::time::Duration;

use crate::domain::{Currency, DomainError, OperationContext, TransferTxParams, TransferTxResult};
use crate::error::AppError;
use crate::jobs::{PayloadTransferCompleted, TaskDistributor};
use crate::store::Store;

use super::TransferCommand;

/// Handler for transfers between accounts
pub struct TransferHandler {
    store: Store,
    distributor: TaskDistributor,
    timeout: Duration,
}

impl TransferHandler {
    pub fn new(store: Store, distributor: TaskDistributor, timeout: Duration) -> Self {
        Self {
            store,
            distributor,
            timeout,
        }
    }

    /// Execute the transfer command
    pub async fn execute(
        &self,
        command: TransferCommand,
        context: &OperationContext,
    ) -> Result<TransferTxResult, AppError> {
        let currency: Currency = command
            .currency
            .parse()
            .map_err(DomainError::from)?;

        let params = TransferTxParams::new(
            command.from_account_id,
            command.to_account_id,
            command.amount,
        );
        params.validate()?;

        self.valid_account(params.from_account_id, currency).await?;
        self.valid_account(params.to_account_id, currency).await?;

        let result = self
            .store
            .transfer_tx_with_timeout(params, self.timeout)
            .await?;

        tracing::info!(
            correlation_id = ?context.correlation_id,
            client_ip = ?context.client_ip,
            transfer_id = result.transfer.id,
            from_account_id = params.from_account_id,
            to_account_id = params.to_account_id,
            amount = params.amount,
            "Transfer completed"
        );

        let payload = PayloadTransferCompleted {
            transfer_id: result.transfer.id,
            from_account_id: params.from_account_id,
            to_account_id: params.to_account_id,
            amount: params.amount,
        };
        // The transfer is committed; a lost notification must not fail it.
        if let Err(e) = self.distributor.distribute_transfer_completed(&payload) {
            tracing::warn!(
                correlation_id = ?context.correlation_id,
                transfer_id = result.transfer.id,
                error = %e,
                "Failed to enqueue transfer notification"
            );
        }

        Ok(result)
    }

    /// Account must exist and be held in the requested currency.
    async fn valid_account(&self, account_id: i64, currency: Currency) -> Result<(), AppError> {
        let account = self.store.get_account(account_id).await?;

        if account.currency != currency.as_str() {
            return Err(AppError::CurrencyMismatch {
                account_id,
                expected: currency.to_string(),
                actual: account.currency,
            });
        }

        Ok(())
    }
}
