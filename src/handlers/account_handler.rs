//! Account Handler
//!
//! Opens, reads, lists and deletes accounts.

use crate::domain::{Account, CreateAccountParams, Currency, DomainError, Pagination};
use crate::error::AppError;
use crate::store::{Store, StoreError};

use super::CreateAccountCommand;

/// Handler for account operations
pub struct AccountHandler {
    store: Store,
}

impl AccountHandler {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Open an account. One account per (owner, currency).
    pub async fn create(&self, command: CreateAccountCommand) -> Result<Account, AppError> {
        let currency: Currency = command
            .currency
            .parse()
            .map_err(DomainError::from)?;

        let params = CreateAccountParams::new(command.owner, command.initial_balance, currency);

        match self.store.create_account(&params).await {
            Ok(account) => {
                tracing::info!(
                    account_id = account.id,
                    owner = %account.owner,
                    currency = %account.currency,
                    "Account created"
                );
                Ok(account)
            }
            Err(StoreError::Database(sqlx::Error::Database(db_err)))
                if db_err.is_unique_violation() =>
            {
                Err(AppError::AccountAlreadyExists {
                    owner: params.owner,
                    currency: currency.to_string(),
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn get(&self, account_id: i64) -> Result<Account, AppError> {
        Ok(self.store.get_account(account_id).await?)
    }

    pub async fn list(
        &self,
        owner: &str,
        page_id: i64,
        page_size: i64,
    ) -> Result<Vec<Account>, AppError> {
        let page = Pagination::from_page(page_id, page_size)?;
        Ok(self.store.list_accounts(owner, page).await?)
    }

    /// Delete an account that no transfer or entry references.
    pub async fn delete(&self, account_id: i64) -> Result<(), AppError> {
        match self.store.delete_account(account_id).await {
            Ok(()) => {
                tracing::info!(account_id, "Account deleted");
                Ok(())
            }
            Err(StoreError::Database(sqlx::Error::Database(db_err)))
                if db_err.is_foreign_key_violation() =>
            {
                Err(AppError::AccountInUse(account_id))
            }
            Err(e) => Err(e.into()),
        }
    }
}
