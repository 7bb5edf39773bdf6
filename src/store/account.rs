//! Account Repository
//!
//! CRUD and balance-mutation primitives over the `accounts` relation.
//! Functions take any Postgres executor so they run equally against the
//! pool or inside a unit of work.

use sqlx::PgExecutor;

use crate::domain::{Account, CreateAccountParams, Pagination};

use super::{Store, StoreError};

pub async fn create_account<'e, E>(
    executor: E,
    params: &CreateAccountParams,
) -> Result<Account, StoreError>
where
    E: PgExecutor<'e>,
{
    params.validate()?;

    let account = sqlx::query_as::<_, Account>(
        r#"
        INSERT INTO accounts (owner, balance, currency)
        VALUES ($1, $2, $3)
        RETURNING id, owner, balance, currency, created_at
        "#,
    )
    .bind(&params.owner)
    .bind(params.balance)
    .bind(params.currency.as_str())
    .fetch_one(executor)
    .await?;

    Ok(account)
}

pub async fn get_account<'e, E>(executor: E, id: i64) -> Result<Account, StoreError>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, Account>(
        r#"
        SELECT id, owner, balance, currency, created_at
        FROM accounts
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await?
    .ok_or(StoreError::AccountNotFound(id))
}

/// Add `delta` to the balance and return the updated row.
///
/// A single `UPDATE .. SET balance = balance + $2` so the read-modify-write
/// happens under the row lock and never loses a concurrent update.
pub async fn add_account_balance<'e, E>(
    executor: E,
    id: i64,
    delta: i64,
) -> Result<Account, StoreError>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, Account>(
        r#"
        UPDATE accounts
        SET balance = balance + $2
        WHERE id = $1
        RETURNING id, owner, balance, currency, created_at
        "#,
    )
    .bind(id)
    .bind(delta)
    .fetch_optional(executor)
    .await?
    .ok_or(StoreError::AccountNotFound(id))
}

pub async fn list_accounts<'e, E>(
    executor: E,
    owner: &str,
    page: Pagination,
) -> Result<Vec<Account>, StoreError>
where
    E: PgExecutor<'e>,
{
    let accounts = sqlx::query_as::<_, Account>(
        r#"
        SELECT id, owner, balance, currency, created_at
        FROM accounts
        WHERE owner = $1
        ORDER BY id
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(owner)
    .bind(page.limit)
    .bind(page.offset)
    .fetch_all(executor)
    .await?;

    Ok(accounts)
}

/// Physically delete an account. Fails with a foreign-key error while
/// transfers or entries still reference it.
pub async fn delete_account<'e, E>(executor: E, id: i64) -> Result<(), StoreError>
where
    E: PgExecutor<'e>,
{
    let rows_affected = sqlx::query("DELETE FROM accounts WHERE id = $1")
        .bind(id)
        .execute(executor)
        .await?
        .rows_affected();

    if rows_affected == 0 {
        return Err(StoreError::AccountNotFound(id));
    }

    Ok(())
}

impl Store {
    pub async fn create_account(&self, params: &CreateAccountParams) -> Result<Account, StoreError> {
        create_account(self.pool(), params).await
    }

    pub async fn get_account(&self, id: i64) -> Result<Account, StoreError> {
        get_account(self.pool(), id).await
    }

    pub async fn add_account_balance(&self, id: i64, delta: i64) -> Result<Account, StoreError> {
        add_account_balance(self.pool(), id, delta).await
    }

    pub async fn list_accounts(
        &self,
        owner: &str,
        page: Pagination,
    ) -> Result<Vec<Account>, StoreError> {
        list_accounts(self.pool(), owner, page).await
    }

    pub async fn delete_account(&self, id: i64) -> Result<(), StoreError> {
        delete_account(self.pool(), id).await
    }
}
