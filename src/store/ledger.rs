//! Ledger Repository
//!
//! Creation and lookup of transfer and entry records. No business logic.

use sqlx::PgExecutor;

use crate::domain::{Entry, Pagination, Transfer};

use super::error::map_account_fk;
use super::{Store, StoreError};

const TRANSFERS_FROM_FK: &str = "transfers_from_account_id_fkey";
const TRANSFERS_TO_FK: &str = "transfers_to_account_id_fkey";
const ENTRIES_ACCOUNT_FK: &str = "entries_account_id_fkey";

pub async fn create_transfer<'e, E>(
    executor: E,
    from_account_id: i64,
    to_account_id: i64,
    amount: i64,
) -> Result<Transfer, StoreError>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, Transfer>(
        r#"
        INSERT INTO transfers (from_account_id, to_account_id, amount)
        VALUES ($1, $2, $3)
        RETURNING id, from_account_id, to_account_id, amount, created_at
        "#,
    )
    .bind(from_account_id)
    .bind(to_account_id)
    .bind(amount)
    .fetch_one(executor)
    .await
    .map_err(|e| {
        let is_to_fk = matches!(
            &e,
            sqlx::Error::Database(db_err) if db_err.constraint() == Some(TRANSFERS_TO_FK)
        );
        if is_to_fk {
            map_account_fk(e, TRANSFERS_TO_FK, to_account_id)
        } else {
            map_account_fk(e, TRANSFERS_FROM_FK, from_account_id)
        }
    })
}

pub async fn create_entry<'e, E>(
    executor: E,
    account_id: i64,
    amount: i64,
) -> Result<Entry, StoreError>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, Entry>(
        r#"
        INSERT INTO entries (account_id, amount)
        VALUES ($1, $2)
        RETURNING id, account_id, amount, created_at
        "#,
    )
    .bind(account_id)
    .bind(amount)
    .fetch_one(executor)
    .await
    .map_err(|e| map_account_fk(e, ENTRIES_ACCOUNT_FK, account_id))
}

pub async fn get_transfer<'e, E>(executor: E, id: i64) -> Result<Transfer, StoreError>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, Transfer>(
        r#"
        SELECT id, from_account_id, to_account_id, amount, created_at
        FROM transfers
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await?
    .ok_or(StoreError::TransferNotFound(id))
}

pub async fn get_entry<'e, E>(executor: E, id: i64) -> Result<Entry, StoreError>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, Entry>(
        r#"
        SELECT id, account_id, amount, created_at
        FROM entries
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await?
    .ok_or(StoreError::EntryNotFound(id))
}

pub async fn list_entries<'e, E>(
    executor: E,
    account_id: i64,
    page: Pagination,
) -> Result<Vec<Entry>, StoreError>
where
    E: PgExecutor<'e>,
{
    let entries = sqlx::query_as::<_, Entry>(
        r#"
        SELECT id, account_id, amount, created_at
        FROM entries
        WHERE account_id = $1
        ORDER BY id
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(account_id)
    .bind(page.limit)
    .bind(page.offset)
    .fetch_all(executor)
    .await?;

    Ok(entries)
}

/// Transfers sent by `from_account_id` or received by `to_account_id`.
pub async fn list_transfers<'e, E>(
    executor: E,
    from_account_id: i64,
    to_account_id: i64,
    page: Pagination,
) -> Result<Vec<Transfer>, StoreError>
where
    E: PgExecutor<'e>,
{
    let transfers = sqlx::query_as::<_, Transfer>(
        r#"
        SELECT id, from_account_id, to_account_id, amount, created_at
        FROM transfers
        WHERE from_account_id = $1 OR to_account_id = $2
        ORDER BY id
        LIMIT $3 OFFSET $4
        "#,
    )
    .bind(from_account_id)
    .bind(to_account_id)
    .bind(page.limit)
    .bind(page.offset)
    .fetch_all(executor)
    .await?;

    Ok(transfers)
}

impl Store {
    pub async fn get_transfer(&self, id: i64) -> Result<Transfer, StoreError> {
        get_transfer(self.pool(), id).await
    }

    pub async fn get_entry(&self, id: i64) -> Result<Entry, StoreError> {
        get_entry(self.pool(), id).await
    }

    pub async fn list_entries(
        &self,
        account_id: i64,
        page: Pagination,
    ) -> Result<Vec<Entry>, StoreError> {
        list_entries(self.pool(), account_id, page).await
    }

    pub async fn list_transfers(
        &self,
        from_account_id: i64,
        to_account_id: i64,
        page: Pagination,
    ) -> Result<Vec<Transfer>, StoreError> {
        list_transfers(self.pool(), from_account_id, to_account_id, page).await
    }
}
