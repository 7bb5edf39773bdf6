//! Ledger models
//!
//! Row types for the `accounts`, `transfers` and `entries` relations and the
//! parameter / result types of the transfer engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::currency::Currency;
use super::error::DomainError;

/// Account balances are signed minor currency units (cents).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Account {
    pub id: i64,
    pub owner: String,
    pub balance: i64,
    pub currency: String,
    pub created_at: DateTime<Utc>,
}

/// Immutable record of one funds movement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Transfer {
    pub id: i64,
    pub from_account_id: i64,
    pub to_account_id: i64,
    pub amount: i64,
    pub created_at: DateTime<Utc>,
}

/// One side of a transfer. Negative for the debited account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Entry {
    pub id: i64,
    pub account_id: i64,
    pub amount: i64,
    pub created_at: DateTime<Utc>,
}

// =========================================================================
// Repository parameters
// =========================================================================

#[derive(Debug, Clone)]
pub struct CreateAccountParams {
    pub owner: String,
    pub balance: i64,
    pub currency: Currency,
}

impl CreateAccountParams {
    pub fn new(owner: impl Into<String>, balance: i64, currency: Currency) -> Self {
        Self {
            owner: owner.into(),
            balance,
            currency,
        }
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.owner.trim().is_empty() {
            return Err(DomainError::EmptyOwner);
        }
        if self.balance < 0 {
            return Err(DomainError::InvalidInitialBalance(self.balance));
        }
        Ok(())
    }
}

/// Limit/offset window over an ordered listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub limit: i64,
    pub offset: i64,
}

impl Pagination {
    pub const MIN_PAGE_SIZE: i64 = 5;
    pub const MAX_PAGE_SIZE: i64 = 10;

    pub fn new(limit: i64, offset: i64) -> Self {
        Self { limit, offset }
    }

    /// Build from a 1-based page id and a page size.
    pub fn from_page(page_id: i64, page_size: i64) -> Result<Self, DomainError> {
        if page_id < 1 {
            return Err(DomainError::InvalidPagination(format!(
                "page_id must be >= 1 (got {})",
                page_id
            )));
        }
        if !(Self::MIN_PAGE_SIZE..=Self::MAX_PAGE_SIZE).contains(&page_size) {
            return Err(DomainError::InvalidPagination(format!(
                "page_size must be between {} and {} (got {})",
                Self::MIN_PAGE_SIZE,
                Self::MAX_PAGE_SIZE,
                page_size
            )));
        }
        let offset = (page_id - 1).checked_mul(page_size).ok_or_else(|| {
            DomainError::InvalidPagination(format!("page_id {} is out of range", page_id))
        })?;
        Ok(Self {
            limit: page_size,
            offset,
        })
    }
}

// =========================================================================
// Transfer engine input / output
// =========================================================================

/// Input of `Store::transfer_tx`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferTxParams {
    pub from_account_id: i64,
    pub to_account_id: i64,
    pub amount: i64,
}

/// Position of an account inside one transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferSide {
    From,
    To,
}

impl TransferTxParams {
    pub fn new(from_account_id: i64, to_account_id: i64, amount: i64) -> Self {
        Self {
            from_account_id,
            to_account_id,
            amount,
        }
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.from_account_id == self.to_account_id {
            return Err(DomainError::SameAccountTransfer);
        }
        if self.amount <= 0 {
            return Err(DomainError::InvalidAmount(self.amount));
        }
        Ok(())
    }

    /// Signed balance delta for one side of the transfer.
    pub fn delta(&self, side: TransferSide) -> i64 {
        match side {
            TransferSide::From => -self.amount,
            TransferSide::To => self.amount,
        }
    }

    /// Balance updates in the order they must be issued: ascending account id.
    ///
    /// Every transfer touching the same pair locks the lower id first, so two
    /// opposite transfers can never wait on each other in a cycle.
    pub fn lock_order(&self) -> [(TransferSide, i64); 2] {
        let from = (TransferSide::From, self.from_account_id);
        let to = (TransferSide::To, self.to_account_id);
        if self.from_account_id < self.to_account_id {
            [from, to]
        } else {
            [to, from]
        }
    }
}

/// Everything one committed transfer produced. Source fields always come
/// first, whatever order the rows were locked in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferTxResult {
    pub transfer: Transfer,
    pub from_entry: Entry,
    pub to_entry: Entry,
    pub from_account: Account,
    pub to_account: Account,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transfer_params_validate() {
        assert!(TransferTxParams::new(1, 2, 10).validate().is_ok());
        assert_eq!(
            TransferTxParams::new(3, 3, 10).validate(),
            Err(DomainError::SameAccountTransfer)
        );
        assert_eq!(
            TransferTxParams::new(1, 2, 0).validate(),
            Err(DomainError::InvalidAmount(0))
        );
        assert_eq!(
            TransferTxParams::new(1, 2, -7).validate(),
            Err(DomainError::InvalidAmount(-7))
        );
    }

    #[test]
    fn test_lock_order_ascending_regardless_of_direction() {
        let forward = TransferTxParams::new(4, 9, 10);
        let backward = TransferTxParams::new(9, 4, 10);

        assert_eq!(
            forward.lock_order(),
            [(TransferSide::From, 4), (TransferSide::To, 9)]
        );
        assert_eq!(
            backward.lock_order(),
            [(TransferSide::To, 4), (TransferSide::From, 9)]
        );
    }

    #[test]
    fn test_delta_follows_side_not_lock_order() {
        let params = TransferTxParams::new(9, 4, 25);
        let deltas: Vec<(i64, i64)> = params
            .lock_order()
            .iter()
            .map(|(side, id)| (*id, params.delta(*side)))
            .collect();

        assert_eq!(deltas, vec![(4, 25), (9, -25)]);
        assert_eq!(deltas.iter().map(|(_, d)| d).sum::<i64>(), 0);
    }

    #[test]
    fn test_create_account_params_validate() {
        assert!(CreateAccountParams::new("alice", 0, Currency::Usd).validate().is_ok());
        assert_eq!(
            CreateAccountParams::new("  ", 0, Currency::Usd).validate(),
            Err(DomainError::EmptyOwner)
        );
        assert_eq!(
            CreateAccountParams::new("bob", -1, Currency::Eur).validate(),
            Err(DomainError::InvalidInitialBalance(-1))
        );
    }

    #[test]
    fn test_pagination_from_page() {
        assert_eq!(Pagination::from_page(1, 5).unwrap(), Pagination::new(5, 0));
        assert_eq!(Pagination::from_page(3, 10).unwrap(), Pagination::new(10, 20));
        assert!(Pagination::from_page(0, 5).is_err());
        assert!(Pagination::from_page(1, 4).is_err());
        assert!(Pagination::from_page(1, 11).is_err());
        assert!(matches!(
            Pagination::from_page(i64::MAX, 10),
            Err(DomainError::InvalidPagination(_))
        ));
        assert_eq!(
            Pagination::from_page(i64::MAX / 10, 10).unwrap().offset,
            (i64::MAX / 10 - 1) * 10
        );
    }
}
