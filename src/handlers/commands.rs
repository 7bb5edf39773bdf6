//! Command definitions
//!
//! Commands represent intentions to change the system state.

use serde::{Deserialize, Serialize};

// =========================================================================
// CreateAccountCommand
// =========================================================================

/// Command to open a new account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAccountCommand {
    pub owner: String,
    /// Three-letter currency code, validated by the handler
    pub currency: String,
    /// Opening balance in minor units
    pub initial_balance: i64,
}

impl CreateAccountCommand {
    pub fn new(owner: String, currency: String) -> Self {
        Self {
            owner,
            currency,
            initial_balance: 0,
        }
    }

    pub fn with_initial_balance(mut self, initial_balance: i64) -> Self {
        self.initial_balance = initial_balance;
        self
    }
}

// =========================================================================
// TransferCommand
// =========================================================================

/// Command to move money between two accounts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferCommand {
    pub from_account_id: i64,
    pub to_account_id: i64,
    /// Amount in minor units
    pub amount: i64,
    /// Currency both accounts must be held in
    pub currency: String,
}

impl TransferCommand {
    pub fn new(from_account_id: i64, to_account_id: i64, amount: i64, currency: String) -> Self {
        Self {
            from_account_id,
            to_account_id,
            amount,
            currency,
        }
    }
}
