//! Store module
//!
//! Persistence layer for the ledger: account and ledger repositories, the
//! transaction coordinator and the funds-transfer engine built on them.

pub mod account;
mod coordinator;
mod error;
pub mod ledger;
mod transfer;

pub use coordinator::{Store, TxFuture};
pub use error::StoreError;
