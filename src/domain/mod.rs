//! Domain module
//!
//! Ledger types, validation rules and request context.

pub mod context;
pub mod currency;
pub mod error;
pub mod models;

pub use context::OperationContext;
pub use currency::{Currency, CurrencyError};
pub use error::DomainError;
pub use models::{
    Account, CreateAccountParams, Entry, Pagination, Transfer, TransferSide, TransferTxParams,
    TransferTxResult,
};
