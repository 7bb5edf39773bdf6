//! simple_bank Library
//!
//! Ledger backend for a simple bank: accounts, transfers and entries in
//! PostgreSQL, with a transactional funds-transfer engine at its core.

pub mod api;
pub mod domain;
pub mod handlers;
pub mod jobs;
pub mod store;

pub mod config;
pub mod db;
mod error;

pub use config::Config;
pub use domain::{Account, Currency, DomainError, Entry, Transfer, TransferTxParams, TransferTxResult};
pub use error::{AppError, AppResult, ErrorResponse};
pub use store::{Store, StoreError};
