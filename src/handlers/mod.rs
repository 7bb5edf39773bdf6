//! Command Handlers module
//!
//! Service layer between the HTTP routes and the store: each handler
//! validates a command, calls the store or transfer engine and shapes the
//! result.

mod account_handler;
mod commands;
mod transfer_handler;

pub use account_handler::AccountHandler;
pub use commands::*;
pub use transfer_handler::TransferHandler;
