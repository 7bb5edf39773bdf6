//! API module
//!
//! HTTP endpoints and middleware for the caller-facing service layer.

pub mod middleware;
pub mod routes;

pub use routes::{create_router, AppState};
