//! API Routes
//!
//! HTTP endpoint definitions.

use std::time::Duration;

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::domain::{Account, Entry, OperationContext, Transfer, TransferTxResult};
use crate::error::AppError;
use crate::handlers::{AccountHandler, CreateAccountCommand, TransferCommand, TransferHandler};
use crate::jobs::TaskDistributor;
use crate::store::Store;

/// Shared state handed to every route
#[derive(Debug, Clone)]
pub struct AppState {
    pub store: Store,
    pub distributor: TaskDistributor,
    pub transfer_timeout: Duration,
}

impl AppState {
    pub fn new(store: Store, distributor: TaskDistributor, transfer_timeout: Duration) -> Self {
        Self {
            store,
            distributor,
            transfer_timeout,
        }
    }
}

// =========================================================================
// Request/Response types
// =========================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateAccountRequest {
    pub owner: String,
    pub currency: String,
    #[serde(default)]
    pub balance: i64,
}

#[derive(Debug, Deserialize)]
pub struct ListAccountsQuery {
    pub owner: String,
    #[serde(default = "default_page_id")]
    pub page_id: i64,
    #[serde(default = "default_page_size")]
    pub page_size: i64,
}

fn default_page_id() -> i64 {
    1
}

fn default_page_size() -> i64 {
    5
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TransferRequest {
    pub from_account_id: i64,
    pub to_account_id: i64,
    pub amount: i64,
    pub currency: String,
}

// =========================================================================
// API Router
// =========================================================================

/// Create the API router
pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/accounts", post(create_account).get(list_accounts))
        .route("/accounts/:id", get(get_account).delete(delete_account))
        .route("/transfers", post(create_transfer))
        .route("/transfers/:id", get(get_transfer))
        .route("/entries/:id", get(get_entry))
}

// =========================================================================
// POST /accounts
// =========================================================================

async fn create_account(
    State(state): State<AppState>,
    Json(request): Json<CreateAccountRequest>,
) -> Result<(StatusCode, Json<Account>), AppError> {
    let handler = AccountHandler::new(state.store);

    let command = CreateAccountCommand::new(request.owner, request.currency)
        .with_initial_balance(request.balance);

    let account = handler.create(command).await?;

    Ok((StatusCode::CREATED, Json(account)))
}

// =========================================================================
// GET /accounts/:id
// =========================================================================

async fn get_account(
    State(state): State<AppState>,
    Path(account_id): Path<i64>,
) -> Result<Json<Account>, AppError> {
    let account = AccountHandler::new(state.store).get(account_id).await?;
    Ok(Json(account))
}

// =========================================================================
// GET /accounts?owner=&page_id=&page_size=
// =========================================================================

async fn list_accounts(
    State(state): State<AppState>,
    Query(query): Query<ListAccountsQuery>,
) -> Result<Json<Vec<Account>>, AppError> {
    let accounts = AccountHandler::new(state.store)
        .list(&query.owner, query.page_id, query.page_size)
        .await?;
    Ok(Json(accounts))
}

// =========================================================================
// DELETE /accounts/:id
// =========================================================================

async fn delete_account(
    State(state): State<AppState>,
    Path(account_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    AccountHandler::new(state.store).delete(account_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =========================================================================
// POST /transfers
// =========================================================================

async fn create_transfer(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    Json(request): Json<TransferRequest>,
) -> Result<Json<TransferTxResult>, AppError> {
    let handler = TransferHandler::new(state.store, state.distributor, state.transfer_timeout);

    let command = TransferCommand::new(
        request.from_account_id,
        request.to_account_id,
        request.amount,
        request.currency,
    );

    let result = handler.execute(command, &context).await?;

    Ok(Json(result))
}

// =========================================================================
// GET /transfers/:id
// =========================================================================

async fn get_transfer(
    State(state): State<AppState>,
    Path(transfer_id): Path<i64>,
) -> Result<Json<Transfer>, AppError> {
    let transfer = state.store.get_transfer(transfer_id).await?;
    Ok(Json(transfer))
}

// =========================================================================
// GET /entries/:id
// =========================================================================

async fn get_entry(
    State(state): State<AppState>,
    Path(entry_id): Path<i64>,
) -> Result<Json<Entry>, AppError> {
    let entry = state.store.get_entry(entry_id).await?;
    Ok(Json(entry))
}
