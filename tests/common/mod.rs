//! Common test utilities
//!
//! Database-backed tests need `DATABASE_URL` pointing at a Postgres instance.

#![allow(dead_code)]

use rand::distributions::Alphanumeric;
use rand::Rng;
use sqlx::postgres::PgPoolOptions;

use simple_bank::domain::{Account, CreateAccountParams, Currency};
use simple_bank::{db, Store};

/// Connect and make sure the ledger tables exist.
pub async fn setup_test_store() -> Store {
    dotenvy::dotenv().ok();
    let database_url = std::env::var("DATABASE_URL")
        .expect("DATABASE_URL must be set for tests");

    let pool = PgPoolOptions::new()
        .max_connections(20)
        .connect(&database_url)
        .await
        .expect("Failed to connect to DB");

    db::apply_schema(&pool).await.expect("Failed to apply schema");

    Store::new(pool)
}

pub fn random_owner() -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(12)
        .map(char::from)
        .collect();
    format!("owner_{}", suffix.to_lowercase())
}

pub fn random_money() -> i64 {
    rand::thread_rng().gen_range(100..=1000)
}

pub fn random_currency() -> Currency {
    Currency::ALL[rand::thread_rng().gen_range(0..Currency::ALL.len())]
}

pub async fn create_account_with(store: &Store, balance: i64, currency: Currency) -> Account {
    let params = CreateAccountParams::new(random_owner(), balance, currency);
    let account = store
        .create_account(&params)
        .await
        .expect("Failed to create account");

    assert_eq!(account.owner, params.owner);
    assert_eq!(account.balance, balance);
    assert_eq!(account.currency, currency.as_str());
    assert!(account.id > 0);

    account
}

pub async fn create_random_account(store: &Store) -> Account {
    create_account_with(store, random_money(), random_currency()).await
}
