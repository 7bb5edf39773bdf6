//! Integration tests for the transfer engine and transaction coordinator

use std::collections::HashSet;
use std::time::Duration;

use simple_bank::domain::{Currency, DomainError, Pagination, TransferTxParams};
use simple_bank::store::account;
use simple_bank::StoreError;

mod common;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_transfer_tx_scenario() {
    let store = common::setup_test_store().await;

    let a = common::create_account_with(&store, 100, Currency::Usd).await;
    let b = common::create_account_with(&store, 50, Currency::Usd).await;

    let result = store
        .transfer_tx(TransferTxParams::new(a.id, b.id, 30))
        .await
        .unwrap();

    assert_eq!(result.transfer.from_account_id, a.id);
    assert_eq!(result.transfer.to_account_id, b.id);
    assert_eq!(result.transfer.amount, 30);
    assert!(result.transfer.id > 0);

    assert_eq!(result.from_entry.account_id, a.id);
    assert_eq!(result.from_entry.amount, -30);
    assert_eq!(result.to_entry.account_id, b.id);
    assert_eq!(result.to_entry.amount, 30);

    assert_eq!(result.from_account.id, a.id);
    assert_eq!(result.from_account.balance, 70);
    assert_eq!(result.to_account.id, b.id);
    assert_eq!(result.to_account.balance, 80);

    // Everything returned was committed
    assert_eq!(store.get_transfer(result.transfer.id).await.unwrap(), result.transfer);
    assert_eq!(store.get_entry(result.from_entry.id).await.unwrap(), result.from_entry);
    assert_eq!(store.get_entry(result.to_entry.id).await.unwrap(), result.to_entry);
    assert_eq!(store.get_account(a.id).await.unwrap().balance, 70);
    assert_eq!(store.get_account(b.id).await.unwrap().balance, 80);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_transfer_tx_source_first_when_source_id_is_higher() {
    let store = common::setup_test_store().await;

    let low = common::create_account_with(&store, 500, Currency::Eur).await;
    let high = common::create_account_with(&store, 500, Currency::Eur).await;
    assert!(low.id < high.id);

    let result = store
        .transfer_tx(TransferTxParams::new(high.id, low.id, 120))
        .await
        .unwrap();

    assert_eq!(result.from_account.id, high.id);
    assert_eq!(result.from_account.balance, 380);
    assert_eq!(result.to_account.id, low.id);
    assert_eq!(result.to_account.balance, 620);
    assert_eq!(result.from_entry.account_id, high.id);
    assert_eq!(result.to_entry.account_id, low.id);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_transfer_tx_concurrent_same_direction() {
    let store = common::setup_test_store().await;

    let a = common::create_random_account(&store).await;
    let b = common::create_random_account(&store).await;

    let n = 5;
    let amount = 10;

    let handles: Vec<_> = (0..n)
        .map(|_| {
            let store = store.clone();
            tokio::spawn(async move {
                store
                    .transfer_tx(TransferTxParams::new(a.id, b.id, amount))
                    .await
            })
        })
        .collect();

    let mut seen_steps = HashSet::new();
    let mut transfer_ids = HashSet::new();
    for handle in handles {
        let result = handle.await.unwrap().unwrap();

        assert_eq!(result.transfer.from_account_id, a.id);
        assert_eq!(result.transfer.to_account_id, b.id);
        assert_eq!(result.from_entry.amount, -amount);
        assert_eq!(result.to_entry.amount, amount);
        transfer_ids.insert(result.transfer.id);

        // Each result sees its own committed step: 1..=n transfers applied
        let diff_from = a.balance - result.from_account.balance;
        let diff_to = result.to_account.balance - b.balance;
        assert_eq!(diff_from, diff_to);
        assert!(diff_from > 0);
        assert_eq!(diff_from % amount, 0);

        let step = diff_from / amount;
        assert!((1..=n).contains(&step));
        assert!(seen_steps.insert(step), "step {} seen twice", step);
    }

    assert_eq!(transfer_ids.len(), n as usize);

    let updated_a = store.get_account(a.id).await.unwrap();
    let updated_b = store.get_account(b.id).await.unwrap();
    assert_eq!(updated_a.balance, a.balance - n * amount);
    assert_eq!(updated_b.balance, b.balance + n * amount);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_transfer_tx_opposite_directions_do_not_deadlock() {
    let store = common::setup_test_store().await;

    let a = common::create_random_account(&store).await;
    let b = common::create_random_account(&store).await;

    let n = 10;
    let amount = 10;

    let handles: Vec<_> = (0..n)
        .map(|i| {
            let store = store.clone();
            let params = if i % 2 == 1 {
                TransferTxParams::new(b.id, a.id, amount)
            } else {
                TransferTxParams::new(a.id, b.id, amount)
            };
            tokio::spawn(async move { store.transfer_tx(params).await })
        })
        .collect();

    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => {}
            Err(e) => panic!("transfer failed (deadlock: {}): {}", e.is_deadlock(), e),
        }
    }

    let updated_a = store.get_account(a.id).await.unwrap();
    let updated_b = store.get_account(b.id).await.unwrap();
    assert_eq!(updated_a.balance, a.balance);
    assert_eq!(updated_b.balance, b.balance);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_transfer_tx_ring_of_accounts_conserves_money() {
    let store = common::setup_test_store().await;

    let accounts = vec![
        common::create_random_account(&store).await,
        common::create_random_account(&store).await,
        common::create_random_account(&store).await,
    ];
    let total_before: i64 = accounts.iter().map(|a| a.balance).sum();

    // A->B, B->C, C->A and the reverse ring, repeated
    let mut handles = Vec::new();
    for round in 0..4 {
        for i in 0..accounts.len() {
            let from = accounts[i].id;
            let to = accounts[(i + 1) % accounts.len()].id;
            let params = if round % 2 == 0 {
                TransferTxParams::new(from, to, 7)
            } else {
                TransferTxParams::new(to, from, 3)
            };
            let store = store.clone();
            handles.push(tokio::spawn(async move { store.transfer_tx(params).await }));
        }
    }

    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let mut total_after = 0;
    for account in &accounts {
        total_after += store.get_account(account.id).await.unwrap().balance;
    }
    assert_eq!(total_after, total_before);
}

#[tokio::test]
async fn test_transfer_tx_is_not_idempotent() {
    let store = common::setup_test_store().await;

    let a = common::create_account_with(&store, 100, Currency::Cad).await;
    let b = common::create_account_with(&store, 0, Currency::Cad).await;
    let params = TransferTxParams::new(a.id, b.id, 25);

    let first = store.transfer_tx(params).await.unwrap();
    let second = store.transfer_tx(params).await.unwrap();

    assert_ne!(first.transfer.id, second.transfer.id);
    assert_eq!(second.from_account.balance, 50);
    assert_eq!(second.to_account.balance, 50);
}

#[tokio::test]
async fn test_transfer_tx_same_account_rejected_without_writes() {
    let store = common::setup_test_store().await;

    let a = common::create_random_account(&store).await;

    let err = store
        .transfer_tx(TransferTxParams::new(a.id, a.id, 10))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        StoreError::Validation(DomainError::SameAccountTransfer)
    ));
    assert_eq!(store.get_account(a.id).await.unwrap().balance, a.balance);
    let entries = store.list_entries(a.id, Pagination::new(10, 0)).await.unwrap();
    assert!(entries.is_empty());
}

#[tokio::test]
async fn test_transfer_tx_non_positive_amount_rejected() {
    let store = common::setup_test_store().await;

    let a = common::create_random_account(&store).await;
    let b = common::create_random_account(&store).await;

    for amount in [0, -5] {
        let err = store
            .transfer_tx(TransferTxParams::new(a.id, b.id, amount))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Validation(DomainError::InvalidAmount(x)) if x == amount));
    }
}

#[tokio::test]
async fn test_transfer_tx_missing_destination_rolls_back() {
    let store = common::setup_test_store().await;

    let a = common::create_random_account(&store).await;
    let missing = i64::MAX;

    let err = store
        .transfer_tx(TransferTxParams::new(a.id, missing, 10))
        .await
        .unwrap_err();

    assert!(err.is_not_found(), "unexpected error: {}", err);
    assert!(matches!(err, StoreError::AccountNotFound(id) if id == missing));

    assert_eq!(store.get_account(a.id).await.unwrap().balance, a.balance);
    let entries = store.list_entries(a.id, Pagination::new(10, 0)).await.unwrap();
    assert!(entries.is_empty());
    let transfers = store
        .list_transfers(a.id, a.id, Pagination::new(10, 0))
        .await
        .unwrap();
    assert!(transfers.is_empty());
}

#[tokio::test]
async fn test_transfer_tx_missing_source_rolls_back() {
    let store = common::setup_test_store().await;

    let b = common::create_random_account(&store).await;
    let missing = i64::MAX - 1;

    let err = store
        .transfer_tx(TransferTxParams::new(missing, b.id, 10))
        .await
        .unwrap_err();

    assert!(matches!(err, StoreError::AccountNotFound(id) if id == missing));
    assert_eq!(store.get_account(b.id).await.unwrap().balance, b.balance);
}

#[tokio::test]
async fn test_transfer_tx_cancelled_before_commit() {
    let store = common::setup_test_store().await;

    let a = common::create_random_account(&store).await;
    let b = common::create_random_account(&store).await;

    let err = store
        .transfer_tx_until(TransferTxParams::new(a.id, b.id, 10), std::future::ready(()))
        .await
        .unwrap_err();

    assert!(matches!(err, StoreError::Cancelled));
    assert_eq!(store.get_account(a.id).await.unwrap().balance, a.balance);
    assert_eq!(store.get_account(b.id).await.unwrap().balance, b.balance);
}

#[tokio::test]
async fn test_transfer_tx_with_timeout_commits_in_time() {
    let store = common::setup_test_store().await;

    let a = common::create_account_with(&store, 40, Currency::Usd).await;
    let b = common::create_account_with(&store, 0, Currency::Usd).await;

    let result = store
        .transfer_tx_with_timeout(TransferTxParams::new(a.id, b.id, 40), Duration::from_secs(10))
        .await
        .unwrap();

    assert_eq!(result.from_account.balance, 0);
    assert_eq!(result.to_account.balance, 40);
}

#[tokio::test]
async fn test_transfer_tx_does_not_enforce_balance_floor() {
    let store = common::setup_test_store().await;

    let a = common::create_account_with(&store, 10, Currency::Usd).await;
    let b = common::create_account_with(&store, 0, Currency::Usd).await;

    let result = store
        .transfer_tx(TransferTxParams::new(a.id, b.id, 25))
        .await
        .unwrap();

    assert_eq!(result.from_account.balance, -15);
    assert_eq!(result.from_account.balance + result.to_account.balance, 10);
}

// =========================================================================
// Transaction coordinator
// =========================================================================

#[tokio::test]
async fn test_run_in_transaction_commits_on_success() {
    let store = common::setup_test_store().await;

    let a = common::create_random_account(&store).await;
    let id = a.id;

    let updated = store
        .run_in_transaction(move |conn| {
            Box::pin(async move { account::add_account_balance(&mut *conn, id, 15).await })
        })
        .await
        .unwrap();

    assert_eq!(updated.balance, a.balance + 15);
    assert_eq!(store.get_account(a.id).await.unwrap().balance, a.balance + 15);
}

#[tokio::test]
async fn test_run_in_transaction_rolls_back_on_error() {
    let store = common::setup_test_store().await;

    let a = common::create_random_account(&store).await;
    let id = a.id;

    let err = store
        .run_in_transaction(move |conn| {
            Box::pin(async move {
                account::add_account_balance(&mut *conn, id, 15).await?;
                Err::<(), _>(StoreError::AccountNotFound(-1))
            })
        })
        .await
        .unwrap_err();

    assert!(matches!(err, StoreError::AccountNotFound(-1)));
    assert_eq!(store.get_account(a.id).await.unwrap().balance, a.balance);
}
