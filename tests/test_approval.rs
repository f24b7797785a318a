//! Integration tests for router approvals.
//!
//! Run with: `cargo test --test test_approval`

mod common;

use std::sync::{atomic::Ordering, Arc};
use std::time::Duration;

use alloy::primitives::{TxHash, U256};
use tokio::sync::Notify;

use common::{usdc, MockWallet, ALICE};
use swap_widget::{
    types::{ApprovalStatus, TransactionKind},
    ApprovalService, SessionStore, TokenDataService, DEFAULT_SWAP_ROUTER, USDC_ADDRESS,
};

async fn connected_store(wallet: &Arc<MockWallet>) -> SessionStore {
    let store = SessionStore::new(wallet.clone());
    store.connect().await;
    store
}

#[tokio::test]
async fn test_successful_approval() {
    let wallet = MockWallet::new(vec![ALICE]);
    let store = connected_store(&wallet).await;
    let service = ApprovalService::new(store.clone(), DEFAULT_SWAP_ROUTER);

    let status = service.approve(&usdc(), "25.5").await;

    assert_eq!(status, ApprovalStatus::Success { tx_hash: TxHash::with_last_byte(1) });
    assert_eq!(service.status(), status);

    let approvals = wallet.ledger.approvals.lock().unwrap().clone();
    assert_eq!(approvals, vec![(USDC_ADDRESS, DEFAULT_SWAP_ROUTER, U256::from(25_500_000u64))]);

    let history = store.transactions().await;
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].kind, TransactionKind::Approval);
    assert_eq!(history[0].token, "USDC");
    assert_eq!(history[0].amount, "25.5");

    let data = TokenDataService::new(store, DEFAULT_SWAP_ROUTER);
    assert_eq!(data.allowance(&usdc()).await, "25.5");
}

#[tokio::test]
async fn test_failed_approval_reports_error() {
    let wallet = MockWallet::new(vec![ALICE]);
    wallet.ledger.fail_approvals.store(true, Ordering::SeqCst);
    let store = connected_store(&wallet).await;
    let service = ApprovalService::new(store.clone(), DEFAULT_SWAP_ROUTER);

    let status = service.approve(&usdc(), "1").await;

    match &status {
        ApprovalStatus::Error { message } => assert!(message.contains("user denied")),
        other => panic!("Expected error status, got {:?}", other),
    }
    assert!(store.transactions().await.is_empty());

    // No retry happens on its own; a second call is a fresh attempt.
    wallet.ledger.fail_approvals.store(false, Ordering::SeqCst);
    assert!(service.approve(&usdc(), "1").await.is_success());
    assert_eq!(wallet.ledger.approvals.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_invalid_amount_never_reaches_wallet() {
    let wallet = MockWallet::new(vec![ALICE]);
    let store = connected_store(&wallet).await;
    let service = ApprovalService::new(store, DEFAULT_SWAP_ROUTER);

    let status = service.approve(&usdc(), "-3").await;

    assert_eq!(
        status,
        ApprovalStatus::Error { message: "Parse error: Amount cannot be negative".to_string() }
    );
    assert!(wallet.ledger.approvals.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_over_precise_amount_is_rejected() {
    let wallet = MockWallet::new(vec![ALICE]);
    let store = connected_store(&wallet).await;
    let service = ApprovalService::new(store.clone(), DEFAULT_SWAP_ROUTER);

    let status = service.approve(&usdc(), "1.1234567").await;

    match &status {
        ApprovalStatus::Error { message } => {
            assert!(message.contains("Fractional component exceeds 6 decimals"))
        }
        other => panic!("Expected error status, got {:?}", other),
    }
    assert!(wallet.ledger.approvals.lock().unwrap().is_empty());
    assert!(store.transactions().await.is_empty());
}

#[tokio::test]
async fn test_status_is_pending_until_confirmed() {
    let wallet = MockWallet::new(vec![ALICE]);
    let gate = Arc::new(Notify::new());
    *wallet.ledger.approval_gate.lock().unwrap() = Some(gate.clone());
    let store = connected_store(&wallet).await;
    let service = ApprovalService::new(store, DEFAULT_SWAP_ROUTER);
    let mut status_rx = service.subscribe();

    let task = {
        let service = service.clone();
        tokio::spawn(async move { service.approve(&usdc(), "1").await })
    };

    tokio::time::timeout(Duration::from_secs(1), status_rx.changed())
        .await
        .expect("timed out waiting for pending status")
        .unwrap();
    assert!(status_rx.borrow_and_update().is_pending());

    gate.notify_one();

    let status = task.await.unwrap();
    assert!(status.is_success());
    assert!(service.status().is_success());
}
