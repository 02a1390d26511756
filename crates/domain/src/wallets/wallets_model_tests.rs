//! Tests for wallet models, sync state and ordering helpers.

use super::*;
use crate::transfers::{Transfer, TransferDirection, TransferState};
use chrono::{TimeZone, Utc};
use rust_decimal_macros::dec;

fn currency(id: &str, code: &str) -> Currency {
    Currency::new(id, code, code.to_uppercase(), 8)
}

fn wallet(id: &str, code: &str) -> Wallet {
    Wallet::new(currency(id, code))
}

fn ids(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

fn codes(wallets: &[Wallet]) -> Vec<&str> {
    wallets.iter().map(|w| w.currency_code()).collect()
}

// ============================================================================
// Wallet
// ============================================================================

#[test]
fn test_currency_matching_ignores_case() {
    let btc = currency("bitcoin-mainnet:__native__", "btc");
    assert!(btc.matches_code("BTC"));
    assert!(btc.matches_id("Bitcoin-Mainnet:__native__"));
    assert!(!btc.matches_code("bch"));
    assert_eq!(currency_key("ETH"), "eth");
}

#[test]
fn test_currency_key_agrees_with_code_matching() {
    let token = currency("token-mainnet:0xe1", "ÉTH");
    for candidate in ["ÉTH", "Éth", "éth", "ÉTh"] {
        assert_eq!(
            token.matches_code(candidate),
            currency_key(candidate) == currency_key(&token.code),
            "candidate {}",
            candidate
        );
    }
    assert_eq!(currency_key("ÉTH"), "Éth");
}

#[test]
fn test_upsert_replaces_by_hash() {
    let mut w = wallet("eth-id", "eth");
    w.upsert_transfer(Transfer::new("0xaa", dec!(1.5), TransferDirection::Received));
    w.upsert_transfer(Transfer::new("0xbb", dec!(2), TransferDirection::Sent));
    w.upsert_transfer(
        Transfer::new("0xaa", dec!(1.5), TransferDirection::Received)
            .with_state(TransferState::Included { block_height: 42 }),
    );

    assert_eq!(w.transfers.len(), 2);
    assert!(w.single_transfer("0xaa").unwrap().is_confirmed());
}

#[test]
fn test_single_transfer_requires_exactly_one_match() {
    let mut w = wallet("eth-id", "eth");
    assert!(w.single_transfer("0xaa").is_none());

    let t = Transfer::new("0xaa", dec!(1), TransferDirection::Sent);
    w.transfers.push(t.clone());
    assert!(w.single_transfer("0xaa").is_some());

    // duplicated hashes are ambiguous
    w.transfers.push(t);
    assert!(w.single_transfer("0xaa").is_none());
}

#[test]
fn test_remove_transfer() {
    let mut w = wallet("eth-id", "eth");
    w.upsert_transfer(Transfer::new("0xaa", dec!(1), TransferDirection::Sent));
    assert_eq!(w.remove_transfer("0xaa").map(|t| t.hash), Some("0xaa".to_string()));
    assert!(w.remove_transfer("0xaa").is_none());
    assert!(w.transfers.is_empty());
}

#[test]
fn test_manager_state_serialization() {
    let json = serde_json::to_string(&WalletManagerState::Syncing).unwrap();
    assert_eq!(json, r#"{"type":"SYNCING"}"#);
    let parsed: WalletManagerState = serde_json::from_str(
        r#"{"type":"DISCONNECTED","reason":"offline"}"#,
    )
    .unwrap();
    assert_eq!(
        parsed,
        WalletManagerState::Disconnected {
            reason: "offline".to_string()
        }
    );
}

// ============================================================================
// WalletSyncState
// ============================================================================

#[test]
fn test_initial_sync_state() {
    let syncing = WalletSyncState::initial("btc", true);
    assert_eq!(syncing.percent_complete, 0.0);
    assert!(syncing.is_syncing);

    let idle = WalletSyncState::initial("btc", false);
    assert_eq!(idle.percent_complete, 1.0);
    assert!(idle.is_complete());
}

#[test]
fn test_progress_normalizes_runtime_percent() {
    let block_time = Utc.timestamp_opt(1_600_000_000, 0).single().unwrap();
    let state = WalletSyncState::progress("eth", 45.0, Some(block_time));

    assert_eq!(state.currency_code, "eth");
    assert!((state.percent_complete - 0.45).abs() < f32::EPSILON);
    assert_eq!(state.timestamp, 1_600_000_000_000);
    assert!(state.is_syncing);
}

#[test]
fn test_progress_is_clamped() {
    assert_eq!(WalletSyncState::progress("eth", 140.0, None).percent_complete, 1.0);
    assert_eq!(WalletSyncState::progress("eth", -3.0, None).percent_complete, 0.0);
    assert_eq!(WalletSyncState::progress("eth", 10.0, None).timestamp, 0);
}

// ============================================================================
// Ordering helpers
// ============================================================================

#[test]
fn test_filter_by_currency_ids() {
    let wallets = vec![wallet("btc-id", "btc"), wallet("eth-id", "eth"), wallet("brd-id", "brd")];
    let filtered = filter_by_currency_ids(wallets, &ids(&["ETH-ID", "btc-id"]));
    assert_eq!(codes(&filtered), vec!["btc", "eth"]);
}

#[test]
fn test_filter_with_empty_ids_yields_nothing() {
    let wallets = vec![wallet("btc-id", "btc")];
    assert!(filter_by_currency_ids(wallets, &[]).is_empty());
}

#[test]
fn test_apply_display_order() {
    let wallets = vec![
        wallet("btc-id", "btc"),
        wallet("xyz-id", "xyz"),
        wallet("eth-id", "eth"),
        wallet("abc-id", "abc"),
        wallet("brd-id", "brd"),
    ];
    let ordered = apply_display_order(wallets, &ids(&["brd-id", "ETH-id", "btc-id"]));
    assert_eq!(codes(&ordered), vec!["brd", "eth", "btc", "xyz", "abc"]);
}
