//! Integration tests for the hub's observation streams.

mod common;

use breadbox_domain::{Transfer, TransferDirection, TransferState, WalletManagerState};
use chrono::{TimeZone, Utc};
use common::*;
use rust_decimal_macros::dec;

// =============================================================================
// System, account and wallet lists
// =============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_wallets_are_seeded_without_any_callback() {
    let t = TestHub::with_wallets(vec![btc(), eth()], vec![]);
    t.hub.open(&account("account-1")).unwrap();

    let mut wallets = t.hub.wallets(false);
    let first = next(&mut wallets).await;

    let codes: Vec<_> = first.iter().map(|w| w.currency.code.as_str()).collect();
    assert_eq!(codes, vec!["btc", "eth"]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_system_and_account_streams_follow_the_handle() {
    let t = TestHub::new();
    t.hub.open(&account("account-1")).unwrap();

    let system = next(&mut t.hub.system()).await;
    assert_eq!(system.account().uid(), "account-1");
    let account = next(&mut t.hub.account()).await;
    assert!(account.is_same_account(&common::account("account-1")));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_never_opened_hub_streams_stay_silent() {
    let t = TestHub::new();

    assert_silent(&mut t.hub.wallets(false)).await;
    assert_silent(&mut t.hub.wallet_sync_state("btc")).await;
    assert_silent(&mut t.hub.wallet_transfer_updates("btc")).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_wallet_lookup_is_case_insensitive() {
    let t = TestHub::with_wallets(vec![btc()], vec![]);
    t.hub.open(&account("account-1")).unwrap();

    let wallet = next(&mut t.hub.wallet("BTC")).await;
    assert_eq!(wallet.currency_id(), BTC_ID);

    assert_silent(&mut t.hub.wallet("doge")).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_currency_codes_follow_wallet_membership() {
    let t = TestHub::with_wallets(vec![btc()], vec![]);
    t.hub.open(&account("account-1")).unwrap();

    let mut codes = t.hub.currency_codes();
    assert_eq!(next(&mut codes).await, vec!["btc"]);

    t.system().add_wallet(eth());
    t.system().flush();
    assert_eq!(next(&mut codes).await, vec!["btc", "eth"]);

    // A balance change keeps the code list unchanged.
    t.system().update_balance("eth", dec!(3)).unwrap();
    t.system().flush();
    assert_silent(&mut codes).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_wallet_reflects_balance_updates() {
    let t = TestHub::with_wallets(vec![btc()], vec![]);
    t.hub.open(&account("account-1")).unwrap();

    let mut wallet = t.hub.wallet("btc");
    assert_eq!(next(&mut wallet).await.balance, dec!(0));

    t.system().update_balance("btc", dec!(0.75)).unwrap();
    t.system().flush();
    let updated = next_matching(&mut wallet, |w| w.balance == dec!(0.75)).await;
    assert_eq!(updated.currency_code(), "btc");
}

// =============================================================================
// Tracked wallets
// =============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_wallets_filtered_by_enabled_ids() {
    let t = TestHub::with_wallets(vec![btc(), eth()], vec![BTC_ID]);
    t.hub.open(&account("account-1")).unwrap();

    let mut tracked = t.hub.wallets(true);
    let first = next(&mut tracked).await;
    assert_eq!(first.len(), 1);
    assert_eq!(first[0].currency.code, "btc");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_enabling_a_wallet_republishes_the_tracked_list() {
    let t = TestHub::with_wallets(vec![btc(), eth()], vec![BTC_ID]);
    t.hub.open(&account("account-1")).unwrap();
    t.system().flush();

    let mut tracked = t.hub.wallets(true);
    assert_eq!(next(&mut tracked).await.len(), 1);

    // No runtime callback accompanies this change.
    t.provider.enable(ETH_ID);

    let both = next_matching(&mut tracked, |wallets| wallets.len() == 2).await;
    let codes: Vec<_> = both.iter().map(|w| w.currency.code.as_str()).collect();
    assert_eq!(codes, vec!["btc", "eth"]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_closed_callbacks_reach_the_tracker_only() {
    let t = TestHub::with_wallets(vec![btc()], vec![]);
    t.hub.open(&account("account-1")).unwrap();
    t.hub.close().unwrap();

    let mut codes = t.hub.currency_codes();
    assert_eq!(next(&mut codes).await, vec!["btc"]);

    t.system().add_wallet(eth());
    t.system().flush();

    assert!(t.tracker.managed_currency_ids().contains(ETH_ID));
    assert_silent(&mut codes).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_subscribing_after_close_is_inert() {
    let t = TestHub::with_wallets(vec![btc()], vec![]);
    t.hub.open(&account("account-1")).unwrap();
    t.hub.close().unwrap();

    let mut wallets = t.hub.wallets(true);
    let mut sync_state = t.hub.wallet_sync_state("btc");
    let mut transfers = t.hub.wallet_transfers("btc");
    next(&mut wallets).await;
    next(&mut sync_state).await;
    next(&mut transfers).await;

    let transfer = Transfer::new("0x01", dec!(1), TransferDirection::Received);
    t.system().add_transfer("btc", transfer).unwrap();
    t.system().set_manager_state("btc", WalletManagerState::Syncing).unwrap();
    t.system().flush();

    assert_silent(&mut wallets).await;
    assert_silent(&mut sync_state).await;
    assert_silent(&mut transfers).await;
}

// =============================================================================
// Transfers
// =============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_transfer_lifecycle_updates_every_transfer_stream() {
    let t = TestHub::with_wallets(vec![btc()], vec![]);
    t.hub.open(&account("account-1")).unwrap();

    let mut transfers = t.hub.wallet_transfers("btc");
    let mut updates = t.hub.wallet_transfer_updates("btc");
    assert!(next(&mut transfers).await.is_empty());

    let sent = Transfer::new("0xabc", dec!(0.2), TransferDirection::Sent).with_fee(dec!(0.0001));
    t.system().submit_transfer("btc", sent).unwrap();
    t.system().flush();

    let list = next_matching(&mut transfers, |list| list.len() == 1).await;
    assert_eq!(list[0].state, TransferState::Submitted);
    let update = next(&mut updates).await;
    assert_eq!(update.hash, "0xabc");

    let mut single = t.hub.wallet_transfer("btc", "0xabc");
    assert_eq!(next(&mut single).await.state, TransferState::Submitted);

    t.system()
        .change_transfer("btc", "0xabc", TransferState::Included { block_height: 42 })
        .unwrap();
    t.system().flush();

    let confirmed = next_matching(&mut single, |transfer| transfer.is_confirmed()).await;
    assert!(confirmed.confirmed_at.is_some());
    let update = next_matching(&mut updates, |transfer| transfer.is_confirmed()).await;
    assert_eq!(update.hash, "0xabc");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_single_transfer_is_seeded_from_the_handle() {
    let t = TestHub::with_wallets(vec![btc()], vec![]);
    t.hub.open(&account("account-1")).unwrap();

    let system = t.system();
    system
        .add_transfer("btc", Transfer::new("0x01", dec!(1), TransferDirection::Received))
        .unwrap();
    system
        .add_transfer("btc", Transfer::new("0x02", dec!(2), TransferDirection::Received))
        .unwrap();
    system.flush();

    // The latest update is 0x02; 0x01 still comes from the wallet snapshot.
    let first = next(&mut t.hub.wallet_transfer("BTC", "0x01")).await;
    assert_eq!(first.amount, dec!(1));

    assert_silent(&mut t.hub.wallet_transfer("btc", "0xmissing")).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_deleted_transfer_is_published_and_removed() {
    let t = TestHub::with_wallets(vec![btc()], vec![]);
    t.hub.open(&account("account-1")).unwrap();
    let system = t.system();
    system
        .add_transfer("btc", Transfer::new("0x01", dec!(1), TransferDirection::Received))
        .unwrap();
    system.flush();

    let mut transfers = t.hub.wallet_transfers("btc");
    let mut updates = t.hub.wallet_transfer_updates("btc");
    assert_eq!(next(&mut transfers).await.len(), 1);
    next(&mut updates).await;

    system.delete_transfer("btc", "0x01").unwrap();
    system.flush();

    assert!(next_matching(&mut transfers, |list| list.is_empty()).await.is_empty());
    let deleted = next_matching(&mut updates, |transfer| transfer.state == TransferState::Deleted).await;
    assert_eq!(deleted.hash, "0x01");
}

// =============================================================================
// Sync state
// =============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_sync_state_is_synthesized_before_any_progress() {
    let t = TestHub::with_wallets(vec![btc()], vec![]);
    t.hub.open(&account("account-1")).unwrap();

    let state = next(&mut t.hub.wallet_sync_state("btc")).await;
    assert_eq!(state.currency_code, "btc");
    assert!(!state.is_syncing);
    assert_eq!(state.percent_complete, 1.0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_manager_transitions_bracket_syncing_without_progress() {
    let t = TestHub::with_wallets(vec![btc()], vec![]);
    t.hub.open(&account("account-1")).unwrap();
    let system = t.system();

    let mut sync_state = t.hub.wallet_sync_state("btc");
    next(&mut sync_state).await;

    system.set_manager_state("btc", WalletManagerState::Syncing).unwrap();
    system.flush();
    let started = next_matching(&mut sync_state, |s| s.is_syncing).await;
    assert_eq!(started.percent_complete, 0.0);

    // Leaving Syncing reports 100 % even though no progress was ever reported.
    system
        .set_manager_state(
            "btc",
            WalletManagerState::Disconnected {
                reason: "network lost".to_string(),
            },
        )
        .unwrap();
    system.flush();
    let completed = next_matching(&mut sync_state, |s| !s.is_syncing).await;
    assert_eq!(completed.percent_complete, 1.0);
    assert!(completed.is_complete());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_progress_is_scaled_to_a_fraction() {
    let t = TestHub::with_wallets(vec![eth()], vec![]);
    t.hub.open(&account("account-1")).unwrap();
    let block_time = Utc.with_ymd_and_hms(2021, 6, 1, 12, 0, 0).unwrap();

    let mut sync_state = t.hub.wallet_sync_state("ETH");
    next(&mut sync_state).await;

    t.system().sync_progress("eth", 45.0, Some(block_time)).unwrap();
    t.system().flush();

    let progress = next_matching(&mut sync_state, |s| s.is_syncing).await;
    assert_eq!(progress.currency_code, "eth");
    assert!((progress.percent_complete - 0.45).abs() < f32::EPSILON);
    assert_eq!(progress.timestamp, block_time.timestamp_millis());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_sync_state_is_kept_per_currency() {
    let t = TestHub::with_wallets(vec![btc(), eth()], vec![]);
    t.hub.open(&account("account-1")).unwrap();
    let system = t.system();

    system.sync_progress("btc", 10.0, None).unwrap();
    system.sync_progress("eth", 80.0, None).unwrap();
    system.flush();

    let btc_state = next(&mut t.hub.wallet_sync_state("btc")).await;
    let eth_state = next(&mut t.hub.wallet_sync_state("eth")).await;
    assert!((btc_state.percent_complete - 0.1).abs() < f32::EPSILON);
    assert!((eth_state.percent_complete - 0.8).abs() < f32::EPSILON);
}
