//! Wallets module - per-currency wallet snapshots, managers and sync state.

mod sync_state;
mod wallets_model;
mod wallets_ordering;

#[cfg(test)]
mod wallets_model_tests;

pub use sync_state::WalletSyncState;
pub use wallets_model::{
    currency_key, Currency, Network, Wallet, WalletManager, WalletManagerState,
};
pub use wallets_ordering::{apply_display_order, filter_by_currency_ids};
