//! Wallet domain models.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::transfers::Transfer;

/// Normalizes a currency code into the key used by per-currency channels.
///
/// Folds ASCII letters only, the same folding [`Currency::matches_code`]
/// applies, so two codes share a key exactly when they match.
pub fn currency_key(currency_code: &str) -> String {
    currency_code.to_ascii_lowercase()
}

/// A currency known to the runtime.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Currency {
    /// Runtime-wide identifier, e.g. `bitcoin-mainnet:__native__`
    pub id: String,
    /// Ticker code, e.g. `btc`
    pub code: String,
    pub name: String,
    pub decimals: u8,
}

impl Currency {
    pub fn new(
        id: impl Into<String>,
        code: impl Into<String>,
        name: impl Into<String>,
        decimals: u8,
    ) -> Self {
        Self {
            id: id.into(),
            code: code.into(),
            name: name.into(),
            decimals,
        }
    }

    /// Case-insensitive currency code comparison.
    pub fn matches_code(&self, currency_code: &str) -> bool {
        self.code.eq_ignore_ascii_case(currency_code)
    }

    /// Case-insensitive currency id comparison.
    pub fn matches_id(&self, currency_id: &str) -> bool {
        self.id.eq_ignore_ascii_case(currency_id)
    }
}

/// A blockchain network the runtime can connect to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Network {
    pub uids: String,
    pub name: String,
    pub is_mainnet: bool,
    pub currency: Currency,
}

/// Connection state of a wallet manager.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WalletManagerState {
    #[default]
    Created,
    Disconnected {
        reason: String,
    },
    Connected,
    Syncing,
    Deleted,
}

impl WalletManagerState {
    pub fn is_syncing(&self) -> bool {
        matches!(self, WalletManagerState::Syncing)
    }
}

/// The runtime component that manages one currency's wallet and its network
/// connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletManager {
    pub currency: Currency,
    pub network: String,
    pub state: WalletManagerState,
}

impl WalletManager {
    pub fn new(currency: Currency, network: impl Into<String>, state: WalletManagerState) -> Self {
        Self {
            currency,
            network: network.into(),
            state,
        }
    }
}

/// Snapshot of one currency's wallet.
///
/// The runtime owns the live wallet; the hub only ever sees copies taken at
/// callback or accessor time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wallet {
    pub currency: Currency,
    pub balance: Decimal,
    pub manager_state: WalletManagerState,
    pub transfers: Vec<Transfer>,
}

impl Wallet {
    pub fn new(currency: Currency) -> Self {
        Self {
            currency,
            balance: Decimal::ZERO,
            manager_state: WalletManagerState::Created,
            transfers: Vec::new(),
        }
    }

    pub fn currency_code(&self) -> &str {
        &self.currency.code
    }

    pub fn currency_id(&self) -> &str {
        &self.currency.id
    }

    pub fn is_syncing(&self) -> bool {
        self.manager_state.is_syncing()
    }

    /// Returns the transfer with `hash` if exactly one transfer matches.
    pub fn single_transfer(&self, hash: &str) -> Option<&Transfer> {
        let mut matches = self.transfers.iter().filter(|t| t.hash == hash);
        match (matches.next(), matches.next()) {
            (Some(transfer), None) => Some(transfer),
            _ => None,
        }
    }

    /// Inserts `transfer` or replaces the transfer with the same hash.
    pub fn upsert_transfer(&mut self, transfer: Transfer) {
        match self.transfers.iter_mut().find(|t| t.hash == transfer.hash) {
            Some(existing) => *existing = transfer,
            None => self.transfers.push(transfer),
        }
    }

    /// Removes the transfer with `hash`, returning it if it was present.
    pub fn remove_transfer(&mut self, hash: &str) -> Option<Transfer> {
        let index = self.transfers.iter().position(|t| t.hash == hash)?;
        Some(self.transfers.remove(index))
    }
}
