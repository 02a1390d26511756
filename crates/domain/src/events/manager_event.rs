use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::wallets::{Currency, WalletManagerState};

/// Events delivered for a wallet manager.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WalletManagerEvent {
    Created,
    Deleted,
    Changed {
        old_state: WalletManagerState,
        new_state: WalletManagerState,
    },
    WalletAdded { currency: Currency },
    WalletChanged { currency: Currency },
    WalletDeleted { currency: Currency },
    SyncStarted,
    /// Progress on the runtime's 0-100 scale.
    SyncProgress {
        timestamp: Option<DateTime<Utc>>,
        percent_complete: f32,
    },
    SyncStopped { reason: String },
    SyncRecommended,
    BlockUpdated { height: u64 },
}

impl WalletManagerEvent {
    pub fn name(&self) -> &'static str {
        match self {
            WalletManagerEvent::Created => "created",
            WalletManagerEvent::Deleted => "deleted",
            WalletManagerEvent::Changed { .. } => "changed",
            WalletManagerEvent::WalletAdded { .. } => "wallet_added",
            WalletManagerEvent::WalletChanged { .. } => "wallet_changed",
            WalletManagerEvent::WalletDeleted { .. } => "wallet_deleted",
            WalletManagerEvent::SyncStarted => "sync_started",
            WalletManagerEvent::SyncProgress { .. } => "sync_progress",
            WalletManagerEvent::SyncStopped { .. } => "sync_stopped",
            WalletManagerEvent::SyncRecommended => "sync_recommended",
            WalletManagerEvent::BlockUpdated { .. } => "block_updated",
        }
    }
}
