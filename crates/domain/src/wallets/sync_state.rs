use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::RUNTIME_PERCENT_SCALE;

/// Per-currency sync progress as presented to consumers.
///
/// Never persisted: it is rebuilt from the latest manager callback, or
/// synthesized from the manager state when no callback has arrived yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletSyncState {
    pub currency_code: String,
    /// Fraction in `[0, 1]`
    pub percent_complete: f32,
    /// Milliseconds since epoch of the last synced block, 0 when unknown
    pub timestamp: i64,
    pub is_syncing: bool,
}

impl WalletSyncState {
    /// Initial state for a wallet that has not reported progress yet.
    pub fn initial(currency_code: impl Into<String>, is_syncing: bool) -> Self {
        Self {
            currency_code: currency_code.into(),
            percent_complete: if is_syncing { 0.0 } else { 1.0 },
            timestamp: 0,
            is_syncing,
        }
    }

    /// The manager entered the syncing state.
    pub fn started(currency_code: impl Into<String>) -> Self {
        Self::initial(currency_code, true)
    }

    /// The manager left the syncing state.
    pub fn completed(currency_code: impl Into<String>) -> Self {
        Self::initial(currency_code, false)
    }

    /// Progress reported by the runtime on its 0-100 scale.
    pub fn progress(
        currency_code: impl Into<String>,
        runtime_percent: f32,
        last_block: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            currency_code: currency_code.into(),
            percent_complete: (runtime_percent / RUNTIME_PERCENT_SCALE).clamp(0.0, 1.0),
            timestamp: last_block.map(|t| t.timestamp_millis()).unwrap_or(0),
            is_syncing: true,
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.is_syncing && self.percent_complete >= 1.0
    }
}
