//! Transfer domain models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Direction of a transfer relative to the owning wallet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransferDirection {
    Sent,
    Received,
    /// Sent to an address owned by the same wallet
    Recovered,
}

/// Lifecycle state of a transfer as reported by the runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TransferState {
    Created,
    Signed,
    Submitted,
    Included { block_height: u64 },
    Failed { reason: String },
    Deleted,
}

/// A single value movement of a wallet, identified by its hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transfer {
    pub hash: String,
    pub amount: Decimal,
    pub fee: Decimal,
    pub direction: TransferDirection,
    pub state: TransferState,
    pub confirmed_at: Option<DateTime<Utc>>,
}

impl Transfer {
    pub fn new(hash: impl Into<String>, amount: Decimal, direction: TransferDirection) -> Self {
        Self {
            hash: hash.into(),
            amount,
            fee: Decimal::ZERO,
            direction,
            state: TransferState::Created,
            confirmed_at: None,
        }
    }

    pub fn with_fee(mut self, fee: Decimal) -> Self {
        self.fee = fee;
        self
    }

    pub fn with_state(mut self, state: TransferState) -> Self {
        self.state = state;
        self
    }

    pub fn hash_string(&self) -> &str {
        &self.hash
    }

    pub fn is_confirmed(&self) -> bool {
        matches!(self.state, TransferState::Included { .. })
    }
}
