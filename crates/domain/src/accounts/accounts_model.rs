//! Account domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Immutable identity backing a wallet system handle.
///
/// The runtime hands the hub an opaque serialized form of the account. Two
/// accounts are the same account iff those bytes are equal; the uid is only
/// used for logging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    uid: String,
    created_at: DateTime<Utc>,
    serialized: Vec<u8>,
}

impl Account {
    pub fn new(uid: impl Into<String>, created_at: DateTime<Utc>, serialized: Vec<u8>) -> Self {
        Self {
            uid: uid.into(),
            created_at,
            serialized,
        }
    }

    pub fn uid(&self) -> &str {
        &self.uid
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// The runtime's serialized form of this account.
    pub fn serialized(&self) -> &[u8] {
        &self.serialized
    }

    /// Returns true if both accounts serialize to the same bytes.
    pub fn is_same_account(&self, other: &Account) -> bool {
        self.serialized == other.serialized
    }
}
