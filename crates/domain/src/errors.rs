//! Error types for the wallet event hub.
//!
//! Every variant is a precondition or environment failure: the hub reports it
//! to the caller and never retries. Absence of a wallet or transfer is not an
//! error anywhere in this crate; streams simply do not emit.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for hub operations.
pub type Result<T> = std::result::Result<T, HubError>;

/// Errors returned by the hub lifecycle operations.
#[derive(Debug, Error)]
pub enum HubError {
    /// `open()` was called while the hub was already open.
    #[error("open() called while BreadBox was open")]
    AlreadyOpen,

    /// `close()` was called while the hub was closed.
    #[error("BreadBox must be opened before calling close()")]
    NotOpen,

    /// The account serialized to zero bytes.
    #[error("Account serialization contains 0 bytes")]
    EmptyAccount,

    /// The account differs from the one bound to the existing system handle.
    #[error(
        "Provided account does not match the existing system account, \
         BreadBox does not support swapping accounts at runtime"
    )]
    AccountMismatch,

    /// The storage directory for the runtime could not be created.
    #[error("Failed to create storage directory {}: {source}", .path.display())]
    StorageDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The runtime factory failed to create a system handle.
    #[error("Failed to create wallet system: {0}")]
    SystemCreation(String),
}

impl HubError {
    /// Create a system creation error
    pub fn system_creation(message: impl Into<String>) -> Self {
        Self::SystemCreation(message.into())
    }

    /// Returns true for caller errors against the open/close state machine.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            Self::AlreadyOpen | Self::NotOpen | Self::EmptyAccount | Self::AccountMismatch
        )
    }
}
