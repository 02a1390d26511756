//! Error types for the in-memory runtime.

use std::path::PathBuf;

use breadbox_domain::HubError;
use thiserror::Error;

/// Result type alias for runtime operations.
pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    /// Reading or writing the wallet snapshot file failed
    #[error("Storage error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The wallet snapshot file is not valid JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The callback thread could not be started
    #[error("Failed to start callback thread: {0}")]
    Thread(#[source] std::io::Error),

    #[error("No wallet for currency '{0}'")]
    UnknownWallet(String),

    #[error("No transfer '{hash}' in wallet '{currency_code}'")]
    UnknownTransfer { currency_code: String, hash: String },

    /// Creation was configured to fail
    #[error("{0}")]
    Injected(String),
}

impl RuntimeError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn unknown_transfer(currency_code: impl Into<String>, hash: impl Into<String>) -> Self {
        Self::UnknownTransfer {
            currency_code: currency_code.into(),
            hash: hash.into(),
        }
    }
}

impl From<RuntimeError> for HubError {
    fn from(err: RuntimeError) -> Self {
        HubError::system_creation(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runtime_errors_become_system_creation() {
        let err: HubError = RuntimeError::Injected("backend offline".to_string()).into();
        assert!(matches!(err, HubError::SystemCreation(ref msg) if msg == "backend offline"));
        assert!(!err.is_precondition());
    }

    #[test]
    fn test_display_messages() {
        assert_eq!(
            RuntimeError::UnknownWallet("btc".to_string()).to_string(),
            "No wallet for currency 'btc'"
        );
        assert_eq!(
            RuntimeError::unknown_transfer("eth", "0xabc").to_string(),
            "No transfer '0xabc' in wallet 'eth'"
        );
    }
}
