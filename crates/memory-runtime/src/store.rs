//! Wallet snapshot persistence.

use std::fs;
use std::path::{Path, PathBuf};

use breadbox_domain::Wallet;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::error::{Result, RuntimeError};

/// File name of the wallet snapshot inside the storage directory.
pub const WALLETS_FILE: &str = "wallets.json";

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredWallets {
    account_uid: String,
    wallets: Vec<Wallet>,
}

/// Reads and writes `<storage>/wallets.json` for one account.
pub(crate) struct WalletStore {
    path: PathBuf,
    account_uid: String,
}

impl WalletStore {
    pub(crate) fn new(storage_path: &Path, account_uid: &str) -> Self {
        Self {
            path: storage_path.join(WALLETS_FILE),
            account_uid: account_uid.to_string(),
        }
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the stored wallets. A missing file, or one written for another
    /// account, yields no wallets.
    pub(crate) fn load(&self) -> Result<Vec<Wallet>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let contents =
            fs::read_to_string(&self.path).map_err(|e| RuntimeError::io(&self.path, e))?;
        let stored: StoredWallets = serde_json::from_str(&contents)?;
        if stored.account_uid != self.account_uid {
            warn!(
                "Ignoring {} written for another account",
                self.path.display()
            );
            return Ok(Vec::new());
        }
        debug!(
            "Loaded {} wallet(s) from {}",
            stored.wallets.len(),
            self.path.display()
        );
        Ok(stored.wallets)
    }

    pub(crate) fn save(&self, wallets: &[Wallet]) -> Result<()> {
        let stored = StoredWallets {
            account_uid: self.account_uid.clone(),
            wallets: wallets.to_vec(),
        };
        let contents = serde_json::to_string_pretty(&stored)?;
        fs::write(&self.path, contents).map_err(|e| RuntimeError::io(&self.path, e))?;
        Ok(())
    }
}
