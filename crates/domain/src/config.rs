//! Hub configuration.

use std::path::PathBuf;
use std::time::Duration;

use log::warn;

use crate::constants::{
    AGGRESSIVE_THROTTLE_MS, DEFAULT_STORAGE_DIR, DEFAULT_THROTTLE_MS, ENV_MAINNET,
    ENV_STORAGE_DIR, ENV_THROTTLE_MS, ENV_TRANSFER_THROTTLE_MS,
};

/// Settings for one wallet event hub.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HubConfig {
    /// Directory holding the wallet runtime's persistent data.
    pub storage_dir: PathBuf,
    /// Whether the runtime connects to mainnet networks.
    pub is_mainnet: bool,
    /// Throttle for system, account, wallet and sync-state streams.
    pub default_throttle: Duration,
    /// Throttle for transfer list and single-transfer streams.
    pub transfer_throttle: Duration,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            storage_dir: PathBuf::from(DEFAULT_STORAGE_DIR),
            is_mainnet: false,
            default_throttle: Duration::from_millis(DEFAULT_THROTTLE_MS),
            transfer_throttle: Duration::from_millis(AGGRESSIVE_THROTTLE_MS),
        }
    }
}

impl HubConfig {
    pub fn new(storage_dir: impl Into<PathBuf>) -> Self {
        Self {
            storage_dir: storage_dir.into(),
            ..Self::default()
        }
    }

    /// Reads the configuration from `BREADBOX_*` environment variables.
    ///
    /// Missing or unparsable values fall back to the defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let storage_dir = lookup(ENV_STORAGE_DIR)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.storage_dir);

        let is_mainnet = match lookup(ENV_MAINNET) {
            Some(value) => parse_flag(&value).unwrap_or_else(|| {
                warn!("Ignoring invalid {}={}", ENV_MAINNET, value);
                defaults.is_mainnet
            }),
            None => defaults.is_mainnet,
        };

        let default_throttle =
            parse_millis(&lookup, ENV_THROTTLE_MS).unwrap_or(defaults.default_throttle);
        let transfer_throttle =
            parse_millis(&lookup, ENV_TRANSFER_THROTTLE_MS).unwrap_or(defaults.transfer_throttle);

        Self {
            storage_dir,
            is_mainnet,
            default_throttle,
            transfer_throttle,
        }
    }

    pub fn with_mainnet(mut self, is_mainnet: bool) -> Self {
        self.is_mainnet = is_mainnet;
        self
    }

    pub fn with_throttles(mut self, default_throttle: Duration, transfer_throttle: Duration) -> Self {
        self.default_throttle = default_throttle;
        self.transfer_throttle = transfer_throttle;
        self
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn parse_millis<F>(lookup: &F, key: &str) -> Option<Duration>
where
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key)?;
    match raw.trim().parse::<u64>() {
        Ok(ms) => Some(Duration::from_millis(ms)),
        Err(e) => {
            warn!("Ignoring invalid {}={}: {}", key, raw, e);
            None
        }
    }
}
