/// Throttle window for coarse-grained streams (system, account, wallets, sync state)
pub const DEFAULT_THROTTLE_MS: u64 = 100;

/// Throttle window for per-transfer streams
pub const AGGRESSIVE_THROTTLE_MS: u64 = 300;

/// Default location of the wallet runtime's persistent data
pub const DEFAULT_STORAGE_DIR: &str = "./data/breadbox";

/// Runtime percentages arrive on a 0-100 scale
pub const RUNTIME_PERCENT_SCALE: f32 = 100.0;

// Environment variables read by `HubConfig::from_env`
pub const ENV_STORAGE_DIR: &str = "BREADBOX_STORAGE_DIR";
pub const ENV_MAINNET: &str = "BREADBOX_MAINNET";
pub const ENV_THROTTLE_MS: &str = "BREADBOX_THROTTLE_MS";
pub const ENV_TRANSFER_THROTTLE_MS: &str = "BREADBOX_TRANSFER_THROTTLE_MS";
