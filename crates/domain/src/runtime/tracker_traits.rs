//! Tracked-wallet monitor and enabled-wallets provider traits.

use futures::stream::BoxStream;

use super::SystemListener;

/// Decides which currencies are actively monitored.
///
/// The hub forwards every runtime callback to the tracker verbatim before
/// translating it, so the tracker may react to (and change tracking because
/// of) runtime events.
pub trait WalletTracker: SystemListener {
    /// Restartable stream of the tracked currency-id set. Emits whenever the
    /// set changes.
    fn monitor_tracked_wallets(&self) -> BoxStream<'static, Vec<String>>;
}

/// Source of the currency ids the user has enabled.
pub trait WalletProvider: Send + Sync {
    /// Restartable stream of enabled currency ids, current value first.
    fn enabled_wallets(&self) -> BoxStream<'static, Vec<String>>;
}
