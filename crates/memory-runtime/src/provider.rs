//! In-memory enabled-wallets provider.

use breadbox_domain::runtime::WalletProvider;
use futures::stream::{BoxStream, StreamExt};
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

/// Holds the user's enabled currency ids. Subscribers get the current list
/// first, then every change.
pub struct InMemoryWalletProvider {
    enabled: watch::Sender<Vec<String>>,
}

impl InMemoryWalletProvider {
    pub fn new<I, S>(currency_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let (enabled, _receiver) = watch::channel(dedup(currency_ids));
        Self { enabled }
    }

    pub fn enabled(&self) -> Vec<String> {
        self.enabled.borrow().clone()
    }

    pub fn set_enabled_wallets<I, S>(&self, currency_ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.enabled.send_replace(dedup(currency_ids));
    }

    /// Appends `currency_id` unless it is already enabled.
    pub fn enable(&self, currency_id: &str) {
        self.enabled.send_if_modified(|enabled| {
            if enabled.iter().any(|id| id.eq_ignore_ascii_case(currency_id)) {
                return false;
            }
            enabled.push(currency_id.to_string());
            true
        });
    }

    pub fn disable(&self, currency_id: &str) {
        self.enabled.send_if_modified(|enabled| {
            let before = enabled.len();
            enabled.retain(|id| !id.eq_ignore_ascii_case(currency_id));
            enabled.len() != before
        });
    }
}

impl Default for InMemoryWalletProvider {
    fn default() -> Self {
        Self::new(Vec::<String>::new())
    }
}

impl WalletProvider for InMemoryWalletProvider {
    fn enabled_wallets(&self) -> BoxStream<'static, Vec<String>> {
        WatchStream::new(self.enabled.subscribe()).boxed()
    }
}

/// Drops case-insensitive duplicates, keeping first occurrences in order.
fn dedup<I, S>(currency_ids: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut unique: Vec<String> = Vec::new();
    for id in currency_ids {
        let id = id.into();
        if !unique.iter().any(|seen| seen.eq_ignore_ascii_case(&id)) {
            unique.push(id);
        }
    }
    unique
}
