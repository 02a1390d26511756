//! Latest-value multicast channels.
//!
//! Each logical stream is backed by a single-slot watch channel: publishing
//! overwrites the slot and never blocks or fails, and every subscriber sees
//! at most the newest value.

use std::sync::Arc;

use breadbox_domain::currency_key;
use dashmap::DashMap;
use tokio::sync::watch;

pub(crate) struct LatestChannel<T> {
    sender: watch::Sender<Option<T>>,
}

impl<T> LatestChannel<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub(crate) fn new() -> Self {
        let (sender, _receiver) = watch::channel(None);
        Self { sender }
    }

    /// Replaces the slot with `value`, whether or not anyone is listening.
    pub(crate) fn offer(&self, value: T) {
        self.sender.send_replace(Some(value));
    }

    /// The newest published value, if any.
    pub(crate) fn latest(&self) -> Option<T> {
        self.sender.borrow().clone()
    }

    /// A receiver that only observes values published after this call.
    pub(crate) fn subscribe(&self) -> watch::Receiver<Option<T>> {
        self.sender.subscribe()
    }

    /// The current value together with a receiver that reports only values
    /// published after it.
    pub(crate) fn subscribe_with_latest(&self) -> (Option<T>, watch::Receiver<Option<T>>) {
        let mut receiver = self.subscribe();
        let latest = receiver.borrow_and_update().clone();
        (latest, receiver)
    }
}

/// Per-currency channels, created on first reference and kept for the hub's
/// lifetime.
pub(crate) struct ChannelMap<T> {
    channels: DashMap<String, Arc<LatestChannel<T>>>,
}

impl<T> ChannelMap<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub(crate) fn new() -> Self {
        Self {
            channels: DashMap::new(),
        }
    }

    /// Returns the channel for `currency_code` (ASCII case-insensitive),
    /// creating it if needed.
    pub(crate) fn channel(&self, currency_code: &str) -> Arc<LatestChannel<T>> {
        let key = currency_key(currency_code);
        if let Some(existing) = self.channels.get(&key) {
            return Arc::clone(existing.value());
        }
        let entry = self
            .channels
            .entry(key)
            .or_insert_with(|| Arc::new(LatestChannel::new()));
        Arc::clone(entry.value())
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.channels.len()
    }
}
