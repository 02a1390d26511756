//! Shared fixtures for the hub integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use breadbox_domain::{Account, Currency, HubConfig};
use breadbox_hub::{BreadBox, EnabledWalletTracker};
use breadbox_memory_runtime::{InMemorySystem, InMemorySystemFactory, InMemoryWalletProvider};
use chrono::{TimeZone, Utc};
use futures::stream::{BoxStream, StreamExt};
use tempfile::TempDir;
use tokio::runtime::Handle;
use tokio::time::timeout;

pub const THROTTLE: Duration = Duration::from_millis(20);
pub const TRANSFER_THROTTLE: Duration = Duration::from_millis(30);
pub const WAIT: Duration = Duration::from_secs(2);
pub const QUIET: Duration = Duration::from_millis(150);

pub const BTC_ID: &str = "bitcoin-testnet:__native__";
pub const ETH_ID: &str = "ethereum-ropsten:__native__";

pub fn btc() -> Currency {
    Currency::new(BTC_ID, "btc", "Bitcoin", 8)
}

pub fn eth() -> Currency {
    Currency::new(ETH_ID, "eth", "Ethereum", 18)
}

pub fn account(uid: &str) -> Account {
    let created_at = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
    Account::new(uid, created_at, uid.as_bytes().to_vec())
}

/// A hub wired to the in-memory runtime with short throttles.
pub struct TestHub {
    pub hub: BreadBox,
    pub factory: Arc<InMemorySystemFactory>,
    pub provider: Arc<InMemoryWalletProvider>,
    pub tracker: Arc<EnabledWalletTracker>,
    pub storage: TempDir,
}

impl TestHub {
    pub fn new() -> Self {
        Self::build(InMemorySystemFactory::new(), Vec::new(), Handle::current())
    }

    pub fn with_wallets(currencies: Vec<Currency>, enabled: Vec<&str>) -> Self {
        Self::build(
            InMemorySystemFactory::with_wallets(currencies),
            enabled,
            Handle::current(),
        )
    }

    pub fn build(factory: InMemorySystemFactory, enabled: Vec<&str>, runtime: Handle) -> Self {
        let storage = tempfile::tempdir().unwrap();
        let config = HubConfig::new(storage.path().join("breadbox"))
            .with_throttles(THROTTLE, TRANSFER_THROTTLE);

        let factory = Arc::new(factory);
        let provider = Arc::new(InMemoryWalletProvider::new(enabled));
        let tracker = Arc::new(EnabledWalletTracker::new(provider.clone()));
        let hub = BreadBox::new(
            config,
            factory.clone(),
            provider.clone(),
            tracker.clone(),
            runtime,
        );

        Self {
            hub,
            factory,
            provider,
            tracker,
            storage,
        }
    }

    /// The runtime handle created by the first successful open.
    pub fn system(&self) -> Arc<InMemorySystem> {
        self.factory.last_system().expect("no system was created")
    }
}

/// Next item of `stream`, failing the test if none arrives in time.
pub async fn next<T>(stream: &mut BoxStream<'static, T>) -> T {
    timeout(WAIT, stream.next())
        .await
        .expect("timed out waiting for an emission")
        .expect("stream ended")
}

/// Skips emissions until one satisfies `predicate`.
pub async fn next_matching<T, F>(stream: &mut BoxStream<'static, T>, predicate: F) -> T
where
    F: Fn(&T) -> bool,
{
    timeout(WAIT, async {
        loop {
            match stream.next().await {
                Some(item) if predicate(&item) => return item,
                Some(_) => continue,
                None => panic!("stream ended"),
            }
        }
    })
    .await
    .expect("timed out waiting for a matching emission")
}

/// Asserts `stream` emits nothing for a while.
pub async fn assert_silent<T: std::fmt::Debug>(stream: &mut BoxStream<'static, T>) {
    if let Ok(Some(item)) = timeout(QUIET, stream.next()).await {
        panic!("unexpected emission: {:?}", item);
    }
}
