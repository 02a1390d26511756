//! The wallet event hub.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use breadbox_domain::runtime::{
    SystemFactory, SystemParams, WalletProvider, WalletSystem, WalletTracker,
};
use breadbox_domain::{
    filter_by_currency_ids, Account, HubConfig, HubError, Result, Transfer, Wallet,
    WalletSyncState,
};
use futures::stream::{BoxStream, StreamExt};
use futures::future;
use log::{debug, info};
use tokio::runtime::Handle;

use crate::channels::{ChannelMap, LatestChannel};
use crate::listener::HubListener;
use crate::streams::{
    deferred, distinct_until_changed, distinct_until_changed_by, seeded, throttle_latest,
};
use crate::supervisor::TaskGroup;

/// Single point of truth for "is the wallet system running, and what does it
/// currently know".
///
/// Opening creates (or resumes) the runtime handle for one account and starts
/// forwarding the runtime's callbacks into per-topic channels. Every accessor
/// returns a fresh, lazy stream over one of those channels, seeded with the
/// best snapshot known when the stream is first polled.
///
/// `open`, `close` and every runtime callback are serialized by one lock.
pub struct BreadBox {
    inner: Arc<HubInner>,
}

pub(crate) struct HubInner {
    config: HubConfig,
    factory: Arc<dyn SystemFactory>,
    wallet_provider: Arc<dyn WalletProvider>,
    pub(crate) tracker: Arc<dyn WalletTracker>,
    runtime: Handle,
    state: Mutex<HubState>,
    system_channel: Arc<LatestChannel<Arc<dyn WalletSystem>>>,
    account_channel: Arc<LatestChannel<Account>>,
    pub(crate) wallets_channel: Arc<LatestChannel<Vec<Wallet>>>,
    pub(crate) sync_state_channels: ChannelMap<WalletSyncState>,
    pub(crate) transfers_channels: ChannelMap<Vec<Transfer>>,
    pub(crate) transfer_updated_channels: ChannelMap<Transfer>,
}

pub(crate) struct HubState {
    pub(crate) is_open: bool,
    system: Option<Arc<dyn WalletSystem>>,
    session: Option<TaskGroup>,
}

impl BreadBox {
    /// Creates a closed hub.
    ///
    /// `runtime` hosts the hub's background tasks; it must outlive the hub.
    pub fn new(
        config: HubConfig,
        factory: Arc<dyn SystemFactory>,
        wallet_provider: Arc<dyn WalletProvider>,
        tracker: Arc<dyn WalletTracker>,
        runtime: Handle,
    ) -> Self {
        Self {
            inner: Arc::new(HubInner {
                config,
                factory,
                wallet_provider,
                tracker,
                runtime,
                state: Mutex::new(HubState {
                    is_open: false,
                    system: None,
                    session: None,
                }),
                system_channel: Arc::new(LatestChannel::new()),
                account_channel: Arc::new(LatestChannel::new()),
                wallets_channel: Arc::new(LatestChannel::new()),
                sync_state_channels: ChannelMap::new(),
                transfers_channels: ChannelMap::new(),
                transfer_updated_channels: ChannelMap::new(),
            }),
        }
    }

    pub fn config(&self) -> &HubConfig {
        &self.inner.config
    }

    /// Opens the hub for `account`.
    ///
    /// The first call creates the system handle; later calls resume it and
    /// must pass the same account. Fails with [`HubError::AlreadyOpen`],
    /// [`HubError::EmptyAccount`], [`HubError::AccountMismatch`],
    /// [`HubError::StorageDirectory`] or [`HubError::SystemCreation`].
    pub fn open(&self, account: &Account) -> Result<()> {
        debug!("Opening BreadBox");
        let inner = &self.inner;
        let mut state = inner.lock_state();

        if state.is_open {
            return Err(HubError::AlreadyOpen);
        }
        if account.serialized().is_empty() {
            return Err(HubError::EmptyAccount);
        }
        inner.ensure_storage_dir()?;

        let system = match &state.system {
            Some(system) => Arc::clone(system),
            None => {
                let system = inner.create_system(account)?;
                state.system = Some(Arc::clone(&system));
                system
            }
        };

        if !system.account().is_same_account(account) {
            return Err(HubError::AccountMismatch);
        }

        debug!("Dispatching initial System values");
        system.connect_all();

        inner.system_channel.offer(Arc::clone(&system));
        inner.account_channel.offer(system.account());
        let wallets = system.wallets();
        for wallet in &wallets {
            inner
                .transfers_channels
                .channel(wallet.currency_code())
                .offer(wallet.transfers.clone());
            inner.refresh_sync_state(wallet);
            inner.refresh_transfer_update(wallet);
        }
        inner.wallets_channel.offer(wallets);

        state.is_open = true;

        let mut session = TaskGroup::new("breadbox-session", inner.runtime.clone());
        session.spawn(
            "tracked-wallets",
            republish_on_tracking_change(
                Arc::downgrade(inner),
                inner.tracker.monitor_tracked_wallets(),
            ),
        );
        state.session = Some(session);

        info!("BreadBox opened successfully for account {}", account.uid());
        Ok(())
    }

    /// Closes the hub: cancels background work and disconnects the handle.
    ///
    /// The handle itself is kept so a later `open` with the same account
    /// resumes it. Fails with [`HubError::NotOpen`] if the hub is closed.
    pub fn close(&self) -> Result<()> {
        debug!("Closing BreadBox");
        let mut state = self.inner.lock_state();

        if !state.is_open {
            return Err(HubError::NotOpen);
        }

        if let Some(session) = state.session.take() {
            debug!("Cancelling {} session task(s)", session.len());
            session.shutdown();
        }
        if let Some(system) = &state.system {
            system.disconnect_all();
        }

        state.is_open = false;
        info!("BreadBox closed");
        Ok(())
    }

    pub fn is_open(&self) -> bool {
        self.inner.lock_state().is_open
    }

    /// The raw system handle, if one was ever created.
    ///
    /// Bypasses the streams entirely, so reads through it are not ordered
    /// with respect to any stream emission.
    pub fn get_system_unsafe(&self) -> Option<Arc<dyn WalletSystem>> {
        self.inner.system_snapshot()
    }

    pub fn system(&self) -> BoxStream<'static, Arc<dyn WalletSystem>> {
        self.inner.observe(
            Arc::clone(&self.inner.system_channel),
            self.inner.config.default_throttle,
            |system| Some(Arc::clone(system)),
        )
    }

    pub fn account(&self) -> BoxStream<'static, Account> {
        self.inner.observe(
            Arc::clone(&self.inner.account_channel),
            self.inner.config.default_throttle,
            |system| Some(system.account()),
        )
    }

    /// Wallet list snapshots, re-emitted only when the list of currency codes
    /// changes.
    ///
    /// With `filter_by_tracked`, wallets are intersected with the current
    /// enabled-wallets set.
    pub fn wallets(&self, filter_by_tracked: bool) -> BoxStream<'static, Vec<Wallet>> {
        let provider = Arc::clone(&self.inner.wallet_provider);
        let wallets = self
            .all_wallets()
            .then(move |wallets| {
                let provider = Arc::clone(&provider);
                async move {
                    if !filter_by_tracked {
                        return wallets;
                    }
                    let enabled = provider
                        .enabled_wallets()
                        .next()
                        .await
                        .unwrap_or_default();
                    filter_by_currency_ids(wallets, &enabled)
                }
            })
            .boxed();

        distinct_until_changed_by(wallets, |wallets| {
            wallets
                .iter()
                .map(|wallet| wallet.currency.code.clone())
                .collect::<Vec<_>>()
        })
    }

    /// The wallet for `currency_code`; silent while no such wallet exists.
    pub fn wallet(&self, currency_code: &str) -> BoxStream<'static, Wallet> {
        let currency_code = currency_code.to_string();
        self.all_wallets()
            .filter_map(move |wallets| {
                future::ready(
                    wallets
                        .into_iter()
                        .find(|wallet| wallet.currency.matches_code(&currency_code)),
                )
            })
            .boxed()
    }

    /// Currency codes of every wallet, emitted on membership or order change.
    pub fn currency_codes(&self) -> BoxStream<'static, Vec<String>> {
        let codes = self
            .all_wallets()
            .map(|wallets| {
                wallets
                    .into_iter()
                    .map(|wallet| wallet.currency.code)
                    .collect::<Vec<_>>()
            })
            .boxed();
        distinct_until_changed(codes)
    }

    /// Sync progress for `currency_code`.
    ///
    /// Runtime progress callbacks are sparse, so a subscriber that arrives
    /// before any callback gets a synthesized state once the wallet is known:
    /// 0 % if its manager is syncing, 100 % otherwise.
    pub fn wallet_sync_state(&self, currency_code: &str) -> BoxStream<'static, WalletSyncState> {
        let channel = self.inner.sync_state_channels.channel(currency_code);
        let period = self.inner.config.default_throttle;
        let code = currency_code.to_string();
        let mut wallet = self.wallet(currency_code);

        let sync_states = deferred(move || {
            let (latest, receiver) = channel.subscribe_with_latest();
            let seed = async move {
                if latest.is_some() {
                    return latest;
                }
                wallet
                    .next()
                    .await
                    .map(|wallet| WalletSyncState::initial(code, wallet.is_syncing()))
            };
            seeded(seed, throttle_latest(receiver, period))
        });

        distinct_until_changed(sync_states)
    }

    /// Transfer list of the wallet for `currency_code`.
    pub fn wallet_transfers(&self, currency_code: &str) -> BoxStream<'static, Vec<Transfer>> {
        let channel = self.inner.transfers_channels.channel(currency_code);
        let currency_code = currency_code.to_string();
        self.inner.observe(
            channel,
            self.inner.config.transfer_throttle,
            move |system| {
                system
                    .wallets()
                    .into_iter()
                    .find(|wallet| wallet.currency.matches_code(&currency_code))
                    .map(|wallet| wallet.transfers)
            },
        )
    }

    /// Updates of the single transfer `transfer_hash` in `currency_code`.
    ///
    /// Seeded from the handle's copy of the transfer; the last published
    /// update is used only when the handle no longer holds it.
    pub fn wallet_transfer(
        &self,
        currency_code: &str,
        transfer_hash: &str,
    ) -> BoxStream<'static, Transfer> {
        let channel = self.inner.transfer_updated_channels.channel(currency_code);
        let period = self.inner.config.transfer_throttle;
        let inner = Arc::downgrade(&self.inner);
        let currency_code = currency_code.to_string();
        let hash = transfer_hash.to_string();

        deferred(move || {
            let (latest, receiver) = channel.subscribe_with_latest();
            let latest = latest.filter(|transfer| transfer.hash == hash);
            let updates = {
                let hash = hash.clone();
                throttle_latest(receiver, period)
                    .filter(move |transfer| future::ready(transfer.hash == hash))
                    .boxed()
            };

            let seed = async move {
                let live = inner
                    .upgrade()
                    .and_then(|inner| inner.system_snapshot())
                    .and_then(|system| {
                        system
                            .wallets()
                            .iter()
                            .find(|wallet| wallet.currency.matches_code(&currency_code))
                            .and_then(|wallet| wallet.single_transfer(&hash).cloned())
                    });
                live.or(latest)
            };
            seeded(seed, updates)
        })
    }

    /// Every transfer update for `currency_code`.
    pub fn wallet_transfer_updates(&self, currency_code: &str) -> BoxStream<'static, Transfer> {
        let channel = self.inner.transfer_updated_channels.channel(currency_code);
        let period = self.inner.config.transfer_throttle;
        deferred(move || {
            let (latest, receiver) = channel.subscribe_with_latest();
            seeded(future::ready(latest), throttle_latest(receiver, period))
        })
    }

    fn all_wallets(&self) -> BoxStream<'static, Vec<Wallet>> {
        self.inner.observe(
            Arc::clone(&self.inner.wallets_channel),
            self.inner.config.default_throttle,
            |system| Some(system.wallets()),
        )
    }
}

impl HubInner {
    pub(crate) fn lock_state(&self) -> MutexGuard<'_, HubState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn system_snapshot(&self) -> Option<Arc<dyn WalletSystem>> {
        self.lock_state().system.clone()
    }

    fn ensure_storage_dir(&self) -> Result<()> {
        let path = &self.config.storage_dir;
        if !path.exists() {
            debug!("Making storage directories at {}", path.display());
            std::fs::create_dir_all(path).map_err(|source| HubError::StorageDirectory {
                path: path.clone(),
                source,
            })?;
        }
        Ok(())
    }

    fn create_system(self: &Arc<Self>, account: &Account) -> Result<Arc<dyn WalletSystem>> {
        let listener = Arc::new(HubListener::new(Arc::downgrade(self)));
        let system = self.factory.create_system(SystemParams {
            listener,
            account: account.clone(),
            is_mainnet: self.config.is_mainnet,
            storage_path: self.config.storage_dir.clone(),
        })?;
        system.configure(&[]);
        debug!("Created new System instance");
        Ok(system)
    }

    /// Re-derives the sync state of `wallet` after an open.
    ///
    /// Manager transitions reported while the hub was closed were dropped, so
    /// a published state that disagrees with the manager is replaced by the
    /// synthesized one. Progress is kept while the manager is still syncing.
    fn refresh_sync_state(&self, wallet: &Wallet) {
        let channel = self.sync_state_channels.channel(wallet.currency_code());
        let is_syncing = wallet.is_syncing();
        match channel.latest() {
            Some(published) if published.is_syncing != is_syncing => {
                debug!(
                    "({}) Resetting stale sync state syncing={}",
                    wallet.currency_code(),
                    is_syncing
                );
                channel.offer(WalletSyncState::initial(wallet.currency_code(), is_syncing));
            }
            Some(_) | None => {}
        }
    }

    /// Replaces the last published transfer update of `wallet` with the
    /// handle's current copy of that transfer, if they differ.
    fn refresh_transfer_update(&self, wallet: &Wallet) {
        let channel = self.transfer_updated_channels.channel(wallet.currency_code());
        let Some(published) = channel.latest() else {
            return;
        };
        if let Some(current) = wallet.single_transfer(&published.hash) {
            if *current != published {
                channel.offer(current.clone());
            }
        }
    }

    /// Throttled stream over `channel`, seeded with its latest value or, if
    /// nothing was published yet, with `extract` applied to the live handle.
    fn observe<T, F>(
        self: &Arc<Self>,
        channel: Arc<LatestChannel<T>>,
        period: Duration,
        extract: F,
    ) -> BoxStream<'static, T>
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce(&Arc<dyn WalletSystem>) -> Option<T> + Send + 'static,
    {
        let inner: Weak<Self> = Arc::downgrade(self);

        deferred(move || {
            let (latest, receiver) = channel.subscribe_with_latest();
            let seed = async move {
                if latest.is_some() {
                    return latest;
                }
                let system = inner.upgrade()?.system_snapshot()?;
                extract(&system)
            };
            seeded(seed, throttle_latest(receiver, period))
        })
    }
}

/// Re-publishes the wallet list whenever the tracked set changes, covering
/// tracking changes that produce no runtime callback.
async fn republish_on_tracking_change(
    inner: Weak<HubInner>,
    mut tracked_changes: BoxStream<'static, Vec<String>>,
) {
    while let Some(tracked) = tracked_changes.next().await {
        let Some(inner) = inner.upgrade() else {
            break;
        };
        debug!("Tracked wallets changed: {:?}", tracked);
        if let Some(system) = inner.system_snapshot() {
            inner.wallets_channel.offer(system.wallets());
        }
    }
}
