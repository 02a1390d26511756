//! Default tracked-wallet monitor.
//!
//! A currency is tracked when the user has enabled it and the runtime has a
//! wallet manager for it. The manager set is learned from the runtime
//! callbacks the hub forwards here.

use std::collections::BTreeSet;
use std::sync::Arc;

use breadbox_domain::events::{
    NetworkEvent, SystemEvent, TransferEvent, WalletEvent, WalletManagerEvent,
};
use breadbox_domain::runtime::{SystemListener, WalletProvider, WalletSystem, WalletTracker};
use breadbox_domain::{Network, Transfer, Wallet, WalletManager};
use futures::future;
use futures::stream::{self, BoxStream, StreamExt};
use log::debug;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

/// Tracks the intersection of the user's enabled wallets and the wallet
/// managers the runtime has created.
pub struct EnabledWalletTracker {
    wallet_provider: Arc<dyn WalletProvider>,
    managed: watch::Sender<BTreeSet<String>>,
}

enum TrackingUpdate {
    Enabled(Vec<String>),
    Managed(BTreeSet<String>),
}

impl EnabledWalletTracker {
    pub fn new(wallet_provider: Arc<dyn WalletProvider>) -> Self {
        let (managed, _receiver) = watch::channel(BTreeSet::new());
        Self {
            wallet_provider,
            managed,
        }
    }

    /// Currency ids (lowercase) that currently have a wallet manager.
    pub fn managed_currency_ids(&self) -> BTreeSet<String> {
        self.managed.borrow().clone()
    }

    fn add_managed(&self, currency_id: &str) {
        let id = currency_id.to_ascii_lowercase();
        self.managed.send_if_modified(|managed| managed.insert(id));
    }

    fn remove_managed(&self, currency_id: &str) {
        let id = currency_id.to_ascii_lowercase();
        self.managed.send_if_modified(|managed| managed.remove(&id));
    }
}

impl WalletTracker for EnabledWalletTracker {
    fn monitor_tracked_wallets(&self) -> BoxStream<'static, Vec<String>> {
        let enabled = self
            .wallet_provider
            .enabled_wallets()
            .map(TrackingUpdate::Enabled);
        let managed = WatchStream::new(self.managed.subscribe()).map(TrackingUpdate::Managed);

        let mut enabled_ids: Option<BTreeSet<String>> = None;
        let mut managed_ids: Option<BTreeSet<String>> = None;
        let mut last_emitted: Option<Vec<String>> = None;

        stream::select(enabled, managed)
            .filter_map(move |update| {
                match update {
                    TrackingUpdate::Enabled(ids) => {
                        enabled_ids = Some(ids.iter().map(|id| id.to_ascii_lowercase()).collect());
                    }
                    TrackingUpdate::Managed(ids) => managed_ids = Some(ids),
                }

                let tracked = match (&enabled_ids, &managed_ids) {
                    (Some(enabled), Some(managed)) => {
                        Some(enabled.intersection(managed).cloned().collect::<Vec<_>>())
                    }
                    _ => None,
                };
                let changed = tracked.is_some() && tracked != last_emitted;
                if changed {
                    last_emitted.clone_from(&tracked);
                }
                future::ready(if changed { tracked } else { None })
            })
            .boxed()
    }
}

impl SystemListener for EnabledWalletTracker {
    fn handle_system_event(&self, _system: &dyn WalletSystem, event: &SystemEvent) {
        debug!("System event: {}", event.name());
        if let SystemEvent::ManagerAdded { manager } = event {
            self.add_managed(&manager.currency.id);
        }
    }

    fn handle_network_event(&self, _system: &dyn WalletSystem, network: &Network, event: &NetworkEvent) {
        debug!("Network event ({}): {}", network.name, event.name());
    }

    fn handle_manager_event(
        &self,
        _system: &dyn WalletSystem,
        manager: &WalletManager,
        event: &WalletManagerEvent,
    ) {
        match event {
            WalletManagerEvent::Deleted => self.remove_managed(&manager.currency.id),
            // Managers restored from storage announce themselves through
            // their first state change rather than ManagerAdded.
            _ => self.add_managed(&manager.currency.id),
        }
    }

    fn handle_wallet_event(
        &self,
        _system: &dyn WalletSystem,
        _manager: &WalletManager,
        wallet: &Wallet,
        event: &WalletEvent,
    ) {
        debug!("Wallet event ({}): {}", wallet.currency_code(), event.name());
    }

    fn handle_transfer_event(
        &self,
        _system: &dyn WalletSystem,
        _manager: &WalletManager,
        _wallet: &Wallet,
        _transfer: &Transfer,
        _event: &TransferEvent,
    ) {
    }
}
