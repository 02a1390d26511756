//! Translation of runtime callbacks into hub channels.
//!
//! Every callback is first forwarded verbatim to the tracked-wallet monitor,
//! then translated while the hub is open. Snapshot reads against the runtime
//! happen before the hub lock is taken.

use std::sync::Weak;

use breadbox_domain::events::{
    NetworkEvent, SystemEvent, TransferEvent, WalletEvent, WalletManagerEvent,
};
use breadbox_domain::runtime::{SystemListener, WalletSystem};
use breadbox_domain::{Network, Transfer, Wallet, WalletManager, WalletSyncState};
use log::{debug, trace};

use crate::breadbox::HubInner;

/// Listener handed to the runtime. Holds the hub weakly so the runtime handle
/// does not keep a dropped hub alive.
pub(crate) struct HubListener {
    inner: Weak<HubInner>,
}

impl HubListener {
    pub(crate) fn new(inner: Weak<HubInner>) -> Self {
        Self { inner }
    }
}

impl SystemListener for HubListener {
    fn handle_system_event(&self, system: &dyn WalletSystem, event: &SystemEvent) {
        if let Some(inner) = self.inner.upgrade() {
            inner.on_system_event(system, event);
        }
    }

    fn handle_network_event(&self, system: &dyn WalletSystem, network: &Network, event: &NetworkEvent) {
        if let Some(inner) = self.inner.upgrade() {
            inner.on_network_event(system, network, event);
        }
    }

    fn handle_manager_event(
        &self,
        system: &dyn WalletSystem,
        manager: &WalletManager,
        event: &WalletManagerEvent,
    ) {
        if let Some(inner) = self.inner.upgrade() {
            inner.on_manager_event(system, manager, event);
        }
    }

    fn handle_wallet_event(
        &self,
        system: &dyn WalletSystem,
        manager: &WalletManager,
        wallet: &Wallet,
        event: &WalletEvent,
    ) {
        if let Some(inner) = self.inner.upgrade() {
            inner.on_wallet_event(system, manager, wallet, event);
        }
    }

    fn handle_transfer_event(
        &self,
        system: &dyn WalletSystem,
        manager: &WalletManager,
        wallet: &Wallet,
        transfer: &Transfer,
        event: &TransferEvent,
    ) {
        if let Some(inner) = self.inner.upgrade() {
            inner.on_transfer_event(system, manager, wallet, transfer, event);
        }
    }
}

impl HubInner {
    fn on_system_event(&self, system: &dyn WalletSystem, event: &SystemEvent) {
        let _state = self.lock_state();
        self.tracker.handle_system_event(system, event);
    }

    fn on_network_event(&self, system: &dyn WalletSystem, network: &Network, event: &NetworkEvent) {
        let _state = self.lock_state();
        self.tracker.handle_network_event(system, network, event);
    }

    fn on_manager_event(
        &self,
        system: &dyn WalletSystem,
        manager: &WalletManager,
        event: &WalletManagerEvent,
    ) {
        let wallets = system.wallets();

        let state = self.lock_state();
        self.tracker.handle_manager_event(system, manager, event);
        if !state.is_open {
            trace!("Dropping manager event '{}' while closed", event.name());
            return;
        }

        self.wallets_channel.offer(wallets);

        let currency_code = &manager.currency.code;
        match event {
            WalletManagerEvent::SyncProgress {
                timestamp,
                percent_complete,
            } => {
                debug!(
                    "({}) Sync Progress progress={} time={:?}",
                    currency_code, percent_complete, timestamp
                );
                self.publish_sync_state(WalletSyncState::progress(
                    currency_code.clone(),
                    *percent_complete,
                    *timestamp,
                ));
            }
            WalletManagerEvent::Changed {
                old_state,
                new_state,
            } => {
                debug!(
                    "({}) State Changed from='{:?}' to='{:?}'",
                    currency_code, old_state, new_state
                );
                // Bracket syncing periods even when no progress callback fired.
                if old_state.is_syncing() {
                    self.publish_sync_state(WalletSyncState::completed(currency_code.clone()));
                }
                if new_state.is_syncing() {
                    self.publish_sync_state(WalletSyncState::started(currency_code.clone()));
                }
            }
            WalletManagerEvent::Created
            | WalletManagerEvent::Deleted
            | WalletManagerEvent::WalletAdded { .. }
            | WalletManagerEvent::WalletChanged { .. }
            | WalletManagerEvent::WalletDeleted { .. }
            | WalletManagerEvent::SyncStarted
            | WalletManagerEvent::SyncStopped { .. }
            | WalletManagerEvent::SyncRecommended
            | WalletManagerEvent::BlockUpdated { .. } => {}
        }
    }

    fn on_wallet_event(
        &self,
        system: &dyn WalletSystem,
        manager: &WalletManager,
        wallet: &Wallet,
        event: &WalletEvent,
    ) {
        let wallets = system.wallets();

        let state = self.lock_state();
        self.tracker.handle_wallet_event(system, manager, wallet, event);
        if !state.is_open {
            trace!("Dropping wallet event '{}' while closed", event.name());
            return;
        }

        self.wallets_channel.offer(wallets);

        match event {
            WalletEvent::TransferSubmitted { transfer }
            | WalletEvent::TransferAdded { transfer }
            | WalletEvent::TransferChanged { transfer }
            | WalletEvent::TransferDeleted { transfer } => {
                self.publish_transfer(wallet, transfer);
            }
            WalletEvent::Created
            | WalletEvent::Deleted
            | WalletEvent::BalanceUpdated { .. }
            | WalletEvent::FeeBasisUpdated => {}
        }
    }

    fn on_transfer_event(
        &self,
        system: &dyn WalletSystem,
        manager: &WalletManager,
        wallet: &Wallet,
        transfer: &Transfer,
        event: &TransferEvent,
    ) {
        let state = self.lock_state();
        self.tracker
            .handle_transfer_event(system, manager, wallet, transfer, event);
        if !state.is_open {
            trace!("Dropping transfer event '{}' while closed", event.name());
            return;
        }

        self.publish_transfer(wallet, transfer);
    }

    fn publish_transfer(&self, wallet: &Wallet, transfer: &Transfer) {
        let currency_code = wallet.currency_code();
        self.transfers_channels
            .channel(currency_code)
            .offer(wallet.transfers.clone());
        self.transfer_updated_channels
            .channel(currency_code)
            .offer(transfer.clone());
    }

    fn publish_sync_state(&self, sync_state: WalletSyncState) {
        self.sync_state_channels
            .channel(&sync_state.currency_code)
            .offer(sync_state);
    }
}
