//! In-memory wallet system handle.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use breadbox_domain::events::{
    NetworkEvent, SystemEvent, TransferEvent, WalletEvent, WalletManagerEvent,
};
use breadbox_domain::runtime::{SystemListener, SystemParams, WalletSystem};
use breadbox_domain::{
    Account, Currency, Network, Transfer, TransferState, Wallet, WalletManager,
    WalletManagerState,
};
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use rust_decimal::Decimal;

use crate::dispatcher::CallbackDispatcher;
use crate::error::{Result, RuntimeError};
use crate::store::WalletStore;

const CALLBACK_THREAD: &str = "breadbox-callbacks";
const DISCONNECT_REASON: &str = "disconnect requested";

struct RuntimeState {
    wallets: Vec<Wallet>,
    networks: Vec<Network>,
    configured: Vec<Currency>,
    connected: bool,
}

#[derive(Default)]
struct CallCounters {
    configure: AtomicUsize,
    connect: AtomicUsize,
    disconnect: AtomicUsize,
}

/// A wallet system that keeps every wallet in memory.
///
/// Mutations happen under one lock and queue their callbacks before the lock
/// is released, so callbacks are delivered in mutation order on the callback
/// thread.
pub struct InMemorySystem {
    this: Weak<InMemorySystem>,
    account: Account,
    is_mainnet: bool,
    listener: Arc<dyn SystemListener>,
    store: WalletStore,
    dispatcher: CallbackDispatcher,
    state: Mutex<RuntimeState>,
    calls: CallCounters,
}

impl InMemorySystem {
    /// Creates a handle, restoring any wallets persisted for the account.
    ///
    /// `seed_wallets` are added silently when no wallet for their currency
    /// was restored.
    pub(crate) fn create(params: SystemParams, seed_wallets: &[Currency]) -> Result<Arc<Self>> {
        let SystemParams {
            listener,
            account,
            is_mainnet,
            storage_path,
        } = params;

        let store = WalletStore::new(&storage_path, account.uid());
        let mut wallets = store.load()?;
        for currency in seed_wallets {
            if !wallets.iter().any(|w| w.currency.matches_code(&currency.code)) {
                wallets.push(Wallet::new(currency.clone()));
            }
        }
        let dispatcher = CallbackDispatcher::start(CALLBACK_THREAD)?;

        debug!(
            "Created in-memory system for {} with {} wallet(s)",
            account.uid(),
            wallets.len()
        );
        Ok(Arc::new_cyclic(|this| Self {
            this: this.clone(),
            account,
            is_mainnet,
            listener,
            store,
            dispatcher,
            state: Mutex::new(RuntimeState {
                wallets,
                networks: Vec::new(),
                configured: Vec::new(),
                connected: false,
            }),
            calls: CallCounters::default(),
        }))
    }

    pub fn storage_file(&self) -> &Path {
        self.store.path()
    }

    pub fn is_mainnet(&self) -> bool {
        self.is_mainnet
    }

    pub fn is_connected(&self) -> bool {
        self.lock_state().connected
    }

    pub fn connect_count(&self) -> usize {
        self.calls.connect.load(Ordering::SeqCst)
    }

    pub fn disconnect_count(&self) -> usize {
        self.calls.disconnect.load(Ordering::SeqCst)
    }

    pub fn configure_count(&self) -> usize {
        self.calls.configure.load(Ordering::SeqCst)
    }

    pub fn configured_currencies(&self) -> Vec<Currency> {
        self.lock_state().configured.clone()
    }

    pub fn networks(&self) -> Vec<Network> {
        self.lock_state().networks.clone()
    }

    /// Blocks until every callback queued so far has been delivered.
    ///
    /// Must not be called from inside a listener.
    pub fn flush(&self) {
        self.dispatcher.flush();
    }

    // ==================== Simulation ====================

    /// Adds a wallet (and its manager) for `currency`, or returns the
    /// existing one.
    pub fn add_wallet(&self, currency: Currency) -> Wallet {
        let mut state = self.lock_state();
        if let Some(existing) = find_wallet(&state.wallets, &currency.code) {
            return existing.clone();
        }

        let mut wallet = Wallet::new(currency.clone());
        if state.connected {
            wallet.manager_state = WalletManagerState::Connected;
        }
        state.wallets.push(wallet.clone());

        let manager = self.manager_for(&wallet);
        let snapshot = wallet.clone();
        self.notify(move |system, listener| {
            listener.handle_system_event(
                system,
                &SystemEvent::ManagerAdded {
                    manager: manager.clone(),
                },
            );
            listener.handle_manager_event(system, &manager, &WalletManagerEvent::Created);
            listener.handle_wallet_event(system, &manager, &snapshot, &WalletEvent::Created);
            listener.handle_manager_event(
                system,
                &manager,
                &WalletManagerEvent::WalletAdded { currency },
            );
        });
        wallet
    }

    /// Removes the wallet and its manager.
    pub fn remove_wallet(&self, currency_code: &str) -> Result<()> {
        let mut state = self.lock_state();
        let index = state
            .wallets
            .iter()
            .position(|w| w.currency.matches_code(currency_code))
            .ok_or_else(|| RuntimeError::UnknownWallet(currency_code.to_string()))?;
        let wallet = state.wallets.remove(index);

        let mut manager = self.manager_for(&wallet);
        manager.state = WalletManagerState::Deleted;
        self.notify(move |system, listener| {
            listener.handle_wallet_event(system, &manager, &wallet, &WalletEvent::Deleted);
            listener.handle_manager_event(
                system,
                &manager,
                &WalletManagerEvent::WalletDeleted {
                    currency: wallet.currency.clone(),
                },
            );
            listener.handle_manager_event(system, &manager, &WalletManagerEvent::Deleted);
        });
        Ok(())
    }

    pub fn update_balance(&self, currency_code: &str, amount: Decimal) -> Result<()> {
        self.mutate_wallet(currency_code, |wallet| {
            wallet.balance = amount;
            Ok(vec![WalletEvent::BalanceUpdated { amount }])
        })
    }

    /// Records a transfer the user just signed and broadcast.
    pub fn submit_transfer(&self, currency_code: &str, transfer: Transfer) -> Result<()> {
        let transfer = transfer.with_state(TransferState::Submitted);
        self.mutate_wallet(currency_code, |wallet| {
            wallet.upsert_transfer(transfer.clone());
            Ok(vec![WalletEvent::TransferSubmitted { transfer }])
        })
    }

    /// Records a transfer discovered on chain.
    pub fn add_transfer(&self, currency_code: &str, transfer: Transfer) -> Result<()> {
        self.mutate_transfer(currency_code, move |wallet| {
            wallet.upsert_transfer(transfer.clone());
            Ok((
                transfer.clone(),
                TransferEvent::Created,
                WalletEvent::TransferAdded { transfer },
            ))
        })
    }

    pub fn change_transfer(
        &self,
        currency_code: &str,
        hash: &str,
        new_state: TransferState,
    ) -> Result<()> {
        self.mutate_transfer(currency_code, |wallet| {
            let transfer = wallet
                .transfers
                .iter_mut()
                .find(|t| t.hash == hash)
                .ok_or_else(|| RuntimeError::unknown_transfer(currency_code, hash))?;
            let old_state = std::mem::replace(&mut transfer.state, new_state.clone());
            if transfer.is_confirmed() && transfer.confirmed_at.is_none() {
                transfer.confirmed_at = Some(Utc::now());
            }
            let transfer = transfer.clone();
            Ok((
                transfer.clone(),
                TransferEvent::Changed {
                    old_state,
                    new_state,
                },
                WalletEvent::TransferChanged { transfer },
            ))
        })
    }

    pub fn delete_transfer(&self, currency_code: &str, hash: &str) -> Result<()> {
        self.mutate_transfer(currency_code, |wallet| {
            let transfer = wallet
                .remove_transfer(hash)
                .ok_or_else(|| RuntimeError::unknown_transfer(currency_code, hash))?
                .with_state(TransferState::Deleted);
            Ok((
                transfer.clone(),
                TransferEvent::Deleted,
                WalletEvent::TransferDeleted { transfer },
            ))
        })
    }

    /// Moves the wallet's manager to `new_state`, reporting the transition.
    pub fn set_manager_state(&self, currency_code: &str, new_state: WalletManagerState) -> Result<()> {
        let mut state = self.lock_state();
        let wallet = find_wallet_mut(&mut state.wallets, currency_code)?;
        let old_state = std::mem::replace(&mut wallet.manager_state, new_state.clone());
        let manager = self.manager_for(wallet);
        self.notify(move |system, listener| {
            listener.handle_manager_event(
                system,
                &manager,
                &WalletManagerEvent::Changed {
                    old_state,
                    new_state,
                },
            );
        });
        Ok(())
    }

    /// Reports sync progress on the runtime's 0-100 scale.
    pub fn sync_progress(
        &self,
        currency_code: &str,
        percent_complete: f32,
        timestamp: Option<DateTime<Utc>>,
    ) -> Result<()> {
        let state = self.lock_state();
        let wallet = find_wallet(&state.wallets, currency_code)
            .ok_or_else(|| RuntimeError::UnknownWallet(currency_code.to_string()))?;
        let manager = self.manager_for(wallet);
        self.notify(move |system, listener| {
            listener.handle_manager_event(
                system,
                &manager,
                &WalletManagerEvent::SyncProgress {
                    timestamp,
                    percent_complete,
                },
            );
        });
        Ok(())
    }

    pub fn announce_network(&self, network: Network) {
        let mut state = self.lock_state();
        state.networks.push(network.clone());
        self.notify(move |system, listener| {
            listener.handle_network_event(system, &network, &NetworkEvent::Created);
            listener.handle_system_event(system, &SystemEvent::NetworkAdded { network });
        });
    }

    // ==================== Internals ====================

    fn lock_state(&self) -> MutexGuard<'_, RuntimeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn network_name(&self) -> &'static str {
        if self.is_mainnet {
            "mainnet"
        } else {
            "testnet"
        }
    }

    fn manager_for(&self, wallet: &Wallet) -> WalletManager {
        WalletManager::new(
            wallet.currency.clone(),
            self.network_name(),
            wallet.manager_state.clone(),
        )
    }

    /// Queues `deliver` on the callback thread. Callers hold the state lock.
    fn notify<F>(&self, deliver: F)
    where
        F: FnOnce(&dyn WalletSystem, &dyn SystemListener) + Send + 'static,
    {
        let this = self.this.clone();
        let listener = Arc::clone(&self.listener);
        self.dispatcher.dispatch(move || {
            if let Some(system) = this.upgrade() {
                deliver(system.as_ref(), listener.as_ref());
            }
        });
    }

    fn mutate_wallet<F>(&self, currency_code: &str, mutate: F) -> Result<()>
    where
        F: FnOnce(&mut Wallet) -> Result<Vec<WalletEvent>>,
    {
        let mut state = self.lock_state();
        let wallet = find_wallet_mut(&mut state.wallets, currency_code)?;
        let events = mutate(wallet)?;
        let manager = self.manager_for(wallet);
        let snapshot = wallet.clone();
        self.notify(move |system, listener| {
            for event in &events {
                listener.handle_wallet_event(system, &manager, &snapshot, event);
            }
        });
        Ok(())
    }

    fn mutate_transfer<F>(&self, currency_code: &str, mutate: F) -> Result<()>
    where
        F: FnOnce(&mut Wallet) -> Result<(Transfer, TransferEvent, WalletEvent)>,
    {
        let mut state = self.lock_state();
        let wallet = find_wallet_mut(&mut state.wallets, currency_code)?;
        let (transfer, transfer_event, wallet_event) = mutate(wallet)?;
        let manager = self.manager_for(wallet);
        let snapshot = wallet.clone();
        self.notify(move |system, listener| {
            listener.handle_transfer_event(system, &manager, &snapshot, &transfer, &transfer_event);
            listener.handle_wallet_event(system, &manager, &snapshot, &wallet_event);
        });
        Ok(())
    }

    /// Moves every manager to `target`, reporting each transition.
    fn transition_all(&self, state: &mut RuntimeState, target: &WalletManagerState) {
        for wallet in state.wallets.iter_mut() {
            if &wallet.manager_state == target {
                continue;
            }
            let old_state = std::mem::replace(&mut wallet.manager_state, target.clone());
            let manager = self.manager_for(wallet);
            let new_state = target.clone();
            self.notify(move |system, listener| {
                listener.handle_manager_event(
                    system,
                    &manager,
                    &WalletManagerEvent::Changed {
                        old_state,
                        new_state,
                    },
                );
            });
        }
    }
}

impl WalletSystem for InMemorySystem {
    fn account(&self) -> Account {
        self.account.clone()
    }

    fn wallets(&self) -> Vec<Wallet> {
        self.lock_state().wallets.clone()
    }

    fn configure(&self, app_currencies: &[Currency]) {
        self.calls.configure.fetch_add(1, Ordering::SeqCst);
        self.lock_state().configured = app_currencies.to_vec();
        for currency in app_currencies {
            self.add_wallet(currency.clone());
        }
    }

    fn connect_all(&self) {
        self.calls.connect.fetch_add(1, Ordering::SeqCst);
        let mut state = self.lock_state();
        state.connected = true;
        self.transition_all(&mut state, &WalletManagerState::Connected);
        info!("Connected {} wallet manager(s)", state.wallets.len());
    }

    fn disconnect_all(&self) {
        self.calls.disconnect.fetch_add(1, Ordering::SeqCst);
        let mut state = self.lock_state();
        state.connected = false;
        self.transition_all(
            &mut state,
            &WalletManagerState::Disconnected {
                reason: DISCONNECT_REASON.to_string(),
            },
        );
        if let Err(e) = self.store.save(&state.wallets) {
            warn!("Failed to persist wallets: {}", e);
        }
        info!("Disconnected {} wallet manager(s)", state.wallets.len());
    }
}

fn find_wallet<'a>(wallets: &'a [Wallet], currency_code: &str) -> Option<&'a Wallet> {
    wallets.iter().find(|w| w.currency.matches_code(currency_code))
}

fn find_wallet_mut<'a>(wallets: &'a mut [Wallet], currency_code: &str) -> Result<&'a mut Wallet> {
    wallets
        .iter_mut()
        .find(|w| w.currency.matches_code(currency_code))
        .ok_or_else(|| RuntimeError::UnknownWallet(currency_code.to_string()))
}
