//! Wallet runtime handle, factory and listener traits.

use std::path::PathBuf;
use std::sync::Arc;

use crate::accounts::Account;
use crate::errors::Result;
use crate::events::{NetworkEvent, SystemEvent, TransferEvent, WalletEvent, WalletManagerEvent};
use crate::transfers::Transfer;
use crate::wallets::{Currency, Network, Wallet, WalletManager};

/// An open connection to the wallet runtime for exactly one account.
///
/// Accessors return snapshots; the hub never mutates runtime state through
/// them.
pub trait WalletSystem: Send + Sync {
    /// The account this handle was created for.
    fn account(&self) -> Account;

    /// Snapshot of every wallet the runtime currently knows.
    fn wallets(&self) -> Vec<Wallet>;

    /// Declares the currencies the application supports.
    fn configure(&self, app_currencies: &[Currency]);

    /// (Re)establishes every network and backend connection.
    ///
    /// Called with the hub lock held: must not wait for listener callbacks
    /// to be delivered.
    fn connect_all(&self);

    /// Drops every network and backend connection. The handle stays usable.
    /// Same locking rule as [`WalletSystem::connect_all`].
    fn disconnect_all(&self);
}

/// Everything a factory needs to create a system handle.
pub struct SystemParams {
    /// Receives the runtime's callbacks on the runtime's own thread.
    pub listener: Arc<dyn SystemListener>,
    pub account: Account,
    pub is_mainnet: bool,
    /// Directory owned by the runtime for its persistent data.
    pub storage_path: PathBuf,
}

/// Creates system handles. Implementations own the runtime's executor and
/// backend client.
pub trait SystemFactory: Send + Sync {
    fn create_system(&self, params: SystemParams) -> Result<Arc<dyn WalletSystem>>;
}

/// Callback interface of the wallet runtime.
///
/// Invoked on the runtime's dedicated execution context, serialized relative
/// to itself. Implementations must not block.
pub trait SystemListener: Send + Sync {
    fn handle_system_event(&self, system: &dyn WalletSystem, event: &SystemEvent);

    fn handle_network_event(&self, system: &dyn WalletSystem, network: &Network, event: &NetworkEvent);

    fn handle_manager_event(
        &self,
        system: &dyn WalletSystem,
        manager: &WalletManager,
        event: &WalletManagerEvent,
    );

    fn handle_wallet_event(
        &self,
        system: &dyn WalletSystem,
        manager: &WalletManager,
        wallet: &Wallet,
        event: &WalletEvent,
    );

    fn handle_transfer_event(
        &self,
        system: &dyn WalletSystem,
        manager: &WalletManager,
        wallet: &Wallet,
        transfer: &Transfer,
        event: &TransferEvent,
    );
}

/// Listener that discards every callback.
#[derive(Clone, Default)]
pub struct NoOpSystemListener;

impl SystemListener for NoOpSystemListener {
    fn handle_system_event(&self, _system: &dyn WalletSystem, _event: &SystemEvent) {}

    fn handle_network_event(
        &self,
        _system: &dyn WalletSystem,
        _network: &Network,
        _event: &NetworkEvent,
    ) {
    }

    fn handle_manager_event(
        &self,
        _system: &dyn WalletSystem,
        _manager: &WalletManager,
        _event: &WalletManagerEvent,
    ) {
    }

    fn handle_wallet_event(
        &self,
        _system: &dyn WalletSystem,
        _manager: &WalletManager,
        _wallet: &Wallet,
        _event: &WalletEvent,
    ) {
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
