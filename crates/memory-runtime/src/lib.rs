//! BreadBox Memory Runtime - an in-process wallet runtime.
//!
//! Implements the runtime contracts from `breadbox-domain` without any
//! blockchain backend: wallets live in memory, are persisted to
//! `wallets.json` in the storage directory on disconnect, and every mutation
//! is reported to the listener from a dedicated callback thread. Simulation
//! commands on [`InMemorySystem`] stand in for network activity.

mod dispatcher;
mod error;
mod factory;
mod provider;
mod store;
mod system;

pub use error::{Result, RuntimeError};
pub use factory::InMemorySystemFactory;
pub use provider::InMemoryWalletProvider;
pub use store::WALLETS_FILE;
pub use system::InMemorySystem;
