//! BreadBox Domain - wallet runtime model, events and collaborator traits.
//!
//! This crate describes everything the wallet event hub observes: accounts,
//! wallets, transfers and sync state, the sealed event hierarchy a wallet
//! runtime delivers through its listener, and the traits the hub consumes
//! (runtime handle, tracked-wallet monitor, enabled-wallets provider).
//! It holds no runtime itself; see `breadbox-hub` for the hub and
//! `breadbox-memory-runtime` for an in-process runtime.

pub mod accounts;
pub mod config;
pub mod constants;
pub mod errors;
pub mod events;
pub mod runtime;
pub mod transfers;
pub mod wallets;

pub use accounts::Account;
pub use config::HubConfig;
pub use errors::{HubError, Result};
pub use transfers::{Transfer, TransferDirection, TransferState};
pub use wallets::*;
