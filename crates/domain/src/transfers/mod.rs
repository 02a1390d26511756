//! Transfers module - on-chain and off-chain value movements of a wallet.

mod transfers_model;

pub use transfers_model::{Transfer, TransferDirection, TransferState};
