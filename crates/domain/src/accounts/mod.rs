//! Accounts module - the identity bound to a wallet system handle.

mod accounts_model;

pub use accounts_model::Account;
