use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::transfers::Transfer;

/// Events delivered for a single wallet.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WalletEvent {
    Created,
    Deleted,
    BalanceUpdated { amount: Decimal },
    FeeBasisUpdated,
    TransferAdded { transfer: Transfer },
    TransferChanged { transfer: Transfer },
    TransferSubmitted { transfer: Transfer },
    TransferDeleted { transfer: Transfer },
}

impl WalletEvent {
    pub fn name(&self) -> &'static str {
        match self {
            WalletEvent::Created => "created",
            WalletEvent::Deleted => "deleted",
            WalletEvent::BalanceUpdated { .. } => "balance_updated",
            WalletEvent::FeeBasisUpdated => "fee_basis_updated",
            WalletEvent::TransferAdded { .. } => "transfer_added",
            WalletEvent::TransferChanged { .. } => "transfer_changed",
            WalletEvent::TransferSubmitted { .. } => "transfer_submitted",
            WalletEvent::TransferDeleted { .. } => "transfer_deleted",
        }
    }

    /// The transfer carried by a transfer lifecycle event.
    pub fn transfer(&self) -> Option<&Transfer> {
        match self {
            WalletEvent::TransferAdded { transfer }
            | WalletEvent::TransferChanged { transfer }
            | WalletEvent::TransferSubmitted { transfer }
            | WalletEvent::TransferDeleted { transfer } => Some(transfer),
            WalletEvent::Created
            | WalletEvent::Deleted
            | WalletEvent::BalanceUpdated { .. }
            | WalletEvent::FeeBasisUpdated => None,
        }
    }
}
