use serde::{Deserialize, Serialize};

use crate::transfers::TransferState;
use crate::wallets::{Network, WalletManager};

/// Events delivered for the system as a whole.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SystemEvent {
    Created,
    Deleted,
    NetworkAdded { network: Network },
    ManagerAdded { manager: WalletManager },
    DiscoveredNetworks { networks: Vec<Network> },
}

impl SystemEvent {
    pub fn name(&self) -> &'static str {
        match self {
            SystemEvent::Created => "created",
            SystemEvent::Deleted => "deleted",
            SystemEvent::NetworkAdded { .. } => "network_added",
            SystemEvent::ManagerAdded { .. } => "manager_added",
            SystemEvent::DiscoveredNetworks { .. } => "discovered_networks",
        }
    }
}

/// Events delivered for a network.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NetworkEvent {
    Created,
    FeesUpdated,
}

impl NetworkEvent {
    pub fn name(&self) -> &'static str {
        match self {
            NetworkEvent::Created => "created",
            NetworkEvent::FeesUpdated => "fees_updated",
        }
    }
}

/// Events delivered for a single transfer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TransferEvent {
    Created,
    Changed {
        old_state: TransferState,
        new_state: TransferState,
    },
    Deleted,
}

impl TransferEvent {
    pub fn name(&self) -> &'static str {
        match self {
            TransferEvent::Created => "created",
            TransferEvent::Changed { .. } => "changed",
            TransferEvent::Deleted => "deleted",
        }
    }
}
