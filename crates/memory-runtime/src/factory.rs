//! Factory for in-memory system handles.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use breadbox_domain::runtime::{SystemFactory, SystemParams, WalletSystem};
use breadbox_domain::{Currency, Result as HubResult};
use log::debug;

use crate::error::RuntimeError;
use crate::system::InMemorySystem;

#[derive(Default)]
struct FactoryState {
    created: Vec<Arc<InMemorySystem>>,
    failure: Option<String>,
}

/// Creates [`InMemorySystem`] handles and keeps them reachable so callers
/// can drive the runtime after handing the factory to a hub.
#[derive(Default)]
pub struct InMemorySystemFactory {
    seed_wallets: Vec<Currency>,
    state: Mutex<FactoryState>,
}

impl InMemorySystemFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every created system starts with wallets for `currencies`, as if
    /// restored from storage. No callbacks are fired for them.
    pub fn with_wallets(currencies: Vec<Currency>) -> Self {
        Self {
            seed_wallets: currencies,
            state: Mutex::default(),
        }
    }

    /// Makes the next `create_system` call fail with `message`.
    pub fn fail_next(&self, message: impl Into<String>) {
        self.lock_state().failure = Some(message.into());
    }

    /// The most recently created system.
    pub fn last_system(&self) -> Option<Arc<InMemorySystem>> {
        self.lock_state().created.last().cloned()
    }

    pub fn created_count(&self) -> usize {
        self.lock_state().created.len()
    }

    fn lock_state(&self) -> MutexGuard<'_, FactoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SystemFactory for InMemorySystemFactory {
    fn create_system(&self, params: SystemParams) -> HubResult<Arc<dyn WalletSystem>> {
        let mut state = self.lock_state();
        if let Some(message) = state.failure.take() {
            return Err(RuntimeError::Injected(message).into());
        }

        let system = InMemorySystem::create(params, &self.seed_wallets)?;
        state.created.push(Arc::clone(&system));
        debug!("Created system #{}", state.created.len());
        Ok(system as Arc<dyn WalletSystem>)
    }
}
