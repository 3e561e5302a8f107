//! One simulated browser profile.

use burnlink_core::{
    Composer, ConsumptionLedger, MemoryStore, Reader, ReaderConfig, StoreError,
};

use crate::{SIM_BASE_URL, sim_env::SimEnv};

/// A browser profile: one store, many tabs.
///
/// Every [`SimBrowser::tab`] is a fresh page load sharing the profile's
/// storage. [`SimBrowser::restart`] ends the session: destroyed flags go,
/// view counts and first-view times stay.
#[derive(Debug, Clone)]
pub struct SimBrowser {
    env: SimEnv,
    store: MemoryStore,
    config: ReaderConfig,
}

impl SimBrowser {
    /// Profile with the default reader configuration.
    pub fn new(env: SimEnv) -> Self {
        Self::with_config(env, ReaderConfig::default())
    }

    /// Profile whose tabs use `config`.
    pub fn with_config(env: SimEnv, config: ReaderConfig) -> Self {
        Self { env, store: MemoryStore::new(), config }
    }

    /// Another profile on the same clock and RNG, with its own storage.
    ///
    /// Models a second device: nothing in the ledger is shared.
    pub fn other_profile(&self) -> Self {
        Self::with_config(self.env.clone(), self.config.clone())
    }

    /// Shared environment.
    pub fn env(&self) -> &SimEnv {
        &self.env
    }

    /// Profile storage.
    pub fn store(&self) -> &MemoryStore {
        &self.store
    }

    /// Ledger view of the profile storage.
    pub fn ledger(&self) -> ConsumptionLedger<MemoryStore> {
        ConsumptionLedger::new(self.store.clone())
    }

    /// Sender on the shared environment.
    pub fn composer(&self) -> Composer<SimEnv> {
        Composer::new(self.env.clone(), SIM_BASE_URL)
    }

    /// Open a new tab.
    pub fn tab(&self) -> Reader<SimEnv, MemoryStore> {
        Reader::new(self.env.clone(), self.store.clone(), self.config.clone())
    }

    /// Close every tab and start a new session.
    pub fn restart(&self) -> Result<(), StoreError> {
        tracing::debug!("simulated browser restart");
        self.store.end_session()
    }
}

impl Default for SimBrowser {
    fn default() -> Self {
        Self::new(SimEnv::new())
    }
}
