//! Two-scope key-value storage.
//!
//! Consumption state lives in a store with two lifetimes: a durable scope
//! that survives restarts, and a session scope that is dropped when the
//! session ends. The trait is synchronous and string-keyed; the ledger owns
//! the key layout.

mod memory;

pub use memory::MemoryStore;
use thiserror::Error;

/// Lifetime of a stored entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    /// Survives restarts and session ends
    Durable,
    /// Dropped when the session ends
    Session,
}

impl Scope {
    /// Both scopes, durable first.
    pub const ALL: [Self; 2] = [Self::Durable, Self::Session];
}

/// Errors from a storage backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Backend I/O or transaction failure
    #[error("storage I/O error: {0}")]
    Io(String),

    /// A thread panicked while holding the store lock
    #[error("storage lock poisoned")]
    Poisoned,
}

/// Storage abstraction for consumption state.
///
/// Must be Clone (shared between readers of one profile), Send + Sync, and
/// synchronous. Implementations share internal state via `Arc`, so clones
/// see the same entries.
pub trait KvStore: Clone + Send + Sync + 'static {
    /// Value stored under `key`, or `None`.
    fn get(&self, scope: Scope, key: &str) -> Result<Option<String>, StoreError>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, scope: Scope, key: &str, value: &str) -> Result<(), StoreError>;

    /// Remove `key`. Removing an absent key is not an error.
    fn remove(&self, scope: Scope, key: &str) -> Result<(), StoreError>;

    /// All keys in `scope` starting with `prefix`. Order is not guaranteed.
    fn keys(&self, scope: Scope, prefix: &str) -> Result<Vec<String>, StoreError>;
}
