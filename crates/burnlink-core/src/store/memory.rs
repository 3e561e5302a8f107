use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
};

use super::{KvStore, Scope, StoreError};

/// In-memory store for tests, simulation and ephemeral use.
///
/// Both scopes sit behind one `Arc<Mutex<_>>`, so clones share entries.
/// [`MemoryStore::end_session`] models closing the browser: session entries
/// go, durable entries stay.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<MemoryStoreInner>>,
}

#[derive(Debug, Default)]
struct MemoryStoreInner {
    durable: HashMap<String, String>,
    session: HashMap<String, String>,
}

impl MemoryStoreInner {
    fn scope(&self, scope: Scope) -> &HashMap<String, String> {
        match scope {
            Scope::Durable => &self.durable,
            Scope::Session => &self.session,
        }
    }

    fn scope_mut(&mut self, scope: Scope) -> &mut HashMap<String, String> {
        match scope {
            Scope::Durable => &mut self.durable,
            Scope::Session => &mut self.session,
        }
    }
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every session-scoped entry.
    pub fn end_session(&self) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        let dropped = inner.session.len();
        inner.session.clear();
        tracing::debug!(dropped, "session scope cleared");
        Ok(())
    }

    /// Number of entries in `scope`.
    pub fn len(&self, scope: Scope) -> Result<usize, StoreError> {
        Ok(self.lock()?.scope(scope).len())
    }

    /// Returns true if both scopes are empty.
    pub fn is_empty(&self) -> Result<bool, StoreError> {
        let inner = self.lock()?;
        Ok(inner.durable.is_empty() && inner.session.is_empty())
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryStoreInner>, StoreError> {
        self.inner.lock().map_err(|_| StoreError::Poisoned)
    }
}

impl KvStore for MemoryStore {
    fn get(&self, scope: Scope, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.lock()?.scope(scope).get(key).cloned())
    }

    fn set(&self, scope: Scope, key: &str, value: &str) -> Result<(), StoreError> {
        self.lock()?.scope_mut(scope).insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, scope: Scope, key: &str) -> Result<(), StoreError> {
        self.lock()?.scope_mut(scope).remove(key);
        Ok(())
    }

    fn keys(&self, scope: Scope, prefix: &str) -> Result<Vec<String>, StoreError> {
        Ok(self.lock()?.scope(scope).keys().filter(|k| k.starts_with(prefix)).cloned().collect())
    }
}
