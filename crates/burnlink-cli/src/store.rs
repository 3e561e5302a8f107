//! Redb-backed consumption store.
//!
//! One database file holds both scopes as separate tables. The session table
//! is the CLI's stand-in for browser session storage: it lives until an
//! explicit `end-session`, not until the process exits.

use std::{path::Path, sync::Arc};

use burnlink_core::{KvStore, Scope, StoreError};
use redb::{Database, ReadableTable, TableDefinition};

/// Table: durable
/// Key: ledger key (UTF-8)
/// Value: ledger value (UTF-8)
const DURABLE: TableDefinition<&str, &str> = TableDefinition::new("durable");

/// Table: session
/// Key: ledger key (UTF-8)
/// Value: ledger value (UTF-8)
const SESSION: TableDefinition<&str, &str> = TableDefinition::new("session");

fn table(scope: Scope) -> TableDefinition<'static, &'static str, &'static str> {
    match scope {
        Scope::Durable => DURABLE,
        Scope::Session => SESSION,
    }
}

fn io(err: impl std::fmt::Display) -> StoreError {
    StoreError::Io(err.to_string())
}

/// Durable store backed by Redb.
///
/// Thread-safe through Redb's internal locking. Clone is cheap (Arc).
#[derive(Clone)]
pub struct RedbStore {
    db: Arc<Database>,
}

impl RedbStore {
    /// Open or create a database at `path`, creating both tables.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Io` if the database cannot be opened or created.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let db = Database::create(path.as_ref()).map_err(io)?;

        let txn = db.begin_write().map_err(io)?;
        {
            let _ = txn.open_table(DURABLE).map_err(io)?;
            let _ = txn.open_table(SESSION).map_err(io)?;
        }
        txn.commit().map_err(io)?;

        Ok(Self { db: Arc::new(db) })
    }

    /// Drop every session-scoped entry.
    pub fn end_session(&self) -> Result<(), StoreError> {
        let txn = self.db.begin_write().map_err(io)?;
        let dropped = {
            let mut table = txn.open_table(SESSION).map_err(io)?;
            let mut dropped = 0usize;
            table
                .retain(|_, _| {
                    dropped += 1;
                    false
                })
                .map_err(io)?;
            dropped
        };
        txn.commit().map_err(io)?;

        tracing::debug!(dropped, "session table cleared");
        Ok(())
    }
}

impl std::fmt::Debug for RedbStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbStore").finish_non_exhaustive()
    }
}

impl KvStore for RedbStore {
    fn get(&self, scope: Scope, key: &str) -> Result<Option<String>, StoreError> {
        let txn = self.db.begin_read().map_err(io)?;
        let table = txn.open_table(table(scope)).map_err(io)?;

        Ok(table.get(key).map_err(io)?.map(|value| value.value().to_string()))
    }

    fn set(&self, scope: Scope, key: &str, value: &str) -> Result<(), StoreError> {
        let txn = self.db.begin_write().map_err(io)?;
        {
            let mut table = txn.open_table(table(scope)).map_err(io)?;
            table.insert(key, value).map_err(io)?;
        }
        txn.commit().map_err(io)
    }

    fn remove(&self, scope: Scope, key: &str) -> Result<(), StoreError> {
        let txn = self.db.begin_write().map_err(io)?;
        {
            let mut table = txn.open_table(table(scope)).map_err(io)?;
            table.remove(key).map_err(io)?;
        }
        txn.commit().map_err(io)
    }

    fn keys(&self, scope: Scope, prefix: &str) -> Result<Vec<String>, StoreError> {
        let txn = self.db.begin_read().map_err(io)?;
        let table = txn.open_table(table(scope)).map_err(io)?;

        let mut keys = Vec::new();
        for result in table.range(prefix..).map_err(io)? {
            let (key, _) = result.map_err(io)?;
            let key = key.value();
            // Keys are sorted, so the prefix run is contiguous
            if !key.starts_with(prefix) {
                break;
            }
            keys.push(key.to_string());
        }

        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn set_get_remove() {
        let dir = tempdir().unwrap();
        let store = RedbStore::open(dir.path().join("state.redb")).unwrap();

        store.set(Scope::Durable, "a", "1").unwrap();
        assert_eq!(store.get(Scope::Durable, "a").unwrap().as_deref(), Some("1"));
        assert_eq!(store.get(Scope::Session, "a").unwrap(), None);

        store.remove(Scope::Durable, "a").unwrap();
        assert_eq!(store.get(Scope::Durable, "a").unwrap(), None);
        store.remove(Scope::Durable, "a").unwrap();
    }

    #[test]
    fn keys_by_prefix() {
        let dir = tempdir().unwrap();
        let store = RedbStore::open(dir.path().join("state.redb")).unwrap();
        store.set(Scope::Durable, "burnlink.views.b", "1").unwrap();
        store.set(Scope::Durable, "burnlink.views.a", "1").unwrap();
        store.set(Scope::Durable, "burnlinkx", "1").unwrap();
        store.set(Scope::Durable, "aaa", "1").unwrap();

        assert_eq!(store.keys(Scope::Durable, "burnlink.").unwrap(), [
            "burnlink.views.a",
            "burnlink.views.b"
        ]);
    }

    #[test]
    fn end_session_clears_only_session() {
        let dir = tempdir().unwrap();
        let store = RedbStore::open(dir.path().join("state.redb")).unwrap();
        store.set(Scope::Durable, "views", "1").unwrap();
        store.set(Scope::Session, "destroyed", "1").unwrap();

        store.end_session().unwrap();

        assert_eq!(store.get(Scope::Session, "destroyed").unwrap(), None);
        assert_eq!(store.get(Scope::Durable, "views").unwrap().as_deref(), Some("1"));
    }
}
