//! Local consumption ledger.
//!
//! Per-message view count, destroyed flag and first-view time, kept in a
//! [`KvStore`] under namespaced keys:
//!
//! | Key                            | Scope   | Value              |
//! |--------------------------------|---------|--------------------|
//! | `burnlink.views.<id>`          | durable | decimal view count |
//! | `burnlink.destroyed.<id>`      | session | `1`                |
//! | `burnlink.first_view.<id>`     | durable | Unix milliseconds  |
//!
//! # Invariants
//!
//! - View counts only grow (saturating at `u32::MAX`)
//! - A destroyed flag is never cleared within a session, except by an
//!   explicit [`ConsumptionLedger::forget_all`]
//! - The first-view time is written at most once
//!
//! A view count that fails to parse is treated as exhausted so a damaged
//! entry can never grant an extra read.

use chrono::{DateTime, Utc};

use crate::{
    link::MessageId,
    store::{KvStore, Scope, StoreError},
};

const NAMESPACE: &str = "burnlink.";
const VIEWS: &str = "burnlink.views.";
const DESTROYED: &str = "burnlink.destroyed.";
const FIRST_VIEW: &str = "burnlink.first_view.";

/// Snapshot of one message's consumption state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConsumptionRecord {
    /// Successful reveals so far (durable)
    pub view_count: u32,
    /// Destroyed in this session
    pub destroyed: bool,
    /// First successful reveal (durable)
    pub first_viewed_at: Option<DateTime<Utc>>,
}

/// Consumption state on top of a two-scope store.
#[derive(Debug, Clone)]
pub struct ConsumptionLedger<S> {
    store: S,
}

impl<S: KvStore> ConsumptionLedger<S> {
    /// Wrap a store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Full record for `id`. Absent entries read as defaults.
    pub fn record(&self, id: &MessageId) -> Result<ConsumptionRecord, StoreError> {
        Ok(ConsumptionRecord {
            view_count: self.view_count(id)?,
            destroyed: self.is_destroyed(id)?,
            first_viewed_at: self.first_viewed_at(id)?,
        })
    }

    /// Views recorded for `id`.
    pub fn view_count(&self, id: &MessageId) -> Result<u32, StoreError> {
        let Some(raw) = self.store.get(Scope::Durable, &key(VIEWS, id))? else {
            return Ok(0);
        };
        Ok(raw.parse().unwrap_or_else(|_| {
            tracing::warn!(message_id = %id, "corrupt view count, treating as consumed");
            u32::MAX
        }))
    }

    /// Returns true if `id` was destroyed in this session.
    pub fn is_destroyed(&self, id: &MessageId) -> Result<bool, StoreError> {
        Ok(self.store.get(Scope::Session, &key(DESTROYED, id))?.is_some())
    }

    /// First successful reveal of `id`, if recorded.
    ///
    /// A corrupt entry reads as the earliest representable time, so the
    /// message expires and the entry is never rewritten.
    pub fn first_viewed_at(&self, id: &MessageId) -> Result<Option<DateTime<Utc>>, StoreError> {
        let Some(raw) = self.store.get(Scope::Durable, &key(FIRST_VIEW, id))? else {
            return Ok(None);
        };
        let parsed = raw.parse::<i64>().ok().and_then(DateTime::from_timestamp_millis);
        Ok(Some(parsed.unwrap_or_else(|| {
            tracing::warn!(message_id = %id, "corrupt first-view timestamp, treating as expired");
            DateTime::<Utc>::MIN_UTC
        })))
    }

    /// Count one more view and return the new total.
    pub fn record_view(&self, id: &MessageId) -> Result<u32, StoreError> {
        let count = self.view_count(id)?.saturating_add(1);
        self.store.set(Scope::Durable, &key(VIEWS, id), &count.to_string())?;
        tracing::debug!(message_id = %id, count, "view recorded");
        Ok(count)
    }

    /// Record the first view at `now` unless one is already recorded.
    ///
    /// Returns the effective first-view time.
    pub fn mark_first_view(
        &self,
        id: &MessageId,
        now: DateTime<Utc>,
    ) -> Result<DateTime<Utc>, StoreError> {
        if let Some(existing) = self.first_viewed_at(id)? {
            return Ok(existing);
        }
        self.store.set(
            Scope::Durable,
            &key(FIRST_VIEW, id),
            &now.timestamp_millis().to_string(),
        )?;
        Ok(now)
    }

    /// Flag `id` as destroyed for the rest of the session. Idempotent.
    pub fn mark_destroyed(&self, id: &MessageId) -> Result<(), StoreError> {
        self.store.set(Scope::Session, &key(DESTROYED, id), "1")?;
        tracing::debug!(message_id = %id, "message destroyed");
        Ok(())
    }

    /// Remove every burnlink entry from both scopes.
    ///
    /// Returns the number of entries removed. Entries outside the namespace
    /// are left alone.
    pub fn forget_all(&self) -> Result<usize, StoreError> {
        let mut removed = 0;
        for scope in Scope::ALL {
            for k in self.store.keys(scope, NAMESPACE)? {
                self.store.remove(scope, &k)?;
                removed += 1;
            }
        }
        tracing::debug!(removed, "tracking data cleared");
        Ok(removed)
    }
}

fn key(prefix: &str, id: &MessageId) -> String {
    format!("{prefix}{id}")
}
