//! Persisted configuration snapshots.

use crate::StoreError;
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};

/// Full configuration as seen at one moment: key → rendered value.
pub type Snapshot = BTreeMap<String, String>;

/// Durable storage for the last committed snapshot of each unit.
///
/// `save` must be atomic from the reader's point of view: a later
/// `load` observes either the previous record or the new one, never a
/// mix.
pub trait SnapshotStore {
    /// Loads the last committed snapshot for `identity`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the record exists but cannot be read.
    fn load(&self, identity: &str) -> Result<Option<Snapshot>, StoreError>;

    /// Replaces the committed snapshot for `identity`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the record cannot be written.
    fn save(&self, identity: &str, snapshot: &Snapshot) -> Result<(), StoreError>;
}

impl<T: SnapshotStore + ?Sized> SnapshotStore for &T {
    fn load(&self, identity: &str) -> Result<Option<Snapshot>, StoreError> {
        (**self).load(identity)
    }

    fn save(&self, identity: &str, snapshot: &Snapshot) -> Result<(), StoreError> {
        (**self).save(identity, snapshot)
    }
}

/// In-memory [`SnapshotStore`].
#[derive(Debug, Default)]
pub struct MemorySnapshotStore {
    records: Mutex<HashMap<String, Snapshot>>,
    saves: Mutex<usize>,
}

impl MemorySnapshotStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populates the record for `identity`.
    #[must_use]
    pub fn with_snapshot(self, identity: impl Into<String>, snapshot: Snapshot) -> Self {
        self.records.lock().insert(identity.into(), snapshot);
        self
    }

    /// Returns the stored record for `identity`.
    #[must_use]
    pub fn get(&self, identity: &str) -> Option<Snapshot> {
        self.records.lock().get(identity).cloned()
    }

    /// Number of `save` calls so far.
    #[must_use]
    pub fn save_count(&self) -> usize {
        *self.saves.lock()
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn load(&self, identity: &str) -> Result<Option<Snapshot>, StoreError> {
        Ok(self.get(identity))
    }

    fn save(&self, identity: &str, snapshot: &Snapshot) -> Result<(), StoreError> {
        self.records
            .lock()
            .insert(identity.to_string(), snapshot.clone());
        *self.saves.lock() += 1;
        Ok(())
    }
}

/// Builds a [`Snapshot`] from pairs.
pub fn snapshot<I, K, V>(pairs: I) -> Snapshot
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_round_trip() {
        let store = MemorySnapshotStore::new();
        assert!(store.load("web/0").unwrap().is_none());

        store.save("web/0", &snapshot([("a", "1")])).unwrap();
        assert_eq!(store.load("web/0").unwrap(), Some(snapshot([("a", "1")])));
        assert!(store.load("web/1").unwrap().is_none());
        assert_eq!(store.save_count(), 1);
    }

    #[test]
    fn save_replaces_whole_record() {
        let store = MemorySnapshotStore::new().with_snapshot("web/0", snapshot([("a", "1"), ("b", "2")]));
        store.save("web/0", &snapshot([("c", "3")])).unwrap();
        assert_eq!(store.get("web/0"), Some(snapshot([("c", "3")])));
    }
}
