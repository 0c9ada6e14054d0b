//! File-backed configuration snapshot store.
//!
//! # Layout
//!
//! ```text
//! <state_dir>/
//! └── config-snapshots.json
//! ```
//!
//! ```json
//! {
//!   "version": 1,
//!   "units": {
//!     "web/0": {
//!       "values": { "port": "8080" },
//!       "committed_at": "2026-10-18T09:12:44Z"
//!     }
//!   }
//! }
//! ```

use crate::fs::{atomic_write, read_optional};
use chrono::{DateTime, Utc};
use charmkit_tools::{Snapshot, SnapshotStore, StoreError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// File name of the snapshot record inside the state directory.
pub const SNAPSHOT_FILE: &str = "config-snapshots.json";

/// Current record format version.
pub const SNAPSHOT_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Deserialize)]
struct VersionProbe {
    version: u32,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct SnapshotFile {
    version: u32,
    #[serde(default)]
    units: BTreeMap<String, UnitRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct UnitRecord {
    values: Snapshot,
    committed_at: DateTime<Utc>,
}

/// [`SnapshotStore`] persisting every unit's snapshot in one JSON file.
///
/// Saves replace the whole file atomically (temp sibling then rename),
/// so an interrupted commit leaves the previous record in place.
#[derive(Debug, Clone)]
pub struct LocalSnapshotStore {
    path: PathBuf,
}

impl LocalSnapshotStore {
    /// Creates a store rooted at `state_dir`. Nothing is touched until the first save.
    #[must_use]
    pub fn new(state_dir: impl AsRef<Path>) -> Self {
        Self {
            path: state_dir.as_ref().join(SNAPSHOT_FILE),
        }
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// When `identity`'s snapshot was last committed.
    ///
    /// # Errors
    ///
    /// Same as [`SnapshotStore::load`].
    pub fn committed_at(&self, identity: &str) -> Result<Option<DateTime<Utc>>, StoreError> {
        Ok(self
            .read()?
            .units
            .get(identity)
            .map(|record| record.committed_at))
    }

    fn read(&self) -> Result<SnapshotFile, StoreError> {
        let Some(bytes) = read_optional(&self.path)? else {
            return Ok(SnapshotFile {
                version: SNAPSHOT_FORMAT_VERSION,
                units: BTreeMap::new(),
            });
        };

        let probe: VersionProbe =
            serde_json::from_slice(&bytes).map_err(|e| StoreError::corrupt(&self.path, e))?;
        if probe.version != SNAPSHOT_FORMAT_VERSION {
            return Err(StoreError::VersionIncompatible {
                found: probe.version,
                supported: SNAPSHOT_FORMAT_VERSION,
            });
        }

        serde_json::from_slice(&bytes).map_err(|e| StoreError::corrupt(&self.path, e))
    }
}

impl SnapshotStore for LocalSnapshotStore {
    fn load(&self, identity: &str) -> Result<Option<Snapshot>, StoreError> {
        let file = self.read()?;
        Ok(file.units.get(identity).map(|record| record.values.clone()))
    }

    fn save(&self, identity: &str, snapshot: &Snapshot) -> Result<(), StoreError> {
        // Existing records of other units are carried over; a corrupt file is
        // reported rather than replaced.
        let mut file = self.read()?;
        file.units.insert(
            identity.to_string(),
            UnitRecord {
                values: snapshot.clone(),
                committed_at: Utc::now(),
            },
        );

        let json = serde_json::to_vec_pretty(&file)?;
        atomic_write(&self.path, &json)?;
        debug!(
            path = %self.path.display(),
            identity,
            keys = snapshot.len(),
            "Committed config snapshot"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use charmkit_tools::snapshot::snapshot;
    use tempfile::TempDir;

    fn test_store() -> (LocalSnapshotStore, TempDir) {
        let temp = TempDir::new().unwrap();
        (LocalSnapshotStore::new(temp.path().join("state")), temp)
    }

    #[test]
    fn load_before_any_save_is_none() {
        let (store, _temp) = test_store();
        assert!(store.load("web/0").unwrap().is_none());
        assert!(!store.path().exists());
    }

    #[test]
    fn save_and_load() {
        let (store, _temp) = test_store();
        let values = snapshot([("port", "8080"), ("debug", "false")]);

        store.save("web/0", &values).unwrap();

        assert_eq!(store.load("web/0").unwrap(), Some(values));
        assert!(store.committed_at("web/0").unwrap().is_some());
    }

    #[test]
    fn units_are_kept_apart() {
        let (store, _temp) = test_store();
        store.save("web/0", &snapshot([("a", "1")])).unwrap();
        store.save("web/1", &snapshot([("a", "2")])).unwrap();

        assert_eq!(store.load("web/0").unwrap(), Some(snapshot([("a", "1")])));
        assert_eq!(store.load("web/1").unwrap(), Some(snapshot([("a", "2")])));
        assert!(store.load("db/0").unwrap().is_none());
    }

    #[test]
    fn saving_twice_is_idempotent() {
        let (store, _temp) = test_store();
        let values = snapshot([("a", "1")]);
        store.save("web/0", &values).unwrap();
        store.save("web/0", &values).unwrap();
        assert_eq!(store.load("web/0").unwrap(), Some(values));
    }

    #[test]
    fn stale_temp_file_is_ignored() {
        let (store, _temp) = test_store();
        store.save("web/0", &snapshot([("a", "1")])).unwrap();

        // Leftover from an interrupted save.
        let temp_file = crate::fs::temp_path(store.path());
        std::fs::write(&temp_file, b"{\"version\":1,\"units\":{\"web/0\":").unwrap();

        assert_eq!(store.load("web/0").unwrap(), Some(snapshot([("a", "1")])));

        store.save("web/0", &snapshot([("a", "2")])).unwrap();
        assert_eq!(store.load("web/0").unwrap(), Some(snapshot([("a", "2")])));
        assert!(!temp_file.exists());
    }

    #[test]
    fn corrupt_file_is_reported_and_kept() {
        let (store, _temp) = test_store();
        std::fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        std::fs::write(store.path(), b"not json").unwrap();

        assert!(matches!(
            store.load("web/0"),
            Err(StoreError::Corrupt { .. })
        ));
        assert!(store.save("web/0", &snapshot([("a", "1")])).is_err());
        assert_eq!(std::fs::read(store.path()).unwrap(), b"not json");
    }

    #[test]
    fn future_version_is_rejected() {
        let (store, _temp) = test_store();
        std::fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        std::fs::write(store.path(), br#"{"version":7,"layout":"different"}"#).unwrap();

        assert!(matches!(
            store.load("web/0"),
            Err(StoreError::VersionIncompatible {
                found: 7,
                supported: 1
            })
        ));
    }
}
