//! Charm-local key/value state that survives between hook runs.
//!
//! Values are stored as JSON. All changes stay in memory until
//! [`UnitData::flush`], which replaces the backing file atomically, so a
//! handler that fails halfway through leaves the previous state on disk.

use crate::fs::{atomic_write, read_optional};
use charmkit_tools::StoreError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// File name of the unit data record inside the state directory.
pub const UNIT_DATA_FILE: &str = "unit-state.json";

const UNIT_DATA_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct UnitDataFile {
    version: u32,
    #[serde(default)]
    data: BTreeMap<String, Value>,
}

/// JSON key/value store backed by a single file.
///
/// # Example
///
/// ```no_run
/// use charmkit_runtime::UnitData;
///
/// let mut kv = UnitData::open("/var/lib/charm/.charmkit/unit-state.json")?;
/// let installs: u32 = kv.get("installs")?.unwrap_or(0);
/// kv.set("installs", installs + 1)?;
/// kv.flush()?;
/// # Ok::<(), charmkit_tools::StoreError>(())
/// ```
#[derive(Debug)]
pub struct UnitData {
    path: PathBuf,
    data: BTreeMap<String, Value>,
    dirty: bool,
}

impl UnitData {
    /// Opens the store at `path`. A missing file is an empty store.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the file exists but cannot be read or
    /// is not a record this version understands.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let data = match read_optional(&path)? {
            None => BTreeMap::new(),
            Some(bytes) => {
                let file: UnitDataFile =
                    serde_json::from_slice(&bytes).map_err(|e| StoreError::corrupt(&path, e))?;
                if file.version != UNIT_DATA_VERSION {
                    return Err(StoreError::VersionIncompatible {
                        found: file.version,
                        supported: UNIT_DATA_VERSION,
                    });
                }
                file.data
            }
        };
        debug!(path = %path.display(), keys = data.len(), "Opened unit data");
        Ok(Self {
            path,
            data,
            dirty: false,
        })
    }

    /// Opens `<state_dir>/unit-state.json`.
    ///
    /// # Errors
    ///
    /// Same as [`UnitData::open`].
    pub fn open_in(state_dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        Self::open(state_dir.as_ref().join(UNIT_DATA_FILE))
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether there are changes not yet flushed.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Reads and decodes `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Serialization`] if the stored value does not
    /// decode as `T`.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        self.data
            .get(key)
            .map(|value| serde_json::from_value(value.clone()))
            .transpose()
            .map_err(StoreError::from)
    }

    /// Raw JSON value of `key`.
    #[must_use]
    pub fn get_value(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// All entries whose key starts with `prefix`.
    ///
    /// With `strip`, the prefix is removed from the returned keys.
    #[must_use]
    pub fn get_range(&self, prefix: &str, strip: bool) -> BTreeMap<String, Value> {
        self.data
            .range(prefix.to_string()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, v)| {
                let key = if strip { &k[prefix.len()..] } else { k.as_str() };
                (key.to_string(), v.clone())
            })
            .collect()
    }

    /// Stores `value` under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Serialization`] if `value` cannot be encoded.
    pub fn set<T: Serialize>(&mut self, key: impl Into<String>, value: T) -> Result<(), StoreError> {
        let value = serde_json::to_value(value)?;
        let key = key.into();
        if self.data.get(&key) != Some(&value) {
            self.data.insert(key, value);
            self.dirty = true;
        }
        Ok(())
    }

    /// Stores every pair, with `prefix` prepended to each key.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Serialization`] if any value cannot be
    /// encoded. Pairs before the failing one are kept.
    pub fn update<I, K, T>(&mut self, pairs: I, prefix: &str) -> Result<(), StoreError>
    where
        I: IntoIterator<Item = (K, T)>,
        K: AsRef<str>,
        T: Serialize,
    {
        for (key, value) in pairs {
            self.set(format!("{prefix}{}", key.as_ref()), value)?;
        }
        Ok(())
    }

    /// Removes `key`. Returns whether it was present.
    pub fn unset(&mut self, key: &str) -> bool {
        let removed = self.data.remove(key).is_some();
        self.dirty |= removed;
        removed
    }

    /// Removes a set of keys and returns how many were present.
    ///
    /// With `keys`, removes `prefix + key` for each. Without, removes every
    /// key starting with `prefix` (an empty prefix clears the store).
    pub fn unset_range(&mut self, keys: Option<&[&str]>, prefix: &str) -> usize {
        let doomed: Vec<String> = match keys {
            Some(keys) => keys.iter().map(|k| format!("{prefix}{k}")).collect(),
            None => self
                .data
                .keys()
                .filter(|k| k.starts_with(prefix))
                .cloned()
                .collect(),
        };
        let mut removed = 0;
        for key in &doomed {
            if self.unset(key) {
                removed += 1;
            }
        }
        removed
    }

    /// Writes pending changes to disk. A clean store is not rewritten.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the file cannot be replaced. The
    /// in-memory changes stay pending.
    pub fn flush(&mut self) -> Result<(), StoreError> {
        if !self.dirty {
            return Ok(());
        }
        let file = UnitDataFile {
            version: UNIT_DATA_VERSION,
            data: std::mem::take(&mut self.data),
        };
        let written = serde_json::to_vec_pretty(&file)
            .map_err(StoreError::from)
            .and_then(|json| atomic_write(&self.path, &json));
        self.data = file.data;
        written?;

        self.dirty = false;
        debug!(path = %self.path.display(), keys = self.data.len(), "Flushed unit data");
        Ok(())
    }
}
