//! Charm configuration: direct reads and the per-run diff cache.

use crate::env::{self, vars, HookEnv};
use crate::executor::{run, Invocation, ToolRunner};
use crate::snapshot::{Snapshot, SnapshotStore};
use crate::{parse, ToolError};
use tracing::{debug, info};

const CONFIG_GET: &str = "config-get";

/// Reads one configuration value (`config-get <key>`).
///
/// # Errors
///
/// `MissingValue` if the option is unset, or any invocation failure.
pub fn get(runner: &dyn ToolRunner, key: &str) -> Result<String, ToolError> {
    let out = run(runner, &Invocation::new(CONFIG_GET).arg(key))?;
    parse::scalar(CONFIG_GET, &out)
}

/// Reads the whole configuration (`config-get --all --format=json`).
///
/// # Errors
///
/// `UnparsableResponse` if the output is not a flat JSON object, or any
/// invocation failure.
pub fn get_all(runner: &dyn ToolRunner) -> Result<Snapshot, ToolError> {
    let out = run(
        runner,
        &Invocation::new(CONFIG_GET).args(["--all", "--format=json"]),
    )?;
    parse::map(CONFIG_GET, &out)
}

/// How one key compares between the previous run and this one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigDiff {
    /// Present in both with the same value.
    Unchanged(String),
    /// Present in both with different values.
    Changed { old: String, new: String },
    /// Present now, absent before (or no previous run recorded).
    Added(String),
    /// Present before, absent now.
    Removed(String),
}

impl ConfigDiff {
    /// Returns `true` for anything but `Unchanged`.
    #[must_use]
    pub fn is_changed(&self) -> bool {
        !matches!(self, Self::Unchanged(_))
    }

    /// Value in the previous snapshot.
    #[must_use]
    pub fn previous(&self) -> Option<&str> {
        match self {
            Self::Unchanged(v) | Self::Removed(v) => Some(v),
            Self::Changed { old, .. } => Some(old),
            Self::Added(_) => None,
        }
    }

    /// Value in the current snapshot.
    #[must_use]
    pub fn current(&self) -> Option<&str> {
        match self {
            Self::Unchanged(v) | Self::Added(v) => Some(v),
            Self::Changed { new, .. } => Some(new),
            Self::Removed(_) => None,
        }
    }

    fn compute(key: &str, previous: Option<&str>, current: Option<&str>) -> Result<Self, ToolError> {
        match (previous, current) {
            (Some(old), Some(new)) if old == new => Ok(Self::Unchanged(new.to_string())),
            (Some(old), Some(new)) => Ok(Self::Changed {
                old: old.to_string(),
                new: new.to_string(),
            }),
            (None, Some(new)) => Ok(Self::Added(new.to_string())),
            (Some(old), None) => Ok(Self::Removed(old.to_string())),
            (None, None) => Err(ToolError::MissingKey {
                key: key.to_string(),
            }),
        }
    }
}

/// Per-run cache of the current configuration and the previous run's
/// committed snapshot.
///
/// The current snapshot is fetched at most once and the previous one is
/// loaded at most once; neither changes afterwards. Nothing is persisted
/// until [`commit`](Self::commit) is called.
pub struct ConfigCache<'a> {
    runner: &'a dyn ToolRunner,
    store: &'a dyn SnapshotStore,
    identity: Option<String>,
    current: Option<Snapshot>,
    // Outer `None`: not loaded yet. Inner `None`: no prior record.
    previous: Option<Option<Snapshot>>,
}

impl<'a> ConfigCache<'a> {
    /// Creates a cache for the unit named by `JUJU_UNIT_NAME`.
    ///
    /// A missing unit name is only reported when the previous snapshot
    /// is first needed.
    pub fn new(runner: &'a dyn ToolRunner, env: &dyn HookEnv, store: &'a dyn SnapshotStore) -> Self {
        Self::with_identity(runner, store, env::optional(env, vars::JUJU_UNIT_NAME))
    }

    /// Creates a cache with an explicit record identity.
    pub fn with_identity(
        runner: &'a dyn ToolRunner,
        store: &'a dyn SnapshotStore,
        identity: Option<String>,
    ) -> Self {
        Self {
            runner,
            store,
            identity,
            current: None,
            previous: None,
        }
    }

    fn identity(&self) -> Result<&str, ToolError> {
        self.identity
            .as_deref()
            .ok_or_else(|| ToolError::missing_env(vars::JUJU_UNIT_NAME))
    }

    /// Returns the current configuration, fetching it on first use.
    ///
    /// # Errors
    ///
    /// Any failure of `config-get --all`.
    pub fn current(&mut self) -> Result<&Snapshot, ToolError> {
        if self.current.is_none() {
            let fetched = get_all(self.runner)?;
            debug!(keys = fetched.len(), "fetched current config");
            self.current = Some(fetched);
        }
        Ok(self.current.get_or_insert_with(Snapshot::new))
    }

    fn previous_snapshot(&mut self) -> Result<Option<&Snapshot>, ToolError> {
        if self.previous.is_none() {
            let identity = self.identity()?.to_string();
            let loaded = self.store.load(&identity)?;
            debug!(identity = %identity, found = loaded.is_some(), "loaded previous config");
            self.previous = Some(loaded);
        }
        Ok(self.previous.as_ref().and_then(Option::as_ref))
    }

    /// Returns `true` if a previous run committed a snapshot.
    ///
    /// # Errors
    ///
    /// `MissingEnvironment` without a unit identity, or a store failure.
    pub fn has_previous(&mut self) -> Result<bool, ToolError> {
        Ok(self.previous_snapshot()?.is_some())
    }

    /// Current value of `key`.
    ///
    /// # Errors
    ///
    /// `MissingKey` if the key is not set in the current configuration.
    pub fn get(&mut self, key: &str) -> Result<String, ToolError> {
        self.current()?
            .get(key)
            .cloned()
            .ok_or_else(|| ToolError::MissingKey {
                key: key.to_string(),
            })
    }

    /// Value of `key` in the previous run's snapshot.
    ///
    /// # Errors
    ///
    /// `MissingEnvironment` without a unit identity, or a store failure.
    pub fn previous(&mut self, key: &str) -> Result<Option<String>, ToolError> {
        Ok(self.previous_snapshot()?.and_then(|s| s.get(key).cloned()))
    }

    /// Compares `key` between the previous run and now.
    ///
    /// # Errors
    ///
    /// `MissingKey` if the key is in neither snapshot, or any fetch/load
    /// failure.
    pub fn diff(&mut self, key: &str) -> Result<ConfigDiff, ToolError> {
        let current = self.current()?.get(key).cloned();
        let previous = self.previous(key)?;
        ConfigDiff::compute(key, previous.as_deref(), current.as_deref())
    }

    /// Returns `true` if `key` was added, changed, or removed.
    ///
    /// # Errors
    ///
    /// Same as [`diff`](Self::diff).
    pub fn changed(&mut self, key: &str) -> Result<bool, ToolError> {
        self.diff(key).map(|d| d.is_changed())
    }

    /// All keys whose diff is not `Unchanged`, sorted.
    ///
    /// # Errors
    ///
    /// Any fetch/load failure.
    pub fn changed_keys(&mut self) -> Result<Vec<String>, ToolError> {
        let current = self.current()?.clone();
        let previous = self.previous_snapshot()?.cloned().unwrap_or_default();

        let mut keys: Vec<String> = current
            .iter()
            .filter(|(k, v)| previous.get(*k) != Some(*v))
            .map(|(k, _)| k.clone())
            .chain(previous.keys().filter(|k| !current.contains_key(*k)).cloned())
            .collect();
        keys.sort();
        Ok(keys)
    }

    /// Persists the current snapshot as the next run's previous one.
    ///
    /// Fetches the current configuration first if nothing has read it.
    /// The snapshot loaded as "previous" for this run is unaffected.
    ///
    /// # Errors
    ///
    /// `MissingEnvironment` without a unit identity, a fetch failure, or
    /// a store failure.
    pub fn commit(&mut self) -> Result<(), ToolError> {
        let identity = self.identity()?.to_string();
        let store = self.store;
        let current = self.current()?;
        store.save(&identity, current)?;
        info!(identity = %identity, keys = current.len(), "committed config snapshot");
        Ok(())
    }
}

impl std::fmt::Debug for ConfigCache<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigCache")
            .field("identity", &self.identity)
            .field("current", &self.current)
            .field("previous", &self.previous)
            .finish_non_exhaustive()
    }
}
