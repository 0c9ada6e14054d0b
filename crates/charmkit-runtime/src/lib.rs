//! Runtime support for charmkit: framework configuration and the state a
//! unit keeps between hook runs.
//!
//! # Modules
//!
//! - [`config`]: `charmkit.toml` plus `CHARMKIT_*` overrides
//! - [`LocalSnapshotStore`]: committed config snapshots, one JSON file
//! - [`UnitData`]: free-form charm key/value state
//!
//! Both stores replace their file atomically (temp sibling then rename).

pub mod config;
mod fs;
mod store;
mod unitdata;

pub use config::{ConfigError, ConfigLoader, ConfigResolver, LoggingConfig, RuntimeConfig};
pub use store::{LocalSnapshotStore, SNAPSHOT_FILE, SNAPSHOT_FORMAT_VERSION};
pub use unitdata::{UnitData, UNIT_DATA_FILE};
