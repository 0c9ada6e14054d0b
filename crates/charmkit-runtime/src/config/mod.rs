//! Framework configuration.
//!
//! These settings govern charmkit itself: where state is kept, where the
//! hook tools live, how logs are emitted. The charm's own options are
//! read at hook time through `config-get` instead.
//!
//! # Sources
//!
//! | Layer | Location |
//! |-------|----------|
//! | File  | `<CHARM_DIR>/charmkit.toml` |
//! | Env   | `CHARMKIT_STATE_DIR`, `CHARMKIT_TOOLS_DIR`, `CHARMKIT_LOG_LEVEL`, `CHARMKIT_JUJU_LOG`, `CHARMKIT_ANSI` |
//!
//! # Example file
//!
//! ```toml
//! tools_dir = "/var/lib/juju/tools/unit-web-0"
//!
//! [logging]
//! level = "debug"
//! juju_log = true
//! ```

mod error;
mod loader;
mod resolver;
mod types;

pub use error::ConfigError;
pub use loader::{
    ConfigLoader, ENV_ANSI, ENV_JUJU_LOG, ENV_LOG_LEVEL, ENV_STATE_DIR, ENV_TOOLS_DIR,
};
pub use resolver::ConfigResolver;
pub use types::{LoggingConfig, RuntimeConfig, STATE_DIR_NAME};

/// Config file name, relative to the charm directory.
pub const CONFIG_FILE: &str = "charmkit.toml";
