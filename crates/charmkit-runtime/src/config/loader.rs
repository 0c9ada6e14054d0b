//! Configuration loader with layered merging.
//!
//! # Load Order
//!
//! 1. Default values (compile-time)
//! 2. Charm config (`<charm_dir>/charmkit.toml`)
//! 3. Environment variables (`CHARMKIT_*`)
//!
//! Each layer overrides the previous.

use super::{ConfigError, RuntimeConfig, CONFIG_FILE};
use charmkit_tools::env::vars;
use charmkit_tools::{HookEnv, ProcessEnv};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Overrides `state_dir`.
pub const ENV_STATE_DIR: &str = "CHARMKIT_STATE_DIR";
/// Overrides `tools_dir`.
pub const ENV_TOOLS_DIR: &str = "CHARMKIT_TOOLS_DIR";
/// Overrides `logging.level`.
pub const ENV_LOG_LEVEL: &str = "CHARMKIT_LOG_LEVEL";
/// Overrides `logging.juju_log`.
pub const ENV_JUJU_LOG: &str = "CHARMKIT_JUJU_LOG";
/// Overrides `logging.ansi`.
pub const ENV_ANSI: &str = "CHARMKIT_ANSI";

/// Helper macro for parsing boolean environment variables.
macro_rules! parse_env_bool {
    ($env:expr, $field:expr, $var:expr) => {
        if let Some(val) = $env.var($var) {
            $field = parse_bool(&val)
                .ok_or_else(|| ConfigError::invalid_env_var($var, "expected bool"))?;
        }
    };
}

/// Configuration loader with builder pattern.
///
/// # Example
///
/// ```no_run
/// use charmkit_runtime::config::ConfigLoader;
///
/// let config = ConfigLoader::new()
///     .with_charm_dir("/var/lib/juju/agents/unit-web-0/charm")
///     .load()?;
/// # Ok::<(), charmkit_runtime::config::ConfigError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    /// Charm directory. Falls back to `CHARM_DIR`.
    charm_dir: Option<PathBuf>,

    /// Skip environment variable loading.
    skip_env: bool,

    /// Skip `charmkit.toml` loading.
    skip_file: bool,
}

impl ConfigLoader {
    /// Creates a new loader with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the charm directory explicitly.
    #[must_use]
    pub fn with_charm_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.charm_dir = Some(path.into());
        self
    }

    /// Skips environment variable loading.
    ///
    /// Useful for testing with deterministic config.
    #[must_use]
    pub fn skip_env_vars(mut self) -> Self {
        self.skip_env = true;
        self
    }

    /// Skips the config file layer.
    #[must_use]
    pub fn skip_file(mut self) -> Self {
        self.skip_file = true;
        self
    }

    /// Loads configuration against the process environment.
    ///
    /// # Errors
    ///
    /// See [`ConfigLoader::load_from`].
    pub fn load(&self) -> Result<RuntimeConfig, ConfigError> {
        self.load_from(&ProcessEnv)
    }

    /// Loads and merges configuration, reading variables from `env`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the config file exists but cannot be
    /// read or parsed, or an override variable holds an invalid value.
    /// A missing config file is silently ignored.
    pub fn load_from(&self, env: &dyn HookEnv) -> Result<RuntimeConfig, ConfigError> {
        let mut config = RuntimeConfig::default();

        // Layer 1: charm config file
        if !self.skip_file {
            if let Some(charm_dir) = self.charm_dir(env) {
                let path = charm_dir.join(CONFIG_FILE);
                if let Some(file_config) = load_file(&path)? {
                    debug!(path = %path.display(), "Loaded charm config");
                    config = file_config;
                }
            }
        }

        // Layer 2: environment variables
        if !self.skip_env {
            apply_env_vars(env, &mut config)?;
        }

        Ok(config)
    }

    /// Charm directory in effect for `env`.
    #[must_use]
    pub fn charm_dir(&self, env: &dyn HookEnv) -> Option<PathBuf> {
        self.charm_dir
            .clone()
            .or_else(|| env.var(vars::CHARM_DIR).map(PathBuf::from))
    }
}

/// Loads a config file, returning None if it doesn't exist.
fn load_file(path: &Path) -> Result<Option<RuntimeConfig>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
    let config = RuntimeConfig::from_toml(&content).map_err(|e| ConfigError::parse_toml(path, e))?;

    Ok(Some(config))
}

/// Applies environment variable overrides.
fn apply_env_vars(env: &dyn HookEnv, config: &mut RuntimeConfig) -> Result<(), ConfigError> {
    parse_env_bool!(env, config.logging.juju_log, ENV_JUJU_LOG);
    parse_env_bool!(env, config.logging.ansi, ENV_ANSI);

    if let Some(val) = env.var(ENV_LOG_LEVEL) {
        if val.trim().is_empty() {
            return Err(ConfigError::invalid_env_var(ENV_LOG_LEVEL, "empty filter"));
        }
        config.logging.level = val;
    }

    // Path environment variables
    if let Some(val) = env.var(ENV_STATE_DIR) {
        config.state_dir = Some(PathBuf::from(val));
    }
    if let Some(val) = env.var(ENV_TOOLS_DIR) {
        config.tools_dir = Some(PathBuf::from(val));
    }

    Ok(())
}

/// Parses a boolean from string.
///
/// Accepts: "true", "false", "1", "0", "yes", "no", "on", "off" (case-insensitive).
fn parse_bool(s: &str) -> Option<bool> {
    match s.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
