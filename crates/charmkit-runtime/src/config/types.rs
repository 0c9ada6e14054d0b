//! Framework configuration types.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Directory name for framework state under the charm directory.
pub const STATE_DIR_NAME: &str = ".charmkit";

/// Settings for the framework itself (not the charm's own options).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Directory for persisted framework state.
    ///
    /// Unset means `<CHARM_DIR>/.charmkit`, or `.charmkit` in the
    /// working directory without `CHARM_DIR`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_dir: Option<PathBuf>,

    /// Directory holding the hook tools. Unset resolves them via `PATH`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools_dir: Option<PathBuf>,

    /// Logging settings.
    pub logging: LoggingConfig,
}

impl RuntimeConfig {
    /// Parses a TOML document.
    ///
    /// # Errors
    ///
    /// Returns the TOML error for malformed input or unknown value types.
    pub fn from_toml(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    /// Effective state directory.
    #[must_use]
    pub fn state_dir(&self, charm_dir: Option<&Path>) -> PathBuf {
        match (&self.state_dir, charm_dir) {
            (Some(dir), _) => dir.clone(),
            (None, Some(charm_dir)) => charm_dir.join(STATE_DIR_NAME),
            (None, None) => PathBuf::from(STATE_DIR_NAME),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive (`info`, `debug`, `charmkit_tools=trace`, ...).
    pub level: String,

    /// Forward log events to the orchestrator through `juju-log`.
    pub juju_log: bool,

    /// Emit ANSI colors on stderr.
    pub ansi: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            juju_log: true,
            ansi: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = RuntimeConfig::default();
        assert_eq!(config.logging.level, "info");
        assert!(config.logging.juju_log);
        assert!(!config.logging.ansi);
        assert!(config.tools_dir.is_none());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = RuntimeConfig::from_toml(
            r#"
tools_dir = "/usr/lib/juju/tools"

[logging]
level = "debug"
"#,
        )
        .unwrap();
        assert_eq!(config.tools_dir, Some(PathBuf::from("/usr/lib/juju/tools")));
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.juju_log);
    }

    #[test]
    fn state_dir_resolution() {
        let mut config = RuntimeConfig::default();
        assert_eq!(config.state_dir(None), PathBuf::from(".charmkit"));
        assert_eq!(
            config.state_dir(Some(Path::new("/charm"))),
            PathBuf::from("/charm/.charmkit")
        );
        config.state_dir = Some(PathBuf::from("/srv/state"));
        assert_eq!(
            config.state_dir(Some(Path::new("/charm"))),
            PathBuf::from("/srv/state")
        );
    }
}
