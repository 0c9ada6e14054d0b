//! Error types for hook tool access.

use charmkit_types::ErrorCode;
use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the command executor and the state accessors.
///
/// Variants group into the failure kinds a handler cares about:
///
/// | Kind | Variants |
/// |------|----------|
/// | Tool invocation failure | `ToolNotFound`, `Spawn`, `NonZeroExit`, `Signaled` |
/// | Unparsable response | `UnparsableResponse` |
/// | Missing value | `MissingValue`, `MissingKey` |
/// | Environment inconsistent with hook | `MissingEnvironment`, `InvalidEnvironment` |
/// | Rejected before invocation | `InvalidArgument` |
/// | Persisted state | `Store` |
#[derive(Debug, Error)]
pub enum ToolError {
    /// The hook tool executable does not exist.
    #[error("hook tool not found: {tool}")]
    ToolNotFound { tool: String },

    /// The hook tool exists but could not be started.
    #[error("failed to start {tool}: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    /// The hook tool exited with a non-zero status.
    #[error("{tool} exited with status {code}: {stderr}")]
    NonZeroExit {
        tool: String,
        code: i32,
        stderr: String,
    },

    /// The hook tool was killed by a signal.
    #[error("{tool} terminated by signal {signal:?}: {stderr}")]
    Signaled {
        tool: String,
        signal: Option<i32>,
        stderr: String,
    },

    /// The hook tool succeeded but its output had the wrong shape.
    #[error("unparsable response from {tool}: {reason}")]
    UnparsableResponse { tool: String, reason: String },

    /// The hook tool succeeded but printed nothing where a value was expected.
    #[error("{tool} returned no value")]
    MissingValue { tool: String },

    /// A configuration key exists in neither the current nor the previous snapshot.
    #[error("config key not found: {key}")]
    MissingKey { key: String },

    /// A required environment variable is not set for this hook.
    #[error("environment variable {name} is not set for this hook")]
    MissingEnvironment { name: String },

    /// An environment variable is set but cannot be interpreted.
    #[error("environment variable {name} has invalid value '{value}'")]
    InvalidEnvironment { name: String, value: String },

    /// An argument was rejected before any process was started.
    #[error("invalid argument for {tool}: {reason}")]
    InvalidArgument { tool: String, reason: String },

    /// Reading or writing persisted state failed.
    #[error("snapshot store: {0}")]
    Store(#[from] StoreError),
}

impl ToolError {
    /// Creates an `UnparsableResponse` error.
    pub fn unparsable(tool: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::UnparsableResponse {
            tool: tool.into(),
            reason: reason.into(),
        }
    }

    /// Creates a `MissingEnvironment` error.
    pub fn missing_env(name: impl Into<String>) -> Self {
        Self::MissingEnvironment { name: name.into() }
    }

    /// Creates an `InvalidArgument` error.
    pub fn invalid_argument(tool: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            tool: tool.into(),
            reason: reason.into(),
        }
    }

    /// Returns `true` if the external command failed to run to a zero exit.
    #[must_use]
    pub fn is_invocation_failure(&self) -> bool {
        matches!(
            self,
            Self::ToolNotFound { .. }
                | Self::Spawn { .. }
                | Self::NonZeroExit { .. }
                | Self::Signaled { .. }
        )
    }

    /// Returns `true` if a value or key was absent.
    #[must_use]
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::MissingValue { .. } | Self::MissingKey { .. })
    }

    /// Returns `true` if the process environment does not match the hook.
    #[must_use]
    pub fn is_environment(&self) -> bool {
        matches!(
            self,
            Self::MissingEnvironment { .. } | Self::InvalidEnvironment { .. }
        )
    }

    /// Returns the tool's exit code when it exited normally with non-zero status.
    #[must_use]
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Self::NonZeroExit { code, .. } => Some(*code),
            _ => None,
        }
    }
}

impl ErrorCode for ToolError {
    fn code(&self) -> &'static str {
        match self {
            Self::ToolNotFound { .. } => "TOOL_NOT_FOUND",
            Self::Spawn { .. } => "TOOL_SPAWN_FAILED",
            Self::NonZeroExit { .. } => "TOOL_NON_ZERO_EXIT",
            Self::Signaled { .. } => "TOOL_SIGNALED",
            Self::UnparsableResponse { .. } => "TOOL_UNPARSABLE_RESPONSE",
            Self::MissingValue { .. } => "TOOL_MISSING_VALUE",
            Self::MissingKey { .. } => "TOOL_MISSING_KEY",
            Self::MissingEnvironment { .. } => "TOOL_MISSING_ENVIRONMENT",
            Self::InvalidEnvironment { .. } => "TOOL_INVALID_ENVIRONMENT",
            Self::InvalidArgument { .. } => "TOOL_INVALID_ARGUMENT",
            Self::Store(_) => "TOOL_STORE_FAILED",
        }
    }

    fn is_recoverable(&self) -> bool {
        match self {
            Self::NonZeroExit { .. } | Self::Signaled { .. } | Self::Spawn { .. } => true,
            Self::MissingValue { .. } | Self::MissingKey { .. } => true,
            Self::Store(e) => e.is_recoverable(),
            _ => false,
        }
    }
}

/// Converts a missing-value failure into `None`.
///
/// Lets a handler treat an unset optional value as a default while
/// still propagating every other failure:
///
/// ```
/// use charmkit_tools::{OptionalExt, ToolError};
///
/// let missing: Result<String, ToolError> = Err(ToolError::MissingValue {
///     tool: "config-get".into(),
/// });
/// let port = missing.optional().unwrap().unwrap_or_else(|| "8080".into());
/// assert_eq!(port, "8080");
/// ```
pub trait OptionalExt<T> {
    /// Maps `MissingValue` / `MissingKey` to `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns every other [`ToolError`] unchanged.
    fn optional(self) -> Result<Option<T>, ToolError>;
}

impl<T> OptionalExt<T> for Result<T, ToolError> {
    fn optional(self) -> Result<Option<T>, ToolError> {
        match self {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.is_missing() => Ok(None),
            Err(e) => Err(e),
        }
    }
}

/// Errors from reading or writing persisted records.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem operation failed.
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The record exists but is not valid JSON of the expected shape.
    #[error("corrupt record '{path}': {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Serializing a record failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The record was written by an incompatible format version.
    #[error("record version {found} is not supported (expected {supported})")]
    VersionIncompatible { found: u32, supported: u32 },
}

impl StoreError {
    /// Creates an `Io` error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates a `Corrupt` error.
    pub fn corrupt(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Corrupt {
            path: path.into(),
            source,
        }
    }
}

impl ErrorCode for StoreError {
    fn code(&self) -> &'static str {
        match self {
            Self::Io { .. } => "STORE_IO",
            Self::Corrupt { .. } => "STORE_CORRUPT",
            Self::Serialization(_) => "STORE_SERIALIZATION",
            Self::VersionIncompatible { .. } => "STORE_VERSION_INCOMPATIBLE",
        }
    }

    fn is_recoverable(&self) -> bool {
        matches!(self, Self::Io { .. })
    }
}
