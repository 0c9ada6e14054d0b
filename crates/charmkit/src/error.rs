//! Application-level error type.
//!
//! [`AppError`] collects everything that can end a hook run early.

use charmkit_hook::DispatchError;
use charmkit_runtime::ConfigError;
use charmkit_tools::ToolError;
use charmkit_types::ErrorCode;
use thiserror::Error;

/// Unified application error.
///
/// # Example
///
/// ```
/// use charmkit::AppError;
/// use charmkit::hook::DispatchError;
///
/// let err: AppError = DispatchError::invalid_context("JUJU_HOOK_NAME is not set").into();
/// assert_eq!(err.exit_code(), 1);
/// eprintln!("Error: {err}");
/// ```
#[derive(Debug, Error)]
pub enum AppError {
    /// Framework configuration could not be loaded.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// Logging could not be set up.
    #[error("logging error: {0}")]
    Logging(String),

    /// Dispatch failed: no hook name or a handler error.
    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    /// The hook succeeded but its config snapshot could not be committed.
    #[error("failed to commit config snapshot: {0}")]
    Commit(#[source] ToolError),
}

impl AppError {
    /// Process exit status for this failure. Always non-zero.
    #[must_use]
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Dispatch(e) => e.exit_code(),
            _ => 1,
        }
    }
}

impl ErrorCode for AppError {
    fn code(&self) -> &'static str {
        match self {
            Self::Config(e) => e.code(),
            Self::Logging(_) => "APP_LOGGING_ERROR",
            Self::Dispatch(e) => e.code(),
            Self::Commit(_) => "APP_COMMIT_FAILED",
        }
    }

    fn is_recoverable(&self) -> bool {
        match self {
            Self::Config(e) => e.is_recoverable(),
            Self::Logging(_) => false,
            Self::Dispatch(e) => e.is_recoverable(),
            Self::Commit(e) => e.is_recoverable(),
        }
    }
}
