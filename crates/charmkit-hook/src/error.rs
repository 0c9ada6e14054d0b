//! Error types for handlers and dispatch.

use charmkit_tools::ToolError;
use charmkit_types::{ErrorCode, HookName};
use thiserror::Error;

/// Failure reported by a handler.
#[derive(Debug, Error)]
pub enum HookError {
    /// A state accessor failed and the handler propagated it.
    #[error(transparent)]
    Tool(#[from] ToolError),

    /// The handler decided the hook cannot succeed.
    #[error("{0}")]
    Failed(String),

    /// Any other error raised by application code.
    #[error(transparent)]
    Other(Box<dyn std::error::Error + Send + Sync>),
}

impl HookError {
    /// Creates a `Failed` error.
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }

    /// Wraps an application error.
    pub fn other(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Other(Box::new(source))
    }

    /// Returns the underlying tool error, if that is what failed.
    #[must_use]
    pub fn as_tool_error(&self) -> Option<&ToolError> {
        match self {
            Self::Tool(e) => Some(e),
            _ => None,
        }
    }
}

impl ErrorCode for HookError {
    fn code(&self) -> &'static str {
        match self {
            Self::Tool(_) => "HOOK_TOOL_FAILED",
            Self::Failed(_) => "HOOK_FAILED",
            Self::Other(_) => "HOOK_APPLICATION_ERROR",
        }
    }

    fn is_recoverable(&self) -> bool {
        match self {
            Self::Tool(e) => e.is_recoverable(),
            _ => false,
        }
    }
}

/// Dispatch-level failure. Never recovered locally: it becomes the
/// process's exit status.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The environment does not name a hook to run.
    #[error("invalid invocation context: {reason}")]
    InvalidInvocationContext { reason: String },

    /// Handlers were registered under names that can never fire.
    #[error("handlers registered under invalid hook names: {names:?}")]
    InvalidRegistration { names: Vec<String> },

    /// A handler failed; later handlers for the hook were not run.
    #[error("handler #{index} for hook '{hook}' failed: {source}")]
    HandlerFailed {
        hook: HookName,
        index: usize,
        #[source]
        source: HookError,
    },
}

impl DispatchError {
    /// Creates an `InvalidInvocationContext` error.
    pub fn invalid_context(reason: impl Into<String>) -> Self {
        Self::InvalidInvocationContext {
            reason: reason.into(),
        }
    }

    /// Process exit status for this failure.
    #[must_use]
    pub fn exit_code(&self) -> u8 {
        1
    }
}

impl ErrorCode for DispatchError {
    fn code(&self) -> &'static str {
        match self {
            Self::InvalidInvocationContext { .. } => "DISPATCH_INVALID_CONTEXT",
            Self::InvalidRegistration { .. } => "DISPATCH_INVALID_REGISTRATION",
            Self::HandlerFailed { .. } => "DISPATCH_HANDLER_FAILED",
        }
    }

    fn is_recoverable(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use charmkit_types::assert_error_codes;

    #[test]
    fn tool_error_converts() {
        let err: HookError = ToolError::missing_env("JUJU_UNIT_NAME").into();
        assert!(err.as_tool_error().is_some_and(ToolError::is_environment));
        assert_eq!(
            err.to_string(),
            "environment variable JUJU_UNIT_NAME is not set for this hook"
        );
    }

    #[test]
    fn display_handler_failed() {
        let err = DispatchError::HandlerFailed {
            hook: HookName::new("install").unwrap(),
            index: 1,
            source: HookError::failed("apt-get failed"),
        };
        assert_eq!(
            err.to_string(),
            "handler #1 for hook 'install' failed: apt-get failed"
        );
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn other_keeps_source_message() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "cannot write /etc/app.conf");
        let err = HookError::other(io);
        assert_eq!(err.to_string(), "cannot write /etc/app.conf");
    }

    #[test]
    fn error_codes_are_well_formed() {
        assert_error_codes(
            &[HookError::failed("x"), HookError::Tool(ToolError::missing_env("X"))],
            "HOOK_",
        );
        assert_error_codes(
            &[
                DispatchError::invalid_context("no hook"),
                DispatchError::InvalidRegistration {
                    names: vec![String::new()],
                },
            ],
            "DISPATCH_",
        );
    }
}
