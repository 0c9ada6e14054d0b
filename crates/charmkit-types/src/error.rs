//! Machine-readable error codes.
//!
//! Every charmkit error enum implements [`ErrorCode`] so the application
//! layer can log a stable code next to the human message and decide
//! whether a retry in a later hook run could help.
//!
//! # Example
//!
//! ```
//! use charmkit_types::ErrorCode;
//!
//! #[derive(Debug)]
//! enum PortError {
//!     InUse(u16),
//!     Denied,
//! }
//!
//! impl ErrorCode for PortError {
//!     fn code(&self) -> &'static str {
//!         match self {
//!             Self::InUse(_) => "PORT_IN_USE",
//!             Self::Denied => "PORT_DENIED",
//!         }
//!     }
//!
//!     fn is_recoverable(&self) -> bool {
//!         matches!(self, Self::InUse(_))
//!     }
//! }
//!
//! assert_eq!(PortError::Denied.code(), "PORT_DENIED");
//! assert!(PortError::InUse(80).is_recoverable());
//! ```

/// Stable error code interface.
///
/// Codes are UPPER_SNAKE_CASE and prefixed with the owning crate's
/// domain (`TOOL_`, `STORE_`, `HOOK_`, `DISPATCH_`, `CONFIG_`, `APP_`).
/// Once published a code never changes meaning.
pub trait ErrorCode {
    /// Returns the machine-readable code.
    fn code(&self) -> &'static str;

    /// Returns `true` if the same operation may succeed when attempted
    /// again (in this run or a later hook invocation).
    fn is_recoverable(&self) -> bool;
}

/// Returns `true` if `code` is non-empty UPPER_SNAKE_CASE without
/// leading, trailing, or doubled underscores.
#[must_use]
pub fn is_valid_code(code: &str) -> bool {
    !code.is_empty()
        && !code.starts_with('_')
        && !code.ends_with('_')
        && !code.contains("__")
        && code
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}

/// Asserts that every error in `errors` carries a well-formed code with
/// the given prefix.
///
/// Intended for error enum tests.
///
/// # Panics
///
/// Panics with the offending code if a check fails.
pub fn assert_error_codes<E: ErrorCode>(errors: &[E], prefix: &str) {
    for err in errors {
        let code = err.code();
        assert!(
            code.starts_with(prefix),
            "error code '{code}' must start with prefix '{prefix}'"
        );
        assert!(is_valid_code(code), "error code '{code}' must be UPPER_SNAKE_CASE");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    enum Sample {
        Flaky,
        Broken,
    }

    impl ErrorCode for Sample {
        fn code(&self) -> &'static str {
            match self {
                Self::Flaky => "SAMPLE_FLAKY",
                Self::Broken => "SAMPLE_BROKEN",
            }
        }

        fn is_recoverable(&self) -> bool {
            matches!(self, Self::Flaky)
        }
    }

    #[test]
    fn recoverability_follows_variant() {
        assert!(Sample::Flaky.is_recoverable());
        assert!(!Sample::Broken.is_recoverable());
    }

    #[test]
    fn all_sample_codes_are_valid() {
        assert_error_codes(&[Sample::Flaky, Sample::Broken], "SAMPLE_");
    }

    #[test]
    #[should_panic(expected = "must start with prefix")]
    fn wrong_prefix_panics() {
        assert_error_codes(&[Sample::Broken], "TOOL_");
    }

    #[test]
    fn code_shape() {
        assert!(is_valid_code("TOOL_NOT_FOUND"));
        assert!(is_valid_code("E2BIG"));
        assert!(!is_valid_code(""));
        assert!(!is_valid_code("tool_not_found"));
        assert!(!is_valid_code("_TOOL"));
        assert!(!is_valid_code("TOOL_"));
        assert!(!is_valid_code("TOOL__X"));
    }
}
