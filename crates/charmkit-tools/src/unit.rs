//! Unit-level tools (`juju-log`, `juju-reboot`).

use crate::executor::{run, Invocation, ToolRunner};
use crate::ToolError;
use std::fmt;

/// Tool that writes to the orchestrator's unit log.
pub const JUJU_LOG: &str = "juju-log";
const JUJU_REBOOT: &str = "juju-reboot";

/// Severity accepted by `juju-log -l`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    Error,
    Warning,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Error => "ERROR",
            Self::Warning => "WARNING",
            Self::Info => "INFO",
            Self::Debug => "DEBUG",
            Self::Trace => "TRACE",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<tracing::Level> for LogLevel {
    fn from(level: tracing::Level) -> Self {
        match level {
            tracing::Level::ERROR => Self::Error,
            tracing::Level::WARN => Self::Warning,
            tracing::Level::INFO => Self::Info,
            tracing::Level::DEBUG => Self::Debug,
            _ => Self::Trace,
        }
    }
}

/// Argv for `juju-log`, shared with the logging layer.
#[must_use]
pub fn log_invocation(level: LogLevel, message: &str) -> Invocation {
    Invocation::new(JUJU_LOG)
        .args(["-l", level.as_str()])
        .arg(message)
}

/// Writes one line to the unit log.
///
/// # Errors
///
/// Any invocation failure.
pub fn log(runner: &dyn ToolRunner, level: LogLevel, message: &str) -> Result<(), ToolError> {
    run(runner, &log_invocation(level, message))?;
    Ok(())
}

/// Requests a machine reboot: after the hook by default, immediately
/// with `now` (the hook is then re-run after the reboot).
///
/// # Errors
///
/// Any invocation failure.
pub fn reboot(runner: &dyn ToolRunner, now: bool) -> Result<(), ToolError> {
    let invocation = Invocation::new(JUJU_REBOOT).args(now.then_some("--now"));
    run(runner, &invocation)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeRunner;

    #[test]
    fn log_argv() {
        let runner = FakeRunner::new().with_ok(["juju-log", "-l", "WARNING", "disk almost full"]);
        log(&runner, LogLevel::Warning, "disk almost full").unwrap();
        assert_eq!(runner.call_count("juju-log"), 1);
    }

    #[test]
    fn reboot_variants() {
        let runner = FakeRunner::new()
            .with_ok(["juju-reboot"])
            .with_ok(["juju-reboot", "--now"]);
        reboot(&runner, false).unwrap();
        reboot(&runner, true).unwrap();
        assert!(runner.was_called(["juju-reboot", "--now"]));
        assert_eq!(runner.call_count("juju-reboot"), 2);
    }

    #[test]
    fn tracing_levels_map() {
        assert_eq!(LogLevel::from(tracing::Level::WARN), LogLevel::Warning);
        assert_eq!(LogLevel::from(tracing::Level::TRACE).to_string(), "TRACE");
    }
}
