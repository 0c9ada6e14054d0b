//! Tracing setup for hook runs.
//!
//! Two independent layers:
//!
//! - stderr: full `fmt` output, captured by the orchestrator's hook log.
//! - [`JujuLogMakeWriter`]: ships each event to the unit log through
//!   `juju-log -l LEVEL message`, one tool call per event.
//!
//! Filter precedence: `CHARMKIT_LOG` > `logging.level` from config.

use charmkit_runtime::LoggingConfig;
use charmkit_tools::unit::{log_invocation, LogLevel};
use charmkit_tools::{HookEnv, ToolRunner};
use std::io::{self, Write};
use std::sync::Arc;
use tracing::{debug, Metadata};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::AppError;

/// Environment variable holding a full filter directive.
pub const LOG_ENV: &str = "CHARMKIT_LOG";

/// Runner shared with the juju-log layer.
pub type SharedRunner = Arc<dyn ToolRunner + Send + Sync>;

/// Builds the filter for `directive`, letting `CHARMKIT_LOG` take precedence.
///
/// # Errors
///
/// Returns [`AppError::Logging`] if the directive does not parse.
pub fn filter(directive: &str, env_override: Option<&str>) -> Result<EnvFilter, AppError> {
    let directive = env_override
        .filter(|d| !d.trim().is_empty())
        .unwrap_or(directive);
    EnvFilter::try_new(directive)
        .map_err(|e| AppError::Logging(format!("invalid filter '{directive}': {e}")))
}

/// Installs the global subscriber.
///
/// `env` supplies `CHARMKIT_LOG`. `juju_log` is the runner for the
/// unit-log layer, `None` to disable it.
/// Calling this when a subscriber is already installed is not an error;
/// the existing one is kept and told so at debug level.
///
/// # Errors
///
/// Returns [`AppError::Logging`] if a filter directive does not parse.
pub fn init(
    config: &LoggingConfig,
    env: &dyn HookEnv,
    juju_log: Option<SharedRunner>,
) -> Result<(), AppError> {
    let env_override = env.var(LOG_ENV);

    let stderr_layer = fmt::layer()
        .with_target(false)
        .with_ansi(config.ansi)
        .with_writer(io::stderr)
        .with_filter(filter(&config.level, env_override.as_deref())?);

    let juju_layer = match juju_log {
        Some(runner) => Some(
            juju_log_layer(runner)
                .with_filter(filter(&config.level, env_override.as_deref())?),
        ),
        None => None,
    };

    if let Err(e) = tracing_subscriber::registry()
        .with(stderr_layer)
        .with(juju_layer)
        .try_init()
    {
        debug!(error = %e, "subscriber already installed, charmkit layers not added");
    }
    Ok(())
}

/// `fmt` layer writing bare messages to `juju-log`.
///
/// `juju-log` stamps time and level itself, so the layer emits neither.
pub fn juju_log_layer<S>(runner: SharedRunner) -> impl Layer<S>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    fmt::layer()
        .with_ansi(false)
        .without_time()
        .with_level(false)
        .with_target(false)
        .with_writer(JujuLogMakeWriter::new(runner))
}

/// [`MakeWriter`] for the unit-log layer.
///
/// The event level picks the `-l` argument. Tool output and failures are
/// discarded: logging must never fail a hook.
#[derive(Clone)]
pub struct JujuLogMakeWriter {
    runner: SharedRunner,
}

impl JujuLogMakeWriter {
    pub fn new(runner: SharedRunner) -> Self {
        Self { runner }
    }
}

impl<'a> MakeWriter<'a> for JujuLogMakeWriter {
    type Writer = JujuLogWriter;

    fn make_writer(&'a self) -> Self::Writer {
        JujuLogWriter::new(Arc::clone(&self.runner), LogLevel::Info)
    }

    fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
        JujuLogWriter::new(Arc::clone(&self.runner), LogLevel::from(*meta.level()))
    }
}

/// Per-event writer for the unit log.
///
/// Buffers bytes from the formatter. On [`Drop`], sends the buffer as a
/// single `juju-log` call.
pub struct JujuLogWriter {
    runner: SharedRunner,
    level: LogLevel,
    buf: Vec<u8>,
}

impl JujuLogWriter {
    fn new(runner: SharedRunner, level: LogLevel) -> Self {
        Self {
            runner,
            level,
            buf: Vec::with_capacity(256),
        }
    }
}

impl Write for JujuLogWriter {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for JujuLogWriter {
    fn drop(&mut self) {
        let text = String::from_utf8_lossy(&self.buf);
        let message = text.trim();
        if message.is_empty() {
            return;
        }

        // Straight to the runner: `executor::run` emits tracing events itself.
        let _ = self.runner.execute(&log_invocation(self.level, message));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use charmkit_tools::testing::FakeRunner;

    #[test]
    fn filter_prefers_env_override() {
        assert!(filter("info", None).is_ok());
        assert!(filter("info", Some("charmkit_tools=trace")).is_ok());
        assert!(filter("info", Some("  ")).is_ok());
        assert!(matches!(
            filter("charmkit=loud", None),
            Err(AppError::Logging(_))
        ));
    }

    #[test]
    fn events_become_juju_log_calls() {
        let runner = Arc::new(
            FakeRunner::new()
                .with_ok(["juju-log", "-l", "INFO", "installing packages"])
                .with_ok(["juju-log", "-l", "WARNING", "mirror slow"]),
        );
        let subscriber = tracing_subscriber::registry()
            .with(juju_log_layer(runner.clone()).with_filter(EnvFilter::new("info")));

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!("installing packages");
            tracing::warn!("mirror slow");
            tracing::debug!("filtered out");
        });

        assert_eq!(runner.call_count("juju-log"), 2);
        assert!(runner.was_called(["juju-log", "-l", "INFO", "installing packages"]));
        assert!(runner.was_called(["juju-log", "-l", "WARNING", "mirror slow"]));
    }

    #[test]
    fn second_init_reports_existing_subscriber() {
        let runner = Arc::new(FakeRunner::new());
        let subscriber = tracing_subscriber::registry().with(juju_log_layer(runner.clone()));
        let env = charmkit_tools::testing::MapEnv::new();

        tracing::subscriber::with_default(subscriber, || {
            init(&LoggingConfig::default(), &env, None).unwrap();
            init(&LoggingConfig::default(), &env, None).unwrap();
        });

        assert!(runner
            .calls()
            .iter()
            .any(|argv| argv.iter().any(|arg| arg.contains("subscriber already installed"))));
    }

    #[test]
    fn missing_juju_log_is_ignored() {
        let runner = Arc::new(FakeRunner::new().missing("juju-log"));
        let subscriber = tracing_subscriber::registry().with(juju_log_layer(runner.clone()));

        tracing::subscriber::with_default(subscriber, || {
            tracing::error!("still fine");
        });

        assert_eq!(runner.call_count("juju-log"), 1);
    }
}
