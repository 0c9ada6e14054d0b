//! Command executor: one hook tool invocation per call.
//!
//! The executor is split in two layers:
//!
//! - [`ToolRunner`] turns an [`Invocation`] into a [`RawOutput`]
//!   (exit status plus captured stdout/stderr). It only fails when the
//!   process could not be started at all.
//! - [`run`] interprets a `RawOutput`, turning a non-zero exit or a
//!   signal into a [`ToolError`] and handing back stdout on success.
//!
//! Accessors always go through [`run`], so a fake `ToolRunner` that
//! returns scripted `RawOutput`s exercises the same failure paths as a
//! real process.

use crate::ToolError;
use std::fmt;
use std::path::PathBuf;
use std::process::{Command, ExitStatus, Stdio};
use tracing::{debug, warn};

/// A hook tool name plus its ordered argument vector.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Invocation {
    tool: String,
    args: Vec<String>,
}

impl Invocation {
    /// Creates an invocation with no arguments.
    #[must_use]
    pub fn new(tool: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            args: Vec::new(),
        }
    }

    /// Appends one argument.
    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Appends several arguments.
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Appends `flag value` when `value` is present.
    #[must_use]
    pub fn opt(self, flag: &str, value: Option<impl fmt::Display>) -> Self {
        match value {
            Some(v) => self.arg(flag).arg(v.to_string()),
            None => self,
        }
    }

    /// Returns the tool name.
    #[must_use]
    pub fn tool(&self) -> &str {
        &self.tool
    }

    /// Returns the argument vector (without the tool name).
    #[must_use]
    pub fn argv(&self) -> &[String] {
        &self.args
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tool)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// How the tool process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitKind {
    /// Normal exit with the given status code.
    Code(i32),
    /// Killed by a signal (number when the platform reports one).
    Signal(Option<i32>),
}

impl ExitKind {
    fn from_status(status: ExitStatus) -> Self {
        match status.code() {
            Some(code) => Self::Code(code),
            None => Self::Signal(signal_of(status)),
        }
    }
}

#[cfg(unix)]
fn signal_of(status: ExitStatus) -> Option<i32> {
    use std::os::unix::process::ExitStatusExt;
    status.signal()
}

#[cfg(not(unix))]
fn signal_of(_status: ExitStatus) -> Option<i32> {
    None
}

/// Everything captured from one finished tool process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawOutput {
    /// How the process ended.
    pub exit: ExitKind,
    /// Captured standard output.
    pub stdout: Vec<u8>,
    /// Captured standard error.
    pub stderr: Vec<u8>,
}

impl RawOutput {
    /// A zero exit with the given stdout.
    #[must_use]
    pub fn success(stdout: impl Into<Vec<u8>>) -> Self {
        Self {
            exit: ExitKind::Code(0),
            stdout: stdout.into(),
            stderr: Vec::new(),
        }
    }

    /// A non-zero exit with the given stderr.
    #[must_use]
    pub fn failure(code: i32, stderr: impl Into<Vec<u8>>) -> Self {
        Self {
            exit: ExitKind::Code(code),
            stdout: Vec::new(),
            stderr: stderr.into(),
        }
    }

    /// A signal termination with the given stderr.
    #[must_use]
    pub fn signaled(signal: Option<i32>, stderr: impl Into<Vec<u8>>) -> Self {
        Self {
            exit: ExitKind::Signal(signal),
            stdout: Vec::new(),
            stderr: stderr.into(),
        }
    }

    /// Returns stdout on a zero exit, or the matching [`ToolError`].
    ///
    /// # Errors
    ///
    /// `NonZeroExit` or `Signaled`, carrying the captured stderr.
    pub fn into_stdout(self, tool: &str) -> Result<Vec<u8>, ToolError> {
        let stderr = || String::from_utf8_lossy(&self.stderr).trim_end().to_string();
        match self.exit {
            ExitKind::Code(0) => Ok(self.stdout),
            ExitKind::Code(code) => Err(ToolError::NonZeroExit {
                tool: tool.to_string(),
                code,
                stderr: stderr(),
            }),
            ExitKind::Signal(signal) => Err(ToolError::Signaled {
                tool: tool.to_string(),
                signal,
                stderr: stderr(),
            }),
        }
    }
}

/// Starts hook tool processes.
///
/// Implementations run the tool exactly once and report what happened.
/// They never retry.
pub trait ToolRunner {
    /// Runs the invocation to completion.
    ///
    /// # Errors
    ///
    /// Only when the process could not be started: [`ToolError::ToolNotFound`]
    /// or [`ToolError::Spawn`]. Exit status is reported through
    /// [`RawOutput::exit`], not as an error.
    fn execute(&self, invocation: &Invocation) -> Result<RawOutput, ToolError>;
}

impl<T: ToolRunner + ?Sized> ToolRunner for &T {
    fn execute(&self, invocation: &Invocation) -> Result<RawOutput, ToolError> {
        (**self).execute(invocation)
    }
}

impl<T: ToolRunner + ?Sized> ToolRunner for Box<T> {
    fn execute(&self, invocation: &Invocation) -> Result<RawOutput, ToolError> {
        (**self).execute(invocation)
    }
}

/// Runs `invocation` and returns its stdout.
///
/// # Errors
///
/// Any tool invocation failure: not found, spawn failure, non-zero
/// exit, or signal.
pub fn run(runner: &dyn ToolRunner, invocation: &Invocation) -> Result<Vec<u8>, ToolError> {
    debug!(tool = invocation.tool(), argv = ?invocation.argv(), "invoking hook tool");
    let output = runner.execute(invocation)?;
    output.into_stdout(invocation.tool()).inspect_err(|e| {
        warn!(invocation = %invocation, error = %e, "hook tool failed");
    })
}

/// [`ToolRunner`] backed by real subprocesses.
///
/// Stdin is closed; stdout and stderr are captured in full. No timeout
/// is applied, the orchestrator bounds hook run time.
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner {
    tools_dir: Option<PathBuf>,
}

impl ProcessRunner {
    /// Creates a runner that resolves tools through `PATH`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves tools inside `dir` instead of through `PATH`.
    #[must_use]
    pub fn with_tools_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.tools_dir = Some(dir.into());
        self
    }

    fn program(&self, tool: &str) -> PathBuf {
        match &self.tools_dir {
            Some(dir) => dir.join(tool),
            None => PathBuf::from(tool),
        }
    }
}

impl ToolRunner for ProcessRunner {
    fn execute(&self, invocation: &Invocation) -> Result<RawOutput, ToolError> {
        let output = Command::new(self.program(invocation.tool()))
            .args(invocation.argv())
            .stdin(Stdio::null())
            .output()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => ToolError::ToolNotFound {
                    tool: invocation.tool().to_string(),
                },
                _ => ToolError::Spawn {
                    tool: invocation.tool().to_string(),
                    source: e,
                },
            })?;

        Ok(RawOutput {
            exit: ExitKind::from_status(output.status),
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }
}
