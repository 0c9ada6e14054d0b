//! Workload status (`status-set`, `status-get`).

use crate::executor::{run, Invocation, ToolRunner};
use crate::{parse, ToolError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const STATUS_SET: &str = "status-set";
const STATUS_GET: &str = "status-get";
const APPLICATION_VERSION_SET: &str = "application-version-set";

/// Workload state reported to the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkloadState {
    /// The unit is busy with setup or upgrade work.
    Maintenance,
    /// Operator intervention is required.
    Blocked,
    /// Waiting on something outside the operator's control.
    Waiting,
    /// Running normally.
    Active,
    /// Not reported yet. Read-only: the orchestrator rejects setting it.
    Unknown,
    /// A hook failed. Read-only: set by the orchestrator.
    Error,
}

impl WorkloadState {
    /// The wire spelling.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Maintenance => "maintenance",
            Self::Blocked => "blocked",
            Self::Waiting => "waiting",
            Self::Active => "active",
            Self::Unknown => "unknown",
            Self::Error => "error",
        }
    }

    /// Returns `true` for states a unit may set itself.
    #[must_use]
    pub const fn is_settable(self) -> bool {
        !matches!(self, Self::Unknown | Self::Error)
    }
}

impl fmt::Display for WorkloadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkloadState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "maintenance" => Ok(Self::Maintenance),
            "blocked" => Ok(Self::Blocked),
            "waiting" => Ok(Self::Waiting),
            "active" => Ok(Self::Active),
            "unknown" => Ok(Self::Unknown),
            "error" => Ok(Self::Error),
            other => Err(format!("unknown workload state '{other}'")),
        }
    }
}

/// A workload state with its message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusRecord {
    #[serde(rename = "status")]
    pub state: WorkloadState,
    #[serde(default)]
    pub message: String,
}

impl StatusRecord {
    #[must_use]
    pub fn new(state: WorkloadState, message: impl Into<String>) -> Self {
        Self {
            state,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn maintenance(message: impl Into<String>) -> Self {
        Self::new(WorkloadState::Maintenance, message)
    }

    #[must_use]
    pub fn blocked(message: impl Into<String>) -> Self {
        Self::new(WorkloadState::Blocked, message)
    }

    #[must_use]
    pub fn waiting(message: impl Into<String>) -> Self {
        Self::new(WorkloadState::Waiting, message)
    }

    #[must_use]
    pub fn active(message: impl Into<String>) -> Self {
        Self::new(WorkloadState::Active, message)
    }
}

/// Reports the workload status.
///
/// # Errors
///
/// `InvalidArgument` for a state the unit cannot set, or any invocation
/// failure.
pub fn set(runner: &dyn ToolRunner, record: &StatusRecord) -> Result<(), ToolError> {
    if !record.state.is_settable() {
        return Err(ToolError::invalid_argument(
            STATUS_SET,
            format!("state '{}' cannot be set by a unit", record.state),
        ));
    }
    run(
        runner,
        &Invocation::new(STATUS_SET)
            .arg(record.state.as_str())
            .arg(record.message.as_str()),
    )?;
    Ok(())
}

/// Reads the workload status back.
///
/// # Errors
///
/// `UnparsableResponse` if the answer lacks a known status, or any
/// invocation failure.
pub fn get(runner: &dyn ToolRunner) -> Result<StatusRecord, ToolError> {
    let out = run(
        runner,
        &Invocation::new(STATUS_GET).args(["--format=json", "--include-data"]),
    )?;
    parse::json(STATUS_GET, &out)
}

/// Reports the workload version shown next to the application.
///
/// # Errors
///
/// Any invocation failure.
pub fn application_version_set(runner: &dyn ToolRunner, version: &str) -> Result<(), ToolError> {
    run(runner, &Invocation::new(APPLICATION_VERSION_SET).arg(version))?;
    Ok(())
}
