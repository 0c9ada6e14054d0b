//! Metrics (`add-metric`) and meter status.
//!
//! `add-metric` is only accepted during `collect-metrics`; outside it the
//! orchestrator fails the call and the failure is returned unchanged.

use crate::env::{self, vars, HookEnv};
use crate::executor::{run, Invocation, ToolRunner};
use crate::{parse, ToolError};

const ADD_METRIC: &str = "add-metric";

/// One metric reading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricSample {
    pub key: String,
    pub value: String,
}

impl MetricSample {
    /// Creates a sample, rendering `value` with `ToString`.
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl ToString) -> Self {
        Self {
            key: key.into(),
            value: value.to_string(),
        }
    }
}

/// Records samples in one `add-metric` call.
///
/// # Errors
///
/// `InvalidArgument` for an empty batch or a bad key, or any invocation
/// failure.
pub fn add(runner: &dyn ToolRunner, samples: &[MetricSample]) -> Result<(), ToolError> {
    if samples.is_empty() {
        return Err(ToolError::invalid_argument(ADD_METRIC, "no samples"));
    }
    let pairs = parse::encode_pairs(
        ADD_METRIC,
        samples.iter().map(|s| (s.key.as_str(), s.value.as_str())),
    )?;
    run(runner, &Invocation::new(ADD_METRIC).args(pairs))?;
    Ok(())
}

/// Meter status passed to `meter-status-changed`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeterStatus {
    /// Status code such as `GREEN`, `AMBER`, `RED`.
    pub status: String,
    /// Optional detail.
    pub info: Option<String>,
}

impl MeterStatus {
    /// Reads `JUJU_METER_STATUS` and `JUJU_METER_INFO`.
    ///
    /// # Errors
    ///
    /// `MissingEnvironment` outside `meter-status-changed`.
    pub fn from_env(env: &dyn HookEnv) -> Result<Self, ToolError> {
        Ok(Self {
            status: env::required(env, vars::JUJU_METER_STATUS)?,
            info: env::optional(env, vars::JUJU_METER_INFO),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeRunner, MapEnv};

    #[test]
    fn add_batches_samples() {
        let runner = FakeRunner::new().with_ok(["add-metric", "users=42", "load=0.5"]);
        add(
            &runner,
            &[MetricSample::new("users", 42), MetricSample::new("load", 0.5)],
        )
        .unwrap();
        assert_eq!(runner.call_count("add-metric"), 1);
    }

    #[test]
    fn add_empty_batch_rejected() {
        let runner = FakeRunner::new();
        assert!(add(&runner, &[]).is_err());
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn add_outside_collect_metrics_fails() {
        let runner = FakeRunner::new().respond(
            ["add-metric", "users=1"],
            crate::RawOutput::failure(1, "cannot record metric: not in collect-metrics"),
        );
        let err = add(&runner, &[MetricSample::new("users", 1)]).unwrap_err();
        assert!(err.is_invocation_failure());
    }

    #[test]
    fn meter_status_from_env() {
        let env = MapEnv::new()
            .with_var(vars::JUJU_METER_STATUS, "AMBER")
            .with_var(vars::JUJU_METER_INFO, "trial expiring");
        let status = MeterStatus::from_env(&env).unwrap();
        assert_eq!(status.status, "AMBER");
        assert_eq!(status.info.as_deref(), Some("trial expiring"));

        assert!(MeterStatus::from_env(&MapEnv::new()).unwrap_err().is_environment());
    }
}
