//! Leadership (`is-leader`, `leader-get`, `leader-set`).
//!
//! Leadership can change between hook runs, so nothing here is cached.

use crate::executor::{run, Invocation, ToolRunner};
use crate::{parse, ToolError};
use std::collections::BTreeMap;

const IS_LEADER: &str = "is-leader";
const LEADER_GET: &str = "leader-get";
const LEADER_SET: &str = "leader-set";

/// Leadership flag plus the application-wide leader settings.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LeadershipState {
    /// Whether this unit currently holds leadership.
    pub is_leader: bool,
    /// Settings published by the leader.
    pub settings: BTreeMap<String, String>,
}

/// Asks whether this unit is the leader.
///
/// # Errors
///
/// `UnparsableResponse` for anything other than a boolean, or any
/// invocation failure.
pub fn is_leader(runner: &dyn ToolRunner) -> Result<bool, ToolError> {
    let out = run(runner, &Invocation::new(IS_LEADER))?;
    parse::boolean(IS_LEADER, &out)
}

/// Reads one leader setting.
///
/// # Errors
///
/// `MissingValue` if unset, or any invocation failure.
pub fn get(runner: &dyn ToolRunner, key: &str) -> Result<String, ToolError> {
    let out = run(runner, &Invocation::new(LEADER_GET).arg(key))?;
    parse::scalar(LEADER_GET, &out)
}

/// Reads all leader settings.
///
/// # Errors
///
/// `UnparsableResponse` for a non-flat map, or any invocation failure.
pub fn get_all(runner: &dyn ToolRunner) -> Result<BTreeMap<String, String>, ToolError> {
    let out = run(runner, &Invocation::new(LEADER_GET).arg("--format=json"))?;
    parse::map(LEADER_GET, &out)
}

/// Publishes leader settings. Only the leader may call this; the
/// orchestrator rejects it otherwise and the failure is returned.
///
/// # Errors
///
/// `InvalidArgument` for a bad key, or any invocation failure.
pub fn set<I, K, V>(runner: &dyn ToolRunner, settings: I) -> Result<(), ToolError>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let pairs = parse::encode_pairs(LEADER_SET, settings)?;
    if pairs.is_empty() {
        return Ok(());
    }
    run(runner, &Invocation::new(LEADER_SET).args(pairs))?;
    Ok(())
}

/// Reads the flag and the settings with two fresh calls.
///
/// # Errors
///
/// The first failure of either call.
pub fn state(runner: &dyn ToolRunner) -> Result<LeadershipState, ToolError> {
    Ok(LeadershipState {
        is_leader: is_leader(runner)?,
        settings: get_all(runner)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeRunner;

    #[test]
    fn is_leader_parses_python_bool() {
        let runner = FakeRunner::new().with_stdout(["is-leader"], "True\n");
        assert!(is_leader(&runner).unwrap());
    }

    #[test]
    fn is_leader_unknown_output_is_unparsable() {
        let runner = FakeRunner::new().with_stdout(["is-leader"], "perhaps\n");
        assert!(matches!(
            is_leader(&runner).unwrap_err(),
            ToolError::UnparsableResponse { .. }
        ));
    }

    #[test]
    fn leadership_not_cached() {
        let runner = FakeRunner::new().with_stdout(["is-leader"], "False");
        is_leader(&runner).unwrap();
        is_leader(&runner).unwrap();
        assert_eq!(runner.call_count("is-leader"), 2);
    }

    #[test]
    fn state_combines_both_reads() {
        let runner = FakeRunner::new()
            .with_stdout(["is-leader"], "True")
            .with_stdout(["leader-get", "--format=json"], r#"{"admin-password":"s3cret"}"#);
        let state = state(&runner).unwrap();
        assert!(state.is_leader);
        assert_eq!(state.settings["admin-password"], "s3cret");
    }

    #[test]
    fn set_rejected_by_orchestrator() {
        let runner = FakeRunner::new().respond(
            ["leader-set", "k=v"],
            crate::RawOutput::failure(1, "cannot write leadership settings: not the leader"),
        );
        let err = set(&runner, [("k", "v")]).unwrap_err();
        assert_eq!(err.exit_code(), Some(1));
    }
}
