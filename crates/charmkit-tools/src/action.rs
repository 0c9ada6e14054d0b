//! Actions (`action-get`, `action-set`, `action-fail`, `action-log`).

use crate::env::{self, vars, HookEnv};
use crate::executor::{run, Invocation, ToolRunner};
use crate::{parse, ToolError};
use std::collections::BTreeMap;

const ACTION_GET: &str = "action-get";
const ACTION_SET: &str = "action-set";
const ACTION_FAIL: &str = "action-fail";
const ACTION_LOG: &str = "action-log";

/// Name of the running action.
///
/// # Errors
///
/// `MissingEnvironment` outside an action.
pub fn name(env: &dyn HookEnv) -> Result<String, ToolError> {
    env::required(env, vars::JUJU_ACTION_NAME)
}

/// Id of the running action.
///
/// # Errors
///
/// `MissingEnvironment` outside an action.
pub fn uuid(env: &dyn HookEnv) -> Result<String, ToolError> {
    env::required(env, vars::JUJU_ACTION_UUID)
}

/// Tag of the running action.
///
/// # Errors
///
/// `MissingEnvironment` outside an action.
pub fn tag(env: &dyn HookEnv) -> Result<String, ToolError> {
    env::required(env, vars::JUJU_ACTION_TAG)
}

/// One action parameter. Nested parameters use dotted keys (`a.b`).
///
/// # Errors
///
/// `MissingValue` if the parameter is unset, or any invocation failure.
pub fn get(runner: &dyn ToolRunner, key: &str) -> Result<String, ToolError> {
    let out = run(runner, &Invocation::new(ACTION_GET).arg(key))?;
    parse::scalar(ACTION_GET, &out)
}

/// All top-level action parameters.
///
/// # Errors
///
/// `UnparsableResponse` if a parameter is not a scalar, or any
/// invocation failure.
pub fn get_all(runner: &dyn ToolRunner) -> Result<BTreeMap<String, String>, ToolError> {
    let out = run(runner, &Invocation::new(ACTION_GET).arg("--format=json"))?;
    parse::map(ACTION_GET, &out)
}

/// Records action results.
///
/// # Errors
///
/// `InvalidArgument` for a bad key, or any invocation failure.
pub fn set<I, K, V>(runner: &dyn ToolRunner, results: I) -> Result<(), ToolError>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let pairs = parse::encode_pairs(ACTION_SET, results)?;
    if pairs.is_empty() {
        return Ok(());
    }
    run(runner, &Invocation::new(ACTION_SET).args(pairs))?;
    Ok(())
}

/// Marks the action failed. The hook process itself still exits 0.
///
/// # Errors
///
/// Any invocation failure.
pub fn fail(runner: &dyn ToolRunner, message: &str) -> Result<(), ToolError> {
    run(runner, &Invocation::new(ACTION_FAIL).arg(message))?;
    Ok(())
}

/// Streams a progress message to the operator.
///
/// # Errors
///
/// Any invocation failure.
pub fn log(runner: &dyn ToolRunner, message: &str) -> Result<(), ToolError> {
    run(runner, &Invocation::new(ACTION_LOG).arg(message))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeRunner, MapEnv};

    #[test]
    fn identity_from_env() {
        let env = MapEnv::new()
            .with_var(vars::JUJU_ACTION_NAME, "backup")
            .with_var(vars::JUJU_ACTION_UUID, "a1b2")
            .with_var(vars::JUJU_ACTION_TAG, "action-a1b2");
        assert_eq!(name(&env).unwrap(), "backup");
        assert_eq!(uuid(&env).unwrap(), "a1b2");
        assert_eq!(tag(&env).unwrap(), "action-a1b2");
    }

    #[test]
    fn outside_action_is_missing_environment() {
        let err = name(&MapEnv::new()).unwrap_err();
        assert!(matches!(err, ToolError::MissingEnvironment { ref name } if name == "JUJU_ACTION_NAME"));
    }

    #[test]
    fn params_and_results() {
        let runner = FakeRunner::new()
            .with_stdout(["action-get", "--format=json"], r#"{"target":"s3","compress":true}"#)
            .with_stdout(["action-get", "target"], "s3\n")
            .with_ok(["action-set", "path=/backups/1.tar"])
            .with_ok(["action-log", "uploading"]);

        let params = get_all(&runner).unwrap();
        assert_eq!(params["compress"], "true");
        assert_eq!(get(&runner, "target").unwrap(), "s3");
        log(&runner, "uploading").unwrap();
        set(&runner, [("path", "/backups/1.tar")]).unwrap();
        assert_eq!(runner.calls().len(), 4);
    }

    #[test]
    fn fail_passes_message() {
        let runner = FakeRunner::new().with_ok(["action-fail", "bucket unreachable"]);
        fail(&runner, "bucket unreachable").unwrap();
        assert!(runner.was_called(["action-fail", "bucket unreachable"]));
    }
}
