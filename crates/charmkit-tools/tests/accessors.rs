//! Accessor behaviour at the command boundary.

use charmkit_tools::testing::{FakeRunner, MapEnv};
use charmkit_tools::{
    config, relation, run, storage, ConfigCache, ConfigDiff, Invocation, MemorySnapshotStore,
    OptionalExt, ProcessRunner, ToolError,
};
use charmkit_types::RelationId;

#[test]
fn list_accessor_returns_fixture_entries_in_order() {
    let runner = FakeRunner::new().with_stdout(["storage-list"], "logs/2\ndata/0\nlogs/2\n");
    let entries = storage::list(&runner, None).unwrap();
    assert_eq!(entries, vec!["logs/2", "data/0", "logs/2"]);
}

#[test]
fn missing_command_is_invocation_failure() {
    let err = run(
        &ProcessRunner::new(),
        &Invocation::new("charmkit-no-such-hook-tool").arg("x"),
    )
    .unwrap_err();
    assert!(err.is_invocation_failure());
    assert!(!matches!(err, ToolError::UnparsableResponse { .. }));
    assert_ne!(err.exit_code(), Some(0));
}

#[test]
fn config_diff_fixture() {
    let runner = FakeRunner::new().with_stdout(
        ["config-get", "--all", "--format=json"],
        r#"{"a":"1","b":"3","c":"4"}"#,
    );
    let store = MemorySnapshotStore::new().with_snapshot(
        "web/0",
        [("a", "1"), ("b", "2")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
    );
    let env = MapEnv::new().with_var("JUJU_UNIT_NAME", "web/0");
    let mut cache = ConfigCache::new(&runner, &env, &store);

    assert_eq!(cache.diff("a").unwrap(), ConfigDiff::Unchanged("1".into()));
    assert_eq!(
        cache.diff("b").unwrap(),
        ConfigDiff::Changed {
            old: "2".into(),
            new: "3".into()
        }
    );
    assert_eq!(cache.diff("c").unwrap(), ConfigDiff::Added("4".into()));
    assert!(matches!(
        cache.diff("d").unwrap_err(),
        ToolError::MissingKey { .. }
    ));
    assert_eq!(cache.changed_keys().unwrap(), vec!["b", "c"]);
}

#[test]
fn optional_config_value_falls_back_to_default() {
    let runner = FakeRunner::new().with_stdout(["config-get", "vhost"], "");
    let vhost = config::get(&runner, "vhost")
        .optional()
        .unwrap()
        .unwrap_or_else(|| "default".into());
    assert_eq!(vhost, "default");
}

#[test]
fn relation_failure_propagates_unchanged() {
    let runner = FakeRunner::new().respond(
        ["relation-ids", "db"],
        charmkit_tools::RawOutput::failure(2, "no relation named db"),
    );
    match relation::ids(&runner, "db").unwrap_err() {
        ToolError::NonZeroExit { tool, code, stderr } => {
            assert_eq!(tool, "relation-ids");
            assert_eq!(code, 2);
            assert_eq!(stderr, "no relation named db");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn relation_reads_are_fresh() {
    let runner = FakeRunner::new().with_stdout(["relation-ids", "db"], "db:1\n");
    relation::ids(&runner, "db").unwrap();
    let again = relation::ids(&runner, "db").unwrap();
    assert_eq!(again, vec![RelationId::new("db", 1)]);
    assert_eq!(runner.call_count("relation-ids"), 2);
}
