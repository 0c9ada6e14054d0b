//! Config snapshots committed through the file store across simulated hook runs.

use charmkit_runtime::LocalSnapshotStore;
use charmkit_tools::testing::{FakeRunner, MapEnv};
use charmkit_tools::{ConfigCache, ConfigDiff, SnapshotStore};
use tempfile::TempDir;

const CONFIG_ALL: [&str; 3] = ["config-get", "--all", "--format=json"];

fn unit_env() -> MapEnv {
    MapEnv::new().with_var("JUJU_UNIT_NAME", "web/0")
}

#[test]
fn first_run_sees_everything_as_added() {
    let temp = TempDir::new().unwrap();
    let store = LocalSnapshotStore::new(temp.path());
    let runner = FakeRunner::new().with_stdout(CONFIG_ALL, r#"{"port":8080}"#);
    let env = unit_env();

    let mut cache = ConfigCache::new(&runner, &env, &store);
    assert!(!cache.has_previous().unwrap());
    assert_eq!(cache.diff("port").unwrap(), ConfigDiff::Added("8080".into()));
    assert_eq!(cache.changed_keys().unwrap(), vec!["port".to_string()]);
}

#[test]
fn committed_snapshot_is_next_runs_previous() {
    let temp = TempDir::new().unwrap();
    let env = unit_env();

    {
        let store = LocalSnapshotStore::new(temp.path());
        let runner = FakeRunner::new().with_stdout(CONFIG_ALL, r#"{"a":"1","b":"2"}"#);
        let mut cache = ConfigCache::new(&runner, &env, &store);
        cache.commit().unwrap();
        cache.commit().unwrap();
        assert_eq!(runner.call_count("config-get"), 1);
    }

    let store = LocalSnapshotStore::new(temp.path());
    let runner = FakeRunner::new().with_stdout(CONFIG_ALL, r#"{"a":"1","b":"3","c":"4"}"#);
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
    assert_eq!(cache.changed_keys().unwrap(), vec!["b".to_string(), "c".to_string()]);
}

#[test]
fn uncommitted_run_does_not_move_previous() {
    let temp = TempDir::new().unwrap();
    let store = LocalSnapshotStore::new(temp.path());
    let env = unit_env();

    let first = FakeRunner::new().with_stdout(CONFIG_ALL, r#"{"a":"1"}"#);
    ConfigCache::new(&first, &env, &store).commit().unwrap();

    let second = FakeRunner::new().with_stdout(CONFIG_ALL, r#"{"a":"2"}"#);
    let mut cache = ConfigCache::new(&second, &env, &store);
    assert!(cache.changed("a").unwrap());
    drop(cache);

    let stored = store.load("web/0").unwrap().unwrap();
    assert_eq!(stored.get("a").map(String::as_str), Some("1"));
}

#[test]
fn corrupt_store_surfaces_as_tool_error() {
    let temp = TempDir::new().unwrap();
    let store = LocalSnapshotStore::new(temp.path());
    std::fs::write(store.path(), b"[]").unwrap();

    let runner = FakeRunner::new().with_stdout(CONFIG_ALL, r#"{"a":"1"}"#);
    let env = unit_env();
    let mut cache = ConfigCache::new(&runner, &env, &store);

    assert!(cache.previous("a").is_err());
    assert!(cache.commit().is_err());
}
