//! Dispatch contract: ordering, fail-fast, no-match success, config hand-off.

use charmkit_hook::testing::{call_log, MockHook};
use charmkit_hook::{DispatchError, DispatchOutcome, Dispatcher, HookError, HookRegistry};
use charmkit_tools::testing::{FakeRunner, MapEnv};
use charmkit_tools::{relation, ConfigDiff, MemorySnapshotStore, Snapshot, ToolError};
use std::sync::atomic::Ordering;

fn hook_env(hook: &str) -> MapEnv {
    MapEnv::new()
        .with_var("JUJU_HOOK_NAME", hook)
        .with_var("JUJU_UNIT_NAME", "web/0")
}

fn snapshot(pairs: &[(&str, &str)]) -> Snapshot {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn zero_handlers_is_success_with_nothing_run() {
    let runner = FakeRunner::new();
    let env = hook_env("update-status");
    let store = MemorySnapshotStore::new();

    let mut registry = HookRegistry::new();
    let other = MockHook::ok("install");
    let other_calls = other.counter();
    registry.register("install", other);

    let dispatched = Dispatcher::new(&runner, &env, &store)
        .dispatch(&registry)
        .unwrap();
    assert_eq!(dispatched.outcome(), DispatchOutcome::Unhandled);
    assert_eq!(dispatched.hook().as_str(), "update-status");
    assert_eq!(other_calls.load(Ordering::SeqCst), 0);
    assert!(runner.calls().is_empty());
}

#[test]
fn all_handlers_run_once_in_registration_order() {
    let runner = FakeRunner::new();
    let env = hook_env("config-changed");
    let store = MemorySnapshotStore::new();
    let log = call_log();

    let mut registry = HookRegistry::new();
    let mut counters = Vec::new();
    for label in ["first", "second", "third", "fourth"] {
        let hook = MockHook::ok(label).logging_to(&log);
        counters.push(hook.counter());
        registry.register("config-changed", hook);
    }

    let dispatched = Dispatcher::new(&runner, &env, &store)
        .dispatch(&registry)
        .unwrap();
    assert_eq!(dispatched.outcome(), DispatchOutcome::Handled { handlers: 4 });
    assert_eq!(*log.lock(), vec!["first", "second", "third", "fourth"]);
    for counter in counters {
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }
}

#[test]
fn failing_handler_stops_dispatch() {
    let runner = FakeRunner::new();
    let env = hook_env("install");
    let store = MemorySnapshotStore::new();
    let log = call_log();

    let mut registry = HookRegistry::new();
    registry
        .register("install", MockHook::ok("one").logging_to(&log))
        .register("install", MockHook::failing("two", "package mirror unreachable").logging_to(&log))
        .register("install", MockHook::ok("three").logging_to(&log))
        .register("install", MockHook::ok("four").logging_to(&log));

    let err = Dispatcher::new(&runner, &env, &store)
        .dispatch(&registry)
        .unwrap_err();
    match &err {
        DispatchError::HandlerFailed { hook, index, source } => {
            assert_eq!(hook.as_str(), "install");
            assert_eq!(*index, 1);
            assert_eq!(source.to_string(), "package mirror unreachable");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(err.exit_code(), 1);
    assert_eq!(*log.lock(), vec!["one", "two"]);
}

#[test]
fn missing_hook_name_is_invalid_context() {
    let runner = FakeRunner::new();
    let env = MapEnv::new();
    let store = MemorySnapshotStore::new();
    let mut registry = HookRegistry::new();
    let hook = MockHook::ok("any");
    let calls = hook.counter();
    registry.register_default(hook);

    let err = Dispatcher::new(&runner, &env, &store)
        .dispatch(&registry)
        .unwrap_err();
    assert!(matches!(err, DispatchError::InvalidInvocationContext { .. }));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn blank_registration_fails_every_dispatch() {
    let runner = FakeRunner::new();
    let env = hook_env("install");
    let store = MemorySnapshotStore::new();
    let mut registry = HookRegistry::new();
    let install = MockHook::ok("install");
    let calls = install.counter();
    registry
        .register("install", install)
        .register("  ", MockHook::ok("typo"));

    let err = Dispatcher::new(&runner, &env, &store)
        .dispatch(&registry)
        .unwrap_err();
    assert!(matches!(err, DispatchError::InvalidRegistration { ref names } if names.len() == 1 && names[0] == "  "));
    assert_eq!(err.exit_code(), 1);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert!(runner.calls().is_empty());
}

#[test]
fn accessor_failure_surfaces_as_handler_failure() {
    let runner = FakeRunner::new().missing("relation-ids");
    let env = hook_env("db-relation-changed");
    let store = MemorySnapshotStore::new();

    let mut registry = HookRegistry::new();
    registry.on("db-relation-changed", |ctx| {
        relation::ids(ctx.runner(), "db")?;
        Ok(())
    });

    let err = Dispatcher::new(&runner, &env, &store)
        .dispatch(&registry)
        .unwrap_err();
    let DispatchError::HandlerFailed { source, .. } = err else {
        panic!("expected HandlerFailed");
    };
    assert!(matches!(
        source,
        HookError::Tool(ToolError::ToolNotFound { .. })
    ));
}

#[test]
fn handlers_share_one_config_fetch_and_commit_persists() {
    let runner = FakeRunner::new().with_stdout(
        ["config-get", "--all", "--format=json"],
        r#"{"a":"1","b":"3","c":"4"}"#,
    );
    let env = hook_env("config-changed");
    let store = MemorySnapshotStore::new().with_snapshot("web/0", snapshot(&[("a", "1"), ("b", "2")]));

    let mut registry = HookRegistry::new();
    registry
        .on("config-changed", |ctx| {
            assert_eq!(ctx.config().diff("a")?, ConfigDiff::Unchanged("1".into()));
            Ok(())
        })
        .on("config-changed", |ctx| {
            assert_eq!(
                ctx.config().diff("b")?,
                ConfigDiff::Changed {
                    old: "2".into(),
                    new: "3".into()
                }
            );
            assert_eq!(ctx.config().diff("c")?, ConfigDiff::Added("4".into()));
            Ok(())
        });

    let mut dispatched = Dispatcher::new(&runner, &env, &store)
        .dispatch(&registry)
        .unwrap();
    assert_eq!(runner.call_count("config-get"), 1);
    assert_eq!(store.save_count(), 0);

    dispatched.commit().unwrap();
    assert_eq!(store.get("web/0"), Some(snapshot(&[("a", "1"), ("b", "3"), ("c", "4")])));
    assert_eq!(runner.call_count("config-get"), 1);
}

#[test]
fn failed_dispatch_leaves_snapshot_untouched() {
    let runner = FakeRunner::new().with_stdout(["config-get", "--all", "--format=json"], r#"{"a":"9"}"#);
    let env = hook_env("config-changed");
    let store = MemorySnapshotStore::new().with_snapshot("web/0", snapshot(&[("a", "1")]));

    let mut registry = HookRegistry::new();
    registry.on("config-changed", |ctx| {
        ctx.config().get("a")?;
        Err(HookError::failed("refusing new value"))
    });

    assert!(Dispatcher::new(&runner, &env, &store)
        .dispatch(&registry)
        .is_err());
    assert_eq!(store.get("web/0"), Some(snapshot(&[("a", "1")])));
    assert_eq!(store.save_count(), 0);
}

#[test]
fn default_handler_runs_for_unregistered_hooks() {
    let runner = FakeRunner::new();
    let env = hook_env("leader-elected");
    let store = MemorySnapshotStore::new();
    let log = call_log();

    let mut registry = HookRegistry::new();
    registry
        .register("install", MockHook::ok("install").logging_to(&log))
        .register_default(MockHook::ok("fallback").logging_to(&log));

    let dispatched = Dispatcher::new(&runner, &env, &store)
        .dispatch(&registry)
        .unwrap();
    assert_eq!(dispatched.outcome().handlers(), 1);
    assert_eq!(*log.lock(), vec!["fallback"]);
}

#[test]
fn handlers_see_the_state_dir() {
    let runner = FakeRunner::new();
    let env = hook_env("install");
    let store = MemorySnapshotStore::new();
    let mut registry = HookRegistry::new();
    registry.on("install", |ctx| {
        if ctx.state_dir() != Some(std::path::Path::new("/var/lib/charm-state")) {
            return Err(HookError::failed(format!("state dir {:?}", ctx.state_dir())));
        }
        Ok(())
    });

    Dispatcher::new(&runner, &env, &store)
        .with_state_dir("/var/lib/charm-state")
        .dispatch(&registry)
        .unwrap();
}
