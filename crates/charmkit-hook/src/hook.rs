//! Hook trait and testing utilities.

use crate::{HookContext, HookError};

/// A handler for one or more lifecycle events.
///
/// Handlers are registered with the [`HookRegistry`](crate::HookRegistry)
/// and run by the [`Dispatcher`](crate::Dispatcher) in registration
/// order. A handler runs to completion or failure; it is never
/// cancelled or retried.
///
/// Any `Fn(&mut HookContext<'_>) -> Result<(), HookError>` is a hook:
///
/// ```
/// use charmkit_hook::{Hook, HookContext, HookError};
///
/// fn install(ctx: &mut HookContext<'_>) -> Result<(), HookError> {
///     let _port = ctx.config().get("port")?;
///     Ok(())
/// }
///
/// fn assert_hook(_: impl Hook) {}
/// assert_hook(install);
/// ```
pub trait Hook {
    /// Label used in logs. Defaults to the type name.
    fn label(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Runs the handler.
    ///
    /// # Errors
    ///
    /// Any [`HookError`]; dispatch stops at the first one.
    fn execute(&self, ctx: &mut HookContext<'_>) -> Result<(), HookError>;
}

impl<F> Hook for F
where
    F: Fn(&mut HookContext<'_>) -> Result<(), HookError>,
{
    fn execute(&self, ctx: &mut HookContext<'_>) -> Result<(), HookError> {
        self(ctx)
    }
}

/// Test utilities for the hook system.
#[cfg(any(test, feature = "test-utils"))]
pub mod testing {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Shared record of which mock hooks ran, in order.
    pub type CallLog = Arc<Mutex<Vec<String>>>;

    /// Creates an empty [`CallLog`].
    #[must_use]
    pub fn call_log() -> CallLog {
        Arc::new(Mutex::new(Vec::new()))
    }

    type Action = Box<dyn Fn(&mut HookContext<'_>) -> Result<(), HookError>>;

    /// A mock hook for testing.
    ///
    /// Counts invocations, optionally appends its label to a shared
    /// [`CallLog`], and returns a scripted result.
    pub struct MockHook {
        /// Label written to the call log.
        pub label: String,
        /// Runs on every execute() call.
        pub action: Action,
        /// Number of times execute() has been called.
        pub call_count: Arc<AtomicUsize>,
        /// Shared ordering log.
        pub log: Option<CallLog>,
    }

    impl MockHook {
        /// Creates a mock that succeeds without touching the context.
        pub fn ok(label: &str) -> Self {
            Self::with_action(label, |_ctx| Ok(()))
        }

        /// Creates a mock that fails with the given message.
        pub fn failing(label: &str, message: &str) -> Self {
            let message = message.to_string();
            Self::with_action(label, move |_ctx| Err(HookError::failed(message.clone())))
        }

        /// Creates a mock that runs `action`.
        pub fn with_action(
            label: &str,
            action: impl Fn(&mut HookContext<'_>) -> Result<(), HookError> + 'static,
        ) -> Self {
            Self {
                label: label.to_string(),
                action: Box::new(action),
                call_count: Arc::new(AtomicUsize::new(0)),
                log: None,
            }
        }

        /// Records each call into `log`.
        #[must_use]
        pub fn logging_to(mut self, log: &CallLog) -> Self {
            self.log = Some(Arc::clone(log));
            self
        }

        /// Returns a handle to the call counter that outlives registration.
        #[must_use]
        pub fn counter(&self) -> Arc<AtomicUsize> {
            Arc::clone(&self.call_count)
        }

        /// Returns the number of times this hook has been executed.
        pub fn calls(&self) -> usize {
            self.call_count.load(Ordering::SeqCst)
        }
    }

    impl Hook for MockHook {
        fn label(&self) -> &str {
            &self.label
        }

        fn execute(&self, ctx: &mut HookContext<'_>) -> Result<(), HookError> {
            self.call_count.fetch_add(1, Ordering::SeqCst);
            if let Some(log) = &self.log {
                log.lock().push(self.label.clone());
            }
            (self.action)(ctx)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{call_log, MockHook};
    use super::*;
    use charmkit_tools::testing::{FakeRunner, MapEnv};
    use charmkit_tools::{ConfigCache, MemorySnapshotStore};
    use charmkit_types::HookName;

    fn with_ctx(f: impl FnOnce(&mut HookContext<'_>)) {
        let runner = FakeRunner::new();
        let env = MapEnv::new();
        let store = MemorySnapshotStore::new();
        let config = ConfigCache::new(&runner, &env, &store);
        let mut ctx = HookContext::new(HookName::new("install").unwrap(), &runner, &env, config);
        f(&mut ctx);
    }

    #[test]
    fn mock_ok_counts_and_logs() {
        let log = call_log();
        let hook = MockHook::ok("first").logging_to(&log);
        with_ctx(|ctx| {
            hook.execute(ctx).unwrap();
            hook.execute(ctx).unwrap();
        });
        assert_eq!(hook.calls(), 2);
        assert_eq!(*log.lock(), vec!["first", "first"]);
    }

    #[test]
    fn mock_failing() {
        let hook = MockHook::failing("broken", "no disk");
        with_ctx(|ctx| {
            let err = hook.execute(ctx).unwrap_err();
            assert_eq!(err.to_string(), "no disk");
        });
        assert_eq!(hook.label(), "broken");
    }

    #[test]
    fn fn_items_are_hooks() {
        fn install(ctx: &mut HookContext<'_>) -> Result<(), HookError> {
            assert_eq!(ctx.hook().as_str(), "install");
            Ok(())
        }
        with_ctx(|ctx| install.execute(ctx).unwrap());
        assert!(install.label().contains("install"));
    }
}
