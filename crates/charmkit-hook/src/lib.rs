//! Hook registry and dispatcher for charm lifecycle events.
//!
//! # Crate Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  charmkit-tools : ToolRunner, accessors, ConfigCache        │
//! └─────────────────────────────────────────────────────────────┘
//!           ↕
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Hook Layer                  ◄── HERE   │
//! ├─────────────────────────────────────────────────────────────┤
//! │  charmkit-hook : Hook trait, HookRegistry, Dispatcher       │
//! └─────────────────────────────────────────────────────────────┘
//!           ↕
//! ┌─────────────────────────────────────────────────────────────┐
//! │  charmkit : CharmApp (config, logging, exit status)         │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Overview
//!
//! The orchestrator starts the charm once per lifecycle event. The
//! [`Dispatcher`] works out which event that is, looks it up in the
//! [`HookRegistry`], and runs the registered [`Hook`]s in registration
//! order, stopping at the first failure.
//!
//! # Example
//!
//! ```
//! use charmkit_hook::{DispatchOutcome, Dispatcher, HookRegistry};
//! use charmkit_tools::testing::{FakeRunner, MapEnv};
//! use charmkit_tools::MemorySnapshotStore;
//!
//! let runner = FakeRunner::new();
//! let env = MapEnv::new().with_var("JUJU_HOOK_NAME", "install");
//! let store = MemorySnapshotStore::new();
//!
//! let mut registry = HookRegistry::new();
//! registry.on("install", |ctx| {
//!     assert_eq!(ctx.hook().as_str(), "install");
//!     Ok(())
//! });
//!
//! let dispatched = Dispatcher::new(&runner, &env, &store)
//!     .dispatch(&registry)
//!     .unwrap();
//! assert_eq!(dispatched.outcome(), DispatchOutcome::Handled { handlers: 1 });
//! ```

mod context;
mod dispatch;
mod error;
pub mod hook;
mod registry;

pub use context::HookContext;
pub use dispatch::{resolve_hook_name, DispatchOutcome, Dispatched, Dispatcher};
pub use error::{DispatchError, HookError};
pub use hook::Hook;
pub use registry::{HookRegistry, SharedHook};

// Re-export testing utilities
#[cfg(any(test, feature = "test-utils"))]
pub mod testing {
    //! Test utilities for the hook system.
    //!
    //! Provides [`MockHook`] and a shared [`CallLog`] for ordering checks.
    pub use crate::hook::testing::{call_log, CallLog, MockHook};
}
