//! Typed access to orchestrator state through hook tools.
//!
//! A charm learns about its world only by running the orchestrator's
//! hook tools (`config-get`, `relation-get`, `status-set`, ...) and
//! reading their output. This crate turns those invocations into typed
//! calls.
//!
//! # Crate Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  charmkit-types : HookName, UnitName, RelationId, ErrorCode │
//! └─────────────────────────────────────────────────────────────┘
//!           ↕
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Tools Layer                  ◄── HERE   │
//! ├─────────────────────────────────────────────────────────────┤
//! │  executor  : ToolRunner, ProcessRunner, run                 │
//! │  parse     : scalar / list / map shapes                     │
//! │  accessors : config, relation, leader, status, metrics,     │
//! │              storage, network, action, unit                 │
//! │  config    : ConfigCache (per-run diff against last commit) │
//! └─────────────────────────────────────────────────────────────┘
//!           ↕
//! ┌─────────────────────────────────────────────────────────────┐
//! │  charmkit-hook : Hook, HookRegistry, Dispatcher             │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Failure model
//!
//! Every accessor returns either a fully typed value or a [`ToolError`].
//! Nothing is retried and nothing is silently defaulted; a handler that
//! wants a default for an unset value uses [`OptionalExt::optional`].
//!
//! # Example
//!
//! ```
//! use charmkit_tools::testing::FakeRunner;
//! use charmkit_tools::{leader, status, StatusRecord};
//!
//! let runner = FakeRunner::new()
//!     .with_stdout(["is-leader"], "True\n")
//!     .with_ok(["status-set", "active", "leading"]);
//!
//! if leader::is_leader(&runner).unwrap() {
//!     status::set(&runner, &StatusRecord::active("leading")).unwrap();
//! }
//! assert_eq!(runner.call_count("status-set"), 1);
//! ```

mod error;
mod executor;
pub mod parse;

pub mod action;
pub mod config;
pub mod env;
pub mod leader;
pub mod metrics;
pub mod network;
pub mod relation;
pub mod snapshot;
pub mod status;
pub mod storage;
pub mod unit;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use config::{ConfigCache, ConfigDiff};
pub use env::{HookEnv, ProcessEnv, UnitContext};
pub use error::{OptionalExt, StoreError, ToolError};
pub use executor::{run, ExitKind, Invocation, ProcessRunner, RawOutput, ToolRunner};
pub use leader::LeadershipState;
pub use metrics::{MeterStatus, MetricSample};
pub use network::{NetworkAddress, Port, Protocol};
pub use relation::RelationData;
pub use snapshot::{MemorySnapshotStore, Snapshot, SnapshotStore};
pub use status::{StatusRecord, WorkloadState};
pub use storage::StorageInstance;
pub use unit::LogLevel;
