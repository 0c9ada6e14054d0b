//! Write charm hooks in Rust.
//!
//! # Crate Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  charmkit : CharmApp, logging, AppError          ◄── HERE   │
//! └─────────────────────────────────────────────────────────────┘
//!           ↕
//! ┌─────────────────────────────────────────────────────────────┐
//! │  charmkit-hook    : HookRegistry, Dispatcher, HookContext   │
//! │  charmkit-runtime : RuntimeConfig, LocalSnapshotStore,      │
//! │                     UnitData                                │
//! └─────────────────────────────────────────────────────────────┘
//!           ↕
//! ┌─────────────────────────────────────────────────────────────┐
//! │  charmkit-tools : ToolRunner, state accessors, ConfigCache  │
//! │  charmkit-types : HookName, UnitName, ErrorCode             │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```no_run
//! use charmkit::prelude::*;
//!
//! fn config_changed(ctx: &mut HookContext<'_>) -> Result<(), HookError> {
//!     if ctx.config().changed("port")? {
//!         let port = ctx.config().get("port")?;
//!         status::set(ctx.runner(), &StatusRecord::maintenance(format!("moving to {port}")))?;
//!     }
//!     Ok(())
//! }
//!
//! fn main() -> std::process::ExitCode {
//!     CharmApp::builder()
//!         .hook("config-changed", config_changed)
//!         .build()
//!         .run()
//! }
//! ```

mod app;
mod error;
pub mod logging;

pub use app::{unit_data, CharmApp, CharmAppBuilder};
pub use error::AppError;

pub use charmkit_hook as hook;
pub use charmkit_runtime as runtime;
pub use charmkit_tools as tools;
pub use charmkit_types as types;

/// Common imports for handler code.
pub mod prelude {
    pub use crate::{unit_data, AppError, CharmApp};
    pub use charmkit_hook::{DispatchOutcome, Hook, HookContext, HookError, HookRegistry};
    pub use charmkit_runtime::UnitData;
    pub use charmkit_tools::{
        action, config, leader, metrics, network, relation, status, storage, unit, ConfigDiff,
        OptionalExt, Port, StatusRecord, ToolError, WorkloadState,
    };
    pub use charmkit_types::HookName;
}

#[cfg(any(test, feature = "test-utils"))]
pub mod testing {
    //! Test doubles for charm code.
    pub use charmkit_hook::testing::{call_log, CallLog, MockHook};
    pub use charmkit_tools::testing::{FakeRunner, MapEnv};
}
