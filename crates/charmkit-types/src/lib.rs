//! Core types for charmkit.
//!
//! This crate holds the identifiers every other charmkit crate speaks in
//! and the [`ErrorCode`] trait all charmkit error enums implement.
//!
//! # Crate Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  charmkit-types   : HookName, UnitName, RelationId ◄── HERE │
//! ├─────────────────────────────────────────────────────────────┤
//! │  charmkit-tools   : hook tool executor + state accessors    │
//! ├─────────────────────────────────────────────────────────────┤
//! │  charmkit-hook    : Hook trait, registry, dispatcher        │
//! ├─────────────────────────────────────────────────────────────┤
//! │  charmkit-runtime : framework config, persisted state       │
//! ├─────────────────────────────────────────────────────────────┤
//! │  charmkit         : application facade                      │
//! └─────────────────────────────────────────────────────────────┘
//! ```

mod error;
mod id;

pub use error::{assert_error_codes, is_valid_code, ErrorCode};
pub use id::{HookName, IdError, RelationId, UnitName};
