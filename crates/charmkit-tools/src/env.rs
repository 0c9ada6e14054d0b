//! Hook process environment.
//!
//! The orchestrator describes the running hook through environment
//! variables. Everything that reads them goes through [`HookEnv`] so
//! handlers can be tested against an in-memory environment.

use crate::ToolError;
use charmkit_types::{RelationId, UnitName};
use std::path::PathBuf;
use std::str::FromStr;

/// Environment variable names set by the orchestrator.
pub mod vars {
    /// Name of the hook being run.
    pub const JUJU_HOOK_NAME: &str = "JUJU_HOOK_NAME";
    /// Unit the hook runs for (`app/N`).
    pub const JUJU_UNIT_NAME: &str = "JUJU_UNIT_NAME";
    /// Root directory of the deployed charm.
    pub const CHARM_DIR: &str = "CHARM_DIR";
    /// Relation name for relation hooks.
    pub const JUJU_RELATION: &str = "JUJU_RELATION";
    /// Relation id (`name:N`) for relation hooks.
    pub const JUJU_RELATION_ID: &str = "JUJU_RELATION_ID";
    /// Remote unit for relation hooks.
    pub const JUJU_REMOTE_UNIT: &str = "JUJU_REMOTE_UNIT";
    /// Remote application for relation hooks.
    pub const JUJU_REMOTE_APP: &str = "JUJU_REMOTE_APP";
    /// Action name while running an action.
    pub const JUJU_ACTION_NAME: &str = "JUJU_ACTION_NAME";
    /// Action id while running an action.
    pub const JUJU_ACTION_UUID: &str = "JUJU_ACTION_UUID";
    /// Action tag while running an action.
    pub const JUJU_ACTION_TAG: &str = "JUJU_ACTION_TAG";
    /// Availability zone of the unit's machine.
    pub const JUJU_AVAILABILITY_ZONE: &str = "JUJU_AVAILABILITY_ZONE";
    /// Meter status code during `meter-status-changed`.
    pub const JUJU_METER_STATUS: &str = "JUJU_METER_STATUS";
    /// Meter status detail during `meter-status-changed`.
    pub const JUJU_METER_INFO: &str = "JUJU_METER_INFO";
    /// Model the unit belongs to.
    pub const JUJU_MODEL_NAME: &str = "JUJU_MODEL_NAME";
}

/// Read access to the hook's process environment.
pub trait HookEnv {
    /// Returns the variable's value, or `None` if unset or not UTF-8.
    fn var(&self, name: &str) -> Option<String>;

    /// Returns the name this process was invoked as (`argv[0]`).
    fn program_name(&self) -> Option<String>;
}

impl<T: HookEnv + ?Sized> HookEnv for &T {
    fn var(&self, name: &str) -> Option<String> {
        (**self).var(name)
    }

    fn program_name(&self) -> Option<String> {
        (**self).program_name()
    }
}

/// [`HookEnv`] over the real process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl HookEnv for ProcessEnv {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }

    fn program_name(&self) -> Option<String> {
        std::env::args().next()
    }
}

/// Returns a non-empty variable.
///
/// # Errors
///
/// `MissingEnvironment` if the variable is unset or empty.
pub fn required(env: &dyn HookEnv, name: &str) -> Result<String, ToolError> {
    optional(env, name).ok_or_else(|| ToolError::missing_env(name))
}

/// Returns a variable, treating an empty value as unset.
#[must_use]
pub fn optional(env: &dyn HookEnv, name: &str) -> Option<String> {
    env.var(name).filter(|v| !v.trim().is_empty())
}

/// Parses an optional variable.
///
/// # Errors
///
/// `InvalidEnvironment` if set but not parseable as `T`.
pub fn parsed<T: FromStr>(env: &dyn HookEnv, name: &str) -> Result<Option<T>, ToolError> {
    optional(env, name)
        .map(|value| {
            value
                .trim()
                .parse::<T>()
                .map_err(|_| ToolError::InvalidEnvironment {
                    name: name.to_string(),
                    value,
                })
        })
        .transpose()
}

/// Who and where this hook runs, read once from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitContext {
    /// Unit the hook runs for.
    pub unit: UnitName,
    /// Charm root directory, if reported.
    pub charm_dir: Option<PathBuf>,
    /// Model name, if reported.
    pub model: Option<String>,
    /// Relation of the current relation hook.
    pub relation: Option<RelationId>,
    /// Remote unit of the current relation hook.
    pub remote_unit: Option<UnitName>,
    /// Remote application of the current relation hook.
    pub remote_app: Option<String>,
}

impl UnitContext {
    /// Reads the context.
    ///
    /// Only `JUJU_UNIT_NAME` is required; relation fields are present
    /// only inside relation hooks.
    ///
    /// # Errors
    ///
    /// `MissingEnvironment` without a unit name, `InvalidEnvironment` for
    /// a malformed unit name, relation id, or remote unit.
    pub fn from_env(env: &dyn HookEnv) -> Result<Self, ToolError> {
        let unit_raw = required(env, vars::JUJU_UNIT_NAME)?;
        let unit = unit_raw
            .parse::<UnitName>()
            .map_err(|_| ToolError::InvalidEnvironment {
                name: vars::JUJU_UNIT_NAME.to_string(),
                value: unit_raw.clone(),
            })?;

        Ok(Self {
            unit,
            charm_dir: optional(env, vars::CHARM_DIR).map(PathBuf::from),
            model: optional(env, vars::JUJU_MODEL_NAME),
            relation: parsed(env, vars::JUJU_RELATION_ID)?,
            remote_unit: parsed(env, vars::JUJU_REMOTE_UNIT)?,
            remote_app: optional(env, vars::JUJU_REMOTE_APP),
        })
    }

    /// Returns `true` inside a relation hook.
    #[must_use]
    pub fn in_relation(&self) -> bool {
        self.relation.is_some()
    }
}
