//! Hook context: what a handler sees while it runs.

use charmkit_tools::{ConfigCache, HookEnv, ToolError, ToolRunner, UnitContext};
use charmkit_types::HookName;
use std::path::{Path, PathBuf};

/// State shared by all handlers of one dispatch.
///
/// Handlers run sequentially, so each gets `&mut` access in turn. The
/// config cache lives here for the whole dispatch: the current
/// configuration is fetched at most once no matter how many handlers
/// read it.
pub struct HookContext<'a> {
    hook: HookName,
    runner: &'a dyn ToolRunner,
    env: &'a dyn HookEnv,
    config: ConfigCache<'a>,
    unit: Option<UnitContext>,
    state_dir: Option<PathBuf>,
}

impl<'a> HookContext<'a> {
    /// Creates a context.
    #[must_use]
    pub fn new(
        hook: HookName,
        runner: &'a dyn ToolRunner,
        env: &'a dyn HookEnv,
        config: ConfigCache<'a>,
    ) -> Self {
        Self {
            hook,
            runner,
            env,
            config,
            unit: None,
            state_dir: None,
        }
    }

    /// Sets the directory the framework keeps persisted state in.
    #[must_use]
    pub fn with_state_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.state_dir = Some(dir.into());
        self
    }

    /// The hook being handled.
    #[must_use]
    pub fn hook(&self) -> &HookName {
        &self.hook
    }

    /// Runner to pass to state accessors.
    #[must_use]
    pub fn runner(&self) -> &'a dyn ToolRunner {
        self.runner
    }

    /// Hook environment.
    #[must_use]
    pub fn env(&self) -> &'a dyn HookEnv {
        self.env
    }

    /// Directory holding persisted framework state, when the caller set one.
    #[must_use]
    pub fn state_dir(&self) -> Option<&Path> {
        self.state_dir.as_deref()
    }

    /// Per-run configuration cache.
    pub fn config(&mut self) -> &mut ConfigCache<'a> {
        &mut self.config
    }

    /// Unit, charm dir, and relation scope, read from the environment on
    /// first use.
    ///
    /// # Errors
    ///
    /// `MissingEnvironment` / `InvalidEnvironment` from
    /// [`UnitContext::from_env`].
    pub fn unit(&mut self) -> Result<&UnitContext, ToolError> {
        let unit = match self.unit.take() {
            Some(unit) => unit,
            None => UnitContext::from_env(self.env)?,
        };
        Ok(self.unit.insert(unit))
    }

    /// Consumes the context, returning the config cache.
    #[must_use]
    pub fn into_config(self) -> ConfigCache<'a> {
        self.config
    }
}

impl std::fmt::Debug for HookContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookContext")
            .field("hook", &self.hook)
            .field("config", &self.config)
            .field("unit", &self.unit)
            .field("state_dir", &self.state_dir)
            .finish_non_exhaustive()
    }
}
