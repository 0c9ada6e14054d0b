//! Charm entry point.
//!
//! [`CharmApp`] wires the pieces together for one hook run:
//!
//! ```text
//! ConfigLoader ─► ConfigResolver* ─► logging::init
//!                                        │
//!          Dispatcher(runner, env, LocalSnapshotStore)
//!                                        │
//!                  success + handled ─► commit snapshot
//!                                        │
//!                                    ExitCode
//! ```

use crate::logging::{self, SharedRunner};
use crate::AppError;
use charmkit_hook::{DispatchOutcome, Dispatcher, Hook, HookContext, HookError, HookRegistry};
use charmkit_runtime::{ConfigLoader, ConfigResolver, LocalSnapshotStore, RuntimeConfig, UnitData};
use charmkit_tools::{HookEnv, ProcessEnv, ProcessRunner, ToolRunner};
use charmkit_types::ErrorCode;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::error;

/// A charm: its handlers plus how to reach the outside world.
///
/// # Example
///
/// ```no_run
/// use charmkit::CharmApp;
///
/// fn main() -> std::process::ExitCode {
///     CharmApp::builder()
///         .on("install", |_ctx| Ok(()))
///         .build()
///         .run()
/// }
/// ```
pub struct CharmApp {
    registry: HookRegistry,
    resolvers: Vec<Box<dyn ConfigResolver>>,
    runner: Option<SharedRunner>,
    env: Option<Box<dyn HookEnv>>,
    charm_dir: Option<PathBuf>,
    init_logging: bool,
}

impl CharmApp {
    /// Creates a builder.
    #[must_use]
    pub fn builder() -> CharmAppBuilder {
        CharmAppBuilder::new()
    }

    /// Registered handlers.
    #[must_use]
    pub fn registry(&self) -> &HookRegistry {
        &self.registry
    }

    /// Runs the current hook and maps the result to an exit status.
    ///
    /// Failures are printed to stderr; the orchestrator shows stderr in
    /// its hook log and marks the hook failed on a non-zero status.
    #[must_use]
    pub fn run(&self) -> ExitCode {
        match self.try_run() {
            Ok(_) => ExitCode::SUCCESS,
            Err(e) => {
                error!(code = e.code(), error = %e, "Hook run failed");
                eprintln!("Error: {e}");
                ExitCode::from(e.exit_code())
            }
        }
    }

    /// Runs the current hook.
    ///
    /// The config snapshot is committed only when dispatch succeeded and
    /// at least one handler ran.
    ///
    /// # Errors
    ///
    /// Returns [`AppError`] for config, logging, dispatch or commit failures.
    pub fn try_run(&self) -> Result<DispatchOutcome, AppError> {
        let process_env = ProcessEnv;
        let env: &dyn HookEnv = match &self.env {
            Some(env) => env.as_ref(),
            None => &process_env,
        };

        let loader = match &self.charm_dir {
            Some(dir) => ConfigLoader::new().with_charm_dir(dir),
            None => ConfigLoader::new(),
        };
        let mut config = loader.load_from(env)?;
        for resolver in &self.resolvers {
            resolver.apply(&mut config);
        }

        let runner = self.runner(&config);
        if self.init_logging {
            let juju_log = config.logging.juju_log.then(|| Arc::clone(&runner));
            logging::init(&config.logging, env, juju_log)?;
        }

        let state_dir = config.state_dir(loader.charm_dir(env).as_deref());
        let store = LocalSnapshotStore::new(&state_dir);

        let mut dispatched = Dispatcher::new(&*runner, env, &store)
            .with_state_dir(state_dir.clone())
            .dispatch(&self.registry)?;
        let outcome = dispatched.outcome();
        if let DispatchOutcome::Handled { .. } = outcome {
            dispatched.commit().map_err(AppError::Commit)?;
        }
        Ok(outcome)
    }

    fn runner(&self, config: &RuntimeConfig) -> SharedRunner {
        if let Some(runner) = &self.runner {
            return Arc::clone(runner);
        }
        let runner = match &config.tools_dir {
            Some(dir) => ProcessRunner::new().with_tools_dir(dir),
            None => ProcessRunner::new(),
        };
        Arc::new(runner)
    }
}

impl std::fmt::Debug for CharmApp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CharmApp")
            .field("registry", &self.registry)
            .field("resolvers", &self.resolvers.len())
            .field("custom_runner", &self.runner.is_some())
            .field("custom_env", &self.env.is_some())
            .field("charm_dir", &self.charm_dir)
            .field("init_logging", &self.init_logging)
            .finish()
    }
}

/// Builder for [`CharmApp`].
pub struct CharmAppBuilder {
    registry: HookRegistry,
    resolvers: Vec<Box<dyn ConfigResolver>>,
    runner: Option<SharedRunner>,
    env: Option<Box<dyn HookEnv>>,
    charm_dir: Option<PathBuf>,
    init_logging: bool,
}

impl CharmAppBuilder {
    /// Creates a new builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            registry: HookRegistry::new(),
            resolvers: Vec::new(),
            runner: None,
            env: None,
            charm_dir: None,
            init_logging: true,
        }
    }

    /// Registers a handler for `name`.
    #[must_use]
    pub fn hook(mut self, name: impl AsRef<str>, hook: impl Hook + 'static) -> Self {
        self.registry.register(name, hook);
        self
    }

    /// Registers one handler for several names.
    #[must_use]
    pub fn hooks<I, S>(mut self, names: I, hook: impl Hook + 'static) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.registry.register_all(names, hook);
        self
    }

    /// Registers a closure for `name`.
    #[must_use]
    pub fn on<F>(mut self, name: impl AsRef<str>, handler: F) -> Self
    where
        F: Fn(&mut HookContext<'_>) -> Result<(), HookError> + 'static,
    {
        self.registry.on(name, handler);
        self
    }

    /// Registers a catch-all handler for hooks with no exact match.
    #[must_use]
    pub fn default_hook(mut self, hook: impl Hook + 'static) -> Self {
        self.registry.register_default(hook);
        self
    }

    /// Adds a config override applied after file and environment.
    #[must_use]
    pub fn with_resolver(mut self, resolver: impl ConfigResolver + 'static) -> Self {
        self.resolvers.push(Box::new(resolver));
        self
    }

    /// Replaces the process runner.
    #[must_use]
    pub fn with_runner(mut self, runner: impl ToolRunner + Send + Sync + 'static) -> Self {
        self.runner = Some(Arc::new(runner));
        self
    }

    /// Replaces the process runner with one the caller keeps a handle to.
    #[must_use]
    pub fn with_shared_runner(mut self, runner: SharedRunner) -> Self {
        self.runner = Some(runner);
        self
    }

    /// Replaces the process environment.
    #[must_use]
    pub fn with_env(mut self, env: impl HookEnv + 'static) -> Self {
        self.env = Some(Box::new(env));
        self
    }

    /// Sets the charm directory instead of reading `CHARM_DIR`.
    #[must_use]
    pub fn with_charm_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.charm_dir = Some(dir.into());
        self
    }

    /// Leaves the global tracing subscriber alone.
    #[must_use]
    pub fn without_logging(mut self) -> Self {
        self.init_logging = false;
        self
    }

    /// Builds the application.
    #[must_use]
    pub fn build(self) -> CharmApp {
        CharmApp {
            registry: self.registry,
            resolvers: self.resolvers,
            runner: self.runner,
            env: self.env,
            charm_dir: self.charm_dir,
            init_logging: self.init_logging,
        }
    }
}

impl Default for CharmAppBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Opens the unit's [`UnitData`] from inside a handler.
///
/// Under [`CharmApp`] this is the directory the config snapshot store
/// uses, resolvers and `with_charm_dir` included. A handler dispatched
/// without a state directory falls back to loading the framework config
/// from the hook environment.
///
/// # Errors
///
/// Returns [`HookError::Other`] if the framework config cannot be loaded,
/// or a tool error wrapping the store failure.
pub fn unit_data(ctx: &HookContext<'_>) -> Result<UnitData, HookError> {
    let state_dir = match ctx.state_dir() {
        Some(dir) => dir.to_path_buf(),
        None => {
            let loader = ConfigLoader::new();
            let config = loader.load_from(ctx.env()).map_err(HookError::other)?;
            config.state_dir(loader.charm_dir(ctx.env()).as_deref())
        }
    };
    UnitData::open_in(state_dir).map_err(|e| HookError::Tool(e.into()))
}
