//! Dispatcher: resolves the hook name and runs its handlers.
//!
//! ```text
//!   Idle ──dispatch()──▶ Running ──all ok / no match──▶ Success (Dispatched)
//!     │                     │
//!     │ no hook name        └──handler k fails──▶ Failed (HandlerFailed)
//!     ├──────────────────────────────────────────▶ Failed (InvalidInvocationContext)
//!     │ blank registration
//!     └──────────────────────────────────────────▶ Failed (InvalidRegistration)
//! ```
//!
//! `dispatch` consumes the dispatcher, so each process run dispatches
//! exactly once.

use crate::{DispatchError, HookContext, HookRegistry};
use charmkit_tools::env::{self, vars};
use charmkit_tools::{ConfigCache, HookEnv, SnapshotStore, ToolError, ToolRunner};
use charmkit_types::HookName;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

/// Determines the hook name for this process run.
///
/// Checked in order: `JUJU_HOOK_NAME`, `JUJU_ACTION_NAME`, then the file
/// name the program was invoked as (hooks are commonly symlinks named
/// after the event).
///
/// # Errors
///
/// `InvalidInvocationContext` if none of these yields a non-empty name.
pub fn resolve_hook_name(env: &dyn HookEnv) -> Result<HookName, DispatchError> {
    let from_env = env::optional(env, vars::JUJU_HOOK_NAME)
        .or_else(|| env::optional(env, vars::JUJU_ACTION_NAME));
    let candidate = from_env.or_else(|| {
        env.program_name().and_then(|program| {
            Path::new(&program)
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
        })
    });

    let Some(candidate) = candidate else {
        return Err(DispatchError::invalid_context(
            "neither JUJU_HOOK_NAME, JUJU_ACTION_NAME, nor a program name is available",
        ));
    };
    HookName::new(candidate).map_err(|e| DispatchError::invalid_context(e.to_string()))
}

/// What a successful dispatch did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// This many handlers ran and all succeeded.
    Handled { handlers: usize },
    /// No handler was registered; nothing ran.
    Unhandled,
}

impl DispatchOutcome {
    /// Number of handlers that ran.
    #[must_use]
    pub fn handlers(self) -> usize {
        match self {
            Self::Handled { handlers } => handlers,
            Self::Unhandled => 0,
        }
    }
}

/// Runs the handlers for one invocation.
pub struct Dispatcher<'a> {
    runner: &'a dyn ToolRunner,
    env: &'a dyn HookEnv,
    store: &'a dyn SnapshotStore,
    hook: Option<HookName>,
    state_dir: Option<PathBuf>,
}

impl<'a> Dispatcher<'a> {
    /// Creates a dispatcher that resolves the hook name from `env`.
    #[must_use]
    pub fn new(runner: &'a dyn ToolRunner, env: &'a dyn HookEnv, store: &'a dyn SnapshotStore) -> Self {
        Self {
            runner,
            env,
            store,
            hook: None,
            state_dir: None,
        }
    }

    /// Uses `hook` instead of resolving it from the environment.
    #[must_use]
    pub fn with_hook_name(mut self, hook: HookName) -> Self {
        self.hook = Some(hook);
        self
    }

    /// Exposes `dir` to handlers through [`HookContext::state_dir`].
    #[must_use]
    pub fn with_state_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.state_dir = Some(dir.into());
        self
    }

    /// Runs every handler registered for the hook, in order.
    ///
    /// Stops at the first failing handler; the ones after it do not run.
    /// A hook with no handlers is a success with
    /// [`DispatchOutcome::Unhandled`].
    ///
    /// # Errors
    ///
    /// `InvalidRegistration` if the registry refused any handler name,
    /// `InvalidInvocationContext` if the hook name cannot be resolved,
    /// `HandlerFailed` for the first handler error.
    pub fn dispatch(self, registry: &HookRegistry) -> Result<Dispatched<'a>, DispatchError> {
        if !registry.rejected().is_empty() {
            return Err(DispatchError::InvalidRegistration {
                names: registry.rejected().to_vec(),
            });
        }
        let hook = match self.hook {
            Some(hook) => hook,
            None => resolve_hook_name(self.env)?,
        };
        let handlers = registry.handlers_for(&hook);
        let config = ConfigCache::new(self.runner, self.env, self.store);

        if handlers.is_empty() {
            info!(hook = %hook, "no handler registered");
            return Ok(Dispatched {
                hook,
                outcome: DispatchOutcome::Unhandled,
                config,
            });
        }

        info!(hook = %hook, handlers = handlers.len(), "dispatching");
        let mut ctx = HookContext::new(hook, self.runner, self.env, config);
        if let Some(dir) = self.state_dir {
            ctx = ctx.with_state_dir(dir);
        }
        for (index, handler) in handlers.iter().enumerate() {
            debug!(hook = %ctx.hook(), index, handler = handler.label(), "running handler");
            if let Err(source) = handler.execute(&mut ctx) {
                error!(
                    hook = %ctx.hook(),
                    index,
                    handler = handler.label(),
                    error = %source,
                    "handler failed"
                );
                return Err(DispatchError::HandlerFailed {
                    hook: ctx.hook().clone(),
                    index,
                    source,
                });
            }
        }

        let hook = ctx.hook().clone();
        info!(hook = %hook, "hook completed");
        Ok(Dispatched {
            hook,
            outcome: DispatchOutcome::Handled {
                handlers: handlers.len(),
            },
            config: ctx.into_config(),
        })
    }
}

/// Terminal success state of a dispatch.
///
/// Holds the config cache so the caller can [`commit`](Self::commit) the
/// snapshot handlers observed. Dropping it without committing leaves the
/// persisted snapshot untouched.
#[derive(Debug)]
pub struct Dispatched<'a> {
    hook: HookName,
    outcome: DispatchOutcome,
    config: ConfigCache<'a>,
}

impl<'a> Dispatched<'a> {
    /// The hook that was dispatched.
    #[must_use]
    pub fn hook(&self) -> &HookName {
        &self.hook
    }

    /// What the dispatch did.
    #[must_use]
    pub fn outcome(&self) -> DispatchOutcome {
        self.outcome
    }

    /// The config cache used during dispatch.
    pub fn config(&mut self) -> &mut ConfigCache<'a> {
        &mut self.config
    }

    /// Persists the current configuration as the next run's previous
    /// snapshot. Safe to call more than once.
    ///
    /// # Errors
    ///
    /// See [`ConfigCache::commit`].
    pub fn commit(&mut self) -> Result<(), ToolError> {
        self.config.commit()
    }
}
