//! Hook registry: maps hook names to ordered handlers.
//!
//! Built once at process start and read-only during dispatch.
//!
//! Names go through [`HookName`]. A blank name can never fire, so it is
//! kept aside as rejected and [`Dispatcher`](crate::Dispatcher) refuses
//! to run a registry holding one.

use crate::{Hook, HookContext, HookError};
use charmkit_types::HookName;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::warn;

/// Shared handle to a registered hook.
pub type SharedHook = Arc<dyn Hook>;

/// Central registry for all handlers.
///
/// Lookup is by exact hook name. Within one name, handlers keep
/// registration order. Default handlers run only for hooks with no
/// exact registration.
#[derive(Default)]
pub struct HookRegistry {
    hooks: BTreeMap<String, Vec<SharedHook>>,
    defaults: Vec<SharedHook>,
    rejected: Vec<String>,
}

impl HookRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a handler for `name`.
    pub fn register(&mut self, name: impl AsRef<str>, hook: impl Hook + 'static) -> &mut Self {
        self.register_shared(name, Arc::new(hook))
    }

    /// Appends a closure handler for `name`.
    pub fn on<F>(&mut self, name: impl AsRef<str>, handler: F) -> &mut Self
    where
        F: Fn(&mut HookContext<'_>) -> Result<(), HookError> + 'static,
    {
        self.register(name, handler)
    }

    /// Appends an already shared handler for `name`.
    ///
    /// A blank name is not registered; it is recorded in
    /// [`rejected`](Self::rejected) instead.
    pub fn register_shared(&mut self, name: impl AsRef<str>, hook: SharedHook) -> &mut Self {
        let raw = name.as_ref();
        match HookName::new(raw) {
            Ok(name) => self
                .hooks
                .entry(name.as_str().to_string())
                .or_default()
                .push(hook),
            Err(e) => {
                warn!(name = raw, handler = hook.label(), error = %e, "handler not registered");
                self.rejected.push(raw.to_string());
            }
        }
        self
    }

    /// Appends one handler instance for every name in `names`.
    pub fn register_all<I, S>(&mut self, names: I, hook: impl Hook + 'static) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let hook: SharedHook = Arc::new(hook);
        for name in names {
            self.register_shared(name, Arc::clone(&hook));
        }
        self
    }

    /// Appends a catch-all handler, used only when no exact match exists.
    pub fn register_default(&mut self, hook: impl Hook + 'static) -> &mut Self {
        self.defaults.push(Arc::new(hook));
        self
    }

    /// Handlers to run for `name`, in order. Empty when nothing matches.
    #[must_use]
    pub fn handlers_for(&self, name: &HookName) -> &[SharedHook] {
        match self.hooks.get(name.as_str()) {
            Some(hooks) if !hooks.is_empty() => hooks,
            _ => &self.defaults,
        }
    }

    /// Returns `true` if `name` has an exact registration.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.hooks.contains_key(name)
    }

    /// Names refused at registration, in order.
    #[must_use]
    pub fn rejected(&self) -> &[String] {
        &self.rejected
    }

    /// Registered hook names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.hooks.keys().map(String::as_str)
    }

    /// Total number of registrations, defaults included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.hooks.values().map(Vec::len).sum::<usize>() + self.defaults.len()
    }

    /// Returns `true` if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let hooks: BTreeMap<&str, Vec<&str>> = self
            .hooks
            .iter()
            .map(|(name, hooks)| (name.as_str(), hooks.iter().map(|h| h.label()).collect()))
            .collect();
        f.debug_struct("HookRegistry")
            .field("hooks", &hooks)
            .field("defaults", &self.defaults.len())
            .field("rejected", &self.rejected)
            .finish()
    }
}
