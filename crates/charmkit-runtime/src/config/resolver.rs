//! Programmatic overrides applied after loading.
//!
//! ```text
//! ConfigLoader.load()  →  RuntimeConfig (file + env)
//!                              │
//!                              ▼
//!                     ConfigResolver.apply()
//!                              │
//!                              ▼
//!                     RuntimeConfig (final)
//! ```

use super::RuntimeConfig;

/// Trait for applying configuration overrides.
///
/// Lets a charm pin settings in code on top of whatever the file and
/// environment produced.
pub trait ConfigResolver {
    /// Applies overrides to the given configuration.
    fn apply(&self, config: &mut RuntimeConfig);
}

impl<F> ConfigResolver for F
where
    F: Fn(&mut RuntimeConfig),
{
    fn apply(&self, config: &mut RuntimeConfig) {
        self(config);
    }
}
