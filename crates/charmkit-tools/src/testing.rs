//! Test doubles for code that talks to hook tools.
//!
//! [`FakeRunner`] answers tool invocations from a script and records
//! every call; [`MapEnv`] is an in-memory [`HookEnv`].
//!
//! ```
//! use charmkit_tools::testing::FakeRunner;
//! use charmkit_tools::relation;
//!
//! let runner = FakeRunner::new().with_stdout(["relation-ids", "db"], "db:1\ndb:4\n");
//! let ids = relation::ids(&runner, "db").unwrap();
//! assert_eq!(ids.len(), 2);
//! assert_eq!(runner.calls(), vec![vec!["relation-ids".to_string(), "db".to_string()]]);
//! ```

use crate::env::HookEnv;
use crate::executor::{Invocation, RawOutput, ToolRunner};
use crate::ToolError;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};

/// Scripted [`ToolRunner`].
///
/// Responses are keyed by the full argv (tool name first). For a tool
/// with at least one scripted response, an unscripted argv exits with
/// status 2 and an "unexpected invocation" message. A tool with no
/// scripted response at all is reported as not found.
#[derive(Debug, Default)]
pub struct FakeRunner {
    responses: HashMap<Vec<String>, RawOutput>,
    known_tools: HashSet<String>,
    missing: HashSet<String>,
    calls: Mutex<Vec<Vec<String>>>,
}

impl FakeRunner {
    /// Creates a runner with no scripted responses.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts `output` for the exact argv.
    #[must_use]
    pub fn respond<I, S>(mut self, argv: I, output: RawOutput) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let argv: Vec<String> = argv.into_iter().map(Into::into).collect();
        if let Some(tool) = argv.first() {
            self.known_tools.insert(tool.clone());
        }
        self.responses.insert(argv, output);
        self
    }

    /// Scripts a successful run printing `stdout`.
    #[must_use]
    pub fn with_stdout<I, S>(self, argv: I, stdout: &str) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.respond(argv, RawOutput::success(stdout))
    }

    /// Scripts a successful run with no output, for mutating tools.
    #[must_use]
    pub fn with_ok<I, S>(self, argv: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.respond(argv, RawOutput::success(Vec::new()))
    }

    /// Makes every invocation of `tool` fail as not found.
    #[must_use]
    pub fn missing(mut self, tool: impl Into<String>) -> Self {
        self.missing.insert(tool.into());
        self
    }

    /// Every argv seen so far, in call order.
    #[must_use]
    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().clone()
    }

    /// Number of calls made to `tool`.
    #[must_use]
    pub fn call_count(&self, tool: &str) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|argv| argv.first().is_some_and(|t| t == tool))
            .count()
    }

    /// Returns `true` if the exact argv was invoked.
    #[must_use]
    pub fn was_called<I, S>(&self, argv: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let argv: Vec<String> = argv.into_iter().map(Into::into).collect();
        self.calls.lock().contains(&argv)
    }
}

impl ToolRunner for FakeRunner {
    fn execute(&self, invocation: &Invocation) -> Result<RawOutput, ToolError> {
        let argv: Vec<String> = std::iter::once(invocation.tool().to_string())
            .chain(invocation.argv().iter().cloned())
            .collect();
        self.calls.lock().push(argv.clone());

        let tool = invocation.tool();
        if self.missing.contains(tool) {
            return Err(ToolError::ToolNotFound {
                tool: tool.to_string(),
            });
        }
        match self.responses.get(&argv) {
            Some(output) => Ok(output.clone()),
            None if self.known_tools.contains(tool) => Ok(RawOutput::failure(
                2,
                format!("unexpected invocation: {invocation}"),
            )),
            None => Err(ToolError::ToolNotFound {
                tool: tool.to_string(),
            }),
        }
    }
}

/// In-memory [`HookEnv`].
#[derive(Debug, Clone, Default)]
pub struct MapEnv {
    vars: HashMap<String, String>,
    program: Option<String>,
}

impl MapEnv {
    /// Creates an empty environment.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a variable.
    #[must_use]
    pub fn with_var(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }

    /// Sets the program name (`argv[0]`).
    #[must_use]
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = Some(program.into());
        self
    }
}

impl HookEnv for MapEnv {
    fn var(&self, name: &str) -> Option<String> {
        self.vars.get(name).cloned()
    }

    fn program_name(&self) -> Option<String> {
        self.program.clone()
    }
}
