//! Identifier types for hooks, units, and relations.
//!
//! All identifiers parse from and render to the exact strings the
//! orchestrator uses in environment variables and hook tool output, so
//! they round-trip through `Display` / `FromStr` and serialize as plain
//! strings.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors from parsing an identifier string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdError {
    /// The identifier was empty or whitespace only.
    #[error("empty {kind}")]
    Empty {
        /// Which identifier kind was being parsed.
        kind: &'static str,
    },

    /// The identifier did not have the expected `<name><sep><number>` shape.
    #[error("malformed {kind}: '{value}'")]
    Malformed {
        /// Which identifier kind was being parsed.
        kind: &'static str,
        /// The rejected input.
        value: String,
    },
}

/// Name of the lifecycle event being handled in this process run.
///
/// Examples: `install`, `config-changed`, `db-relation-changed`,
/// `collect-metrics`, or an action name such as `backup`.
///
/// A `HookName` is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HookName(String);

impl HookName {
    /// Creates a hook name.
    ///
    /// # Errors
    ///
    /// Returns [`IdError::Empty`] if `name` is empty after trimming.
    pub fn new(name: impl Into<String>) -> Result<Self, IdError> {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(IdError::Empty { kind: "hook name" });
        }
        if trimmed.len() == name.len() {
            Ok(Self(name))
        } else {
            Ok(Self(trimmed.to_string()))
        }
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` for relation hooks (`<relation>-relation-<event>`).
    #[must_use]
    pub fn is_relation_hook(&self) -> bool {
        self.relation_name().is_some()
    }

    /// Returns the relation name for relation hooks.
    ///
    /// ```
    /// use charmkit_types::HookName;
    ///
    /// let hook = HookName::new("db-relation-changed").unwrap();
    /// assert_eq!(hook.relation_name(), Some("db"));
    /// assert_eq!(HookName::new("install").unwrap().relation_name(), None);
    /// ```
    #[must_use]
    pub fn relation_name(&self) -> Option<&str> {
        let (name, _event) = self.0.rsplit_once("-relation-")?;
        (!name.is_empty()).then_some(name)
    }
}

impl fmt::Display for HookName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for HookName {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for HookName {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<HookName> for String {
    fn from(value: HookName) -> Self {
        value.0
    }
}

impl AsRef<str> for HookName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A unit of an application, rendered `<application>/<number>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UnitName {
    /// Application name.
    pub application: String,
    /// Unit number within the application.
    pub number: u32,
}

impl UnitName {
    /// Creates a unit name from its parts.
    #[must_use]
    pub fn new(application: impl Into<String>, number: u32) -> Self {
        Self {
            application: application.into(),
            number,
        }
    }
}

impl fmt::Display for UnitName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.application, self.number)
    }
}

impl FromStr for UnitName {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (application, number) = split_numbered(s, '/', "unit name")?;
        Ok(Self {
            application,
            number,
        })
    }
}

impl TryFrom<String> for UnitName {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<UnitName> for String {
    fn from(value: UnitName) -> Self {
        value.to_string()
    }
}

/// A relation instance, rendered `<relation-name>:<id>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RelationId {
    /// Relation (endpoint) name from the charm metadata.
    pub name: String,
    /// Numeric relation id assigned by the orchestrator.
    pub id: u32,
}

impl RelationId {
    /// Creates a relation id from its parts.
    #[must_use]
    pub fn new(name: impl Into<String>, id: u32) -> Self {
        Self {
            name: name.into(),
            id,
        }
    }
}

impl fmt::Display for RelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.id)
    }
}

impl FromStr for RelationId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, id) = split_numbered(s, ':', "relation id")?;
        Ok(Self { name, id })
    }
}

impl TryFrom<String> for RelationId {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<RelationId> for String {
    fn from(value: RelationId) -> Self {
        value.to_string()
    }
}

fn split_numbered(s: &str, sep: char, kind: &'static str) -> Result<(String, u32), IdError> {
    let s = s.trim();
    if s.is_empty() {
        return Err(IdError::Empty { kind });
    }
    let malformed = || IdError::Malformed {
        kind,
        value: s.to_string(),
    };
    let (name, number) = s.rsplit_once(sep).ok_or_else(malformed)?;
    if name.is_empty() {
        return Err(malformed());
    }
    let number = number.parse::<u32>().map_err(|_| malformed())?;
    Ok((name.to_string(), number))
}
