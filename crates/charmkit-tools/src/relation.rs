//! Relation data (`relation-ids`, `relation-list`, `relation-get`, `relation-set`).
//!
//! Every call is a fresh read. Inside a relation hook the `rel`/`unit`
//! arguments may be `None`, in which case the tools default to the
//! hook's own relation and remote unit.

use crate::executor::{run, Invocation, ToolRunner};
use crate::{parse, ToolError};
use charmkit_types::{RelationId, UnitName};
use std::collections::BTreeMap;

/// Settings of one unit on one relation.
pub type Settings = BTreeMap<String, String>;

/// Relation id → remote unit → settings.
pub type RelationData = BTreeMap<RelationId, BTreeMap<UnitName, Settings>>;

const RELATION_IDS: &str = "relation-ids";
const RELATION_LIST: &str = "relation-list";
const RELATION_GET: &str = "relation-get";
const RELATION_SET: &str = "relation-set";

/// Ids of all established relations on endpoint `name`.
///
/// # Errors
///
/// `UnparsableResponse` for a malformed id, or any invocation failure.
pub fn ids(runner: &dyn ToolRunner, name: &str) -> Result<Vec<RelationId>, ToolError> {
    let out = run(runner, &Invocation::new(RELATION_IDS).arg(name))?;
    parse::list_of(RELATION_IDS, &out)
}

/// Remote units participating in `rel`.
///
/// # Errors
///
/// `UnparsableResponse` for a malformed unit name, or any invocation
/// failure.
pub fn list(runner: &dyn ToolRunner, rel: Option<&RelationId>) -> Result<Vec<UnitName>, ToolError> {
    let out = run(runner, &Invocation::new(RELATION_LIST).opt("-r", rel))?;
    parse::list_of(RELATION_LIST, &out)
}

/// One setting published by `unit` on `rel`.
///
/// # Errors
///
/// `MissingValue` if the key is unset, or any invocation failure.
pub fn get(
    runner: &dyn ToolRunner,
    key: &str,
    unit: Option<&UnitName>,
    rel: Option<&RelationId>,
) -> Result<String, ToolError> {
    let invocation = Invocation::new(RELATION_GET)
        .opt("-r", rel)
        .arg(key)
        .args(unit.map(ToString::to_string));
    let out = run(runner, &invocation)?;
    parse::scalar(RELATION_GET, &out)
}

/// All settings published by `unit` on `rel`.
///
/// # Errors
///
/// `UnparsableResponse` for a non-flat map, or any invocation failure.
pub fn get_all(
    runner: &dyn ToolRunner,
    unit: Option<&UnitName>,
    rel: Option<&RelationId>,
) -> Result<Settings, ToolError> {
    let invocation = Invocation::new(RELATION_GET)
        .arg("--format=json")
        .opt("-r", rel)
        .arg("-")
        .args(unit.map(ToString::to_string));
    let out = run(runner, &invocation)?;
    parse::map(RELATION_GET, &out)
}

/// Publishes this unit's settings on `rel`. An empty value unsets the key.
///
/// # Errors
///
/// `InvalidArgument` for a bad key (nothing is invoked), or any
/// invocation failure.
pub fn set<I, K, V>(runner: &dyn ToolRunner, settings: I, rel: Option<&RelationId>) -> Result<(), ToolError>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let pairs = parse::encode_pairs(RELATION_SET, settings)?;
    if pairs.is_empty() {
        return Ok(());
    }
    run(runner, &Invocation::new(RELATION_SET).opt("-r", rel).args(pairs))?;
    Ok(())
}

/// Settings of every remote unit on every relation of endpoint `name`.
///
/// Issues one `relation-ids`, then one `relation-list` per relation and
/// one `relation-get` per unit.
///
/// # Errors
///
/// The first failure of any underlying call.
pub fn data(runner: &dyn ToolRunner, name: &str) -> Result<RelationData, ToolError> {
    let mut data = RelationData::new();
    for rel in ids(runner, name)? {
        let mut units = BTreeMap::new();
        for unit in list(runner, Some(&rel))? {
            let settings = get_all(runner, Some(&unit), Some(&rel))?;
            units.insert(unit, settings);
        }
        data.insert(rel, units);
    }
    Ok(data)
}
