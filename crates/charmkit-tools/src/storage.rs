//! Storage instances (`storage-list`, `storage-get`).

use crate::executor::{run, Invocation, ToolRunner};
use crate::{parse, ToolError};
use std::path::PathBuf;

const STORAGE_LIST: &str = "storage-list";
const STORAGE_GET: &str = "storage-get";

/// An attached storage instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageInstance {
    /// Instance id such as `data/0`.
    pub id: String,
    /// Mount point or device path.
    pub location: PathBuf,
}

/// Ids of attached storage instances, optionally for one storage name.
///
/// # Errors
///
/// Any invocation failure.
pub fn list(runner: &dyn ToolRunner, name: Option<&str>) -> Result<Vec<String>, ToolError> {
    let out = run(runner, &Invocation::new(STORAGE_LIST).args(name))?;
    parse::list(STORAGE_LIST, &out)
}

/// Location of instance `id`, or of the hook's own instance when `None`
/// (inside `<name>-storage-attached`).
///
/// # Errors
///
/// `MissingValue` if no location is reported, or any invocation failure.
pub fn get_location(runner: &dyn ToolRunner, id: Option<&str>) -> Result<PathBuf, ToolError> {
    let out = run(
        runner,
        &Invocation::new(STORAGE_GET).opt("-s", id).arg("location"),
    )?;
    parse::scalar(STORAGE_GET, &out).map(PathBuf::from)
}

/// Every attached instance with its location.
///
/// # Errors
///
/// The first failure of any underlying call.
pub fn instances(runner: &dyn ToolRunner, name: Option<&str>) -> Result<Vec<StorageInstance>, ToolError> {
    list(runner, name)?
        .into_iter()
        .map(|id| {
            let location = get_location(runner, Some(&id))?;
            Ok(StorageInstance { id, location })
        })
        .collect()
}
