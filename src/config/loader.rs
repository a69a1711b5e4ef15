// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::model::{RawTaskFile, TaskFile};
use crate::errors::Result;

/// Load a task file from a given path and return the raw `RawTaskFile`.
///
/// This only performs TOML deserialization; use [`load_and_validate`] for
/// file-level validation as well.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawTaskFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let file: RawTaskFile = toml::from_str(&contents)?;

    Ok(file)
}

/// Load a task file from path and run file-level validation:
///
/// - at least one task,
/// - every task that is not skipped has a non-empty `cmd`.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<TaskFile> {
    let raw = load_from_path(&path)?;
    let file = TaskFile::try_from(raw)?;
    Ok(file)
}

/// Default task file location: `Dagrun.toml` in the current directory.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("Dagrun.toml")
}
