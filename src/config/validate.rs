// src/config/validate.rs

use crate::config::model::{RawTaskFile, TaskFile};
use crate::errors::{DagrunError, Result};

impl TryFrom<RawTaskFile> for TaskFile {
    type Error = DagrunError;

    fn try_from(raw: RawTaskFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_task_file(&raw)?;
        Ok(TaskFile::new_unchecked(raw.config, raw.task))
    }
}

fn validate_raw_task_file(file: &RawTaskFile) -> Result<()> {
    ensure_has_tasks(file)?;
    validate_commands(file)?;
    Ok(())
}

fn ensure_has_tasks(file: &RawTaskFile) -> Result<()> {
    if file.task.is_empty() {
        return Err(DagrunError::ConfigError(
            "task file must contain at least one [task.<id>] section".to_string(),
        ));
    }
    Ok(())
}

fn validate_commands(file: &RawTaskFile) -> Result<()> {
    for (id, task) in file.task.iter() {
        if task.skip {
            continue;
        }

        let has_cmd = task.cmd.as_deref().is_some_and(|c| !c.trim().is_empty());
        if !has_cmd {
            return Err(DagrunError::ConfigError(format!(
                "task '{id}' has no `cmd` (set one, or mark the task `skip = true`)"
            )));
        }
    }
    Ok(())
}
