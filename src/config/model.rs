// src/config/model.rs

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

use serde::Deserialize;

use crate::dag::TaskSpec;
use crate::engine::TaskName;

/// Task file exactly as deserialized from TOML, before validation.
///
/// ```toml
/// [config]
/// working_dir = "."
///
/// [task.fetch]
/// cmd = "git fetch"
///
/// [task.build]
/// cmd = "cargo build"
/// wait_for = ["fetch"]
/// ```
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawTaskFile {
    #[serde(default)]
    pub config: ConfigSection,

    /// All tasks from `[task.<id>]`, keyed by task id.
    #[serde(default)]
    pub task: BTreeMap<TaskName, TaskConfig>,
}

/// `[config]` section.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ConfigSection {
    /// Directory commands run in. Relative paths are resolved against the
    /// directory holding the task file.
    #[serde(default)]
    pub working_dir: Option<PathBuf>,
}

/// `[task.<id>]` section.
#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
pub struct TaskConfig {
    /// Shell command to execute. Required unless `skip = true`.
    #[serde(default)]
    pub cmd: Option<String>,

    /// Ids of tasks that must finish before this one starts.
    #[serde(default)]
    pub wait_for: Vec<TaskName>,

    /// Consider this task already done.
    #[serde(default)]
    pub skip: bool,
}

/// A task file that passed file-level validation.
///
/// Graph-level checks (roots, self-waits, unknown ids) are left to the engine
/// so there is exactly one implementation of them.
#[derive(Debug, Clone)]
pub struct TaskFile {
    pub config: ConfigSection,
    pub task: BTreeMap<TaskName, TaskConfig>,
}

impl TaskFile {
    pub(crate) fn new_unchecked(
        config: ConfigSection,
        task: BTreeMap<TaskName, TaskConfig>,
    ) -> Self {
        Self { config, task }
    }

    /// Task specs in id order.
    pub fn specs(&self) -> Vec<TaskSpec> {
        self.task
            .iter()
            .map(|(id, tc)| {
                TaskSpec::new(id.clone())
                    .wait_for_all(tc.wait_for.iter().cloned())
                    .skip(tc.skip)
            })
            .collect()
    }

    /// Commands for every task that has one.
    pub fn commands(&self) -> HashMap<TaskName, String> {
        self.task
            .iter()
            .filter_map(|(id, tc)| tc.cmd.clone().map(|cmd| (id.clone(), cmd)))
            .collect()
    }
}
