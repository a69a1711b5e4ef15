// src/engine/report.rs

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::dag::{TaskState, TaskStateStore};
use crate::engine::error_log::ErrorLog;
use crate::engine::TaskName;
use crate::errors::{DagrunError, Result};

/// Summary of a finished run.
///
/// Task lists are sorted by id. `errors` is in the order failures were
/// observed by the runtime loop.
#[derive(Debug, Default)]
pub struct RunReport {
    /// Tasks whose handler returned successfully.
    pub completed: Vec<TaskName>,
    /// Tasks marked `skip`.
    pub skipped: Vec<TaskName>,
    /// Tasks whose handler failed or panicked.
    pub failed: Vec<TaskName>,
    /// Tasks that never started because a dependency did not complete.
    pub blocked: Vec<TaskName>,
    pub errors: Vec<DagrunError>,
}

impl RunReport {
    pub(crate) fn from_snapshot(
        snapshot: BTreeMap<TaskName, TaskState>,
        errors: Vec<DagrunError>,
    ) -> Self {
        let mut report = RunReport {
            errors,
            ..RunReport::default()
        };

        for (task, state) in snapshot {
            match state {
                TaskState::Done => report.completed.push(task),
                TaskState::Skipped => report.skipped.push(task),
                TaskState::Failed => report.failed.push(task),
                // A task still marked Running here would mean a lost
                // completion; the loop never returns with units outstanding.
                TaskState::Pending | TaskState::Running => report.blocked.push(task),
            }
        }

        report
    }

    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn first_error(&self) -> Option<&DagrunError> {
        self.errors.first()
    }

    /// `Ok(())` if nothing failed, otherwise the first recorded error.
    pub fn into_result(self) -> Result<()> {
        match self.errors.into_iter().next() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// Cloneable read-only view of task states and recorded errors, usable
/// while a run is in progress.
///
/// Errors are visible until the run finishes; they then move into the
/// [`RunReport`].
#[derive(Debug, Clone)]
pub struct StatusHandle {
    store: Arc<TaskStateStore>,
    errors: Arc<ErrorLog>,
}

impl StatusHandle {
    pub(crate) fn new(store: Arc<TaskStateStore>, errors: Arc<ErrorLog>) -> Self {
        Self { store, errors }
    }

    pub fn state_of(&self, task: &str) -> Option<TaskState> {
        self.store.state_of(task)
    }

    pub fn snapshot(&self) -> BTreeMap<TaskName, TaskState> {
        self.store.snapshot()
    }

    /// Number of tasks currently executing.
    pub fn running(&self) -> usize {
        self.snapshot()
            .values()
            .filter(|s| **s == TaskState::Running)
            .count()
    }

    /// Errors recorded so far by the run in progress.
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    /// Message of the first error recorded by the run in progress.
    pub fn first_error(&self) -> Option<String> {
        self.errors.first_message()
    }
}
