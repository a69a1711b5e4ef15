// src/dag/state_store.rs

//! Lock-protected per-task runtime state.
//!
//! Every read or write goes through one mutex. Callers never get raw access
//! to a task's flags; they ask for a transition (`try_start`, `mark_done`,
//! `mark_failed`) and the check and the mutation happen in the same critical
//! section. This is what keeps a task from being launched twice.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{debug, warn};

use crate::dag::spec::TaskSpec;
use crate::engine::TaskName;

/// Mutable runtime state of a single task (internal).
#[derive(Debug, Clone)]
pub(crate) struct TaskRuntime {
    pub wait_for: Vec<TaskName>,
    pub started: bool,
    pub done: bool,
    pub failed: bool,
    pub skipped: bool,
}

impl TaskRuntime {
    pub fn from_spec(spec: &TaskSpec) -> Self {
        Self {
            wait_for: spec.wait_for.clone(),
            started: spec.skip,
            done: spec.skip,
            failed: false,
            skipped: spec.skip,
        }
    }
}

/// Public, read-only view of a task's state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    /// Not started yet; waiting on dependencies (possibly forever, if one of
    /// them failed).
    Pending,
    /// Handler is currently executing.
    Running,
    /// Handler returned successfully.
    Done,
    /// Handler failed or panicked.
    Failed,
    /// Marked `skip`; counts as done from the start.
    Skipped,
}

impl From<&TaskRuntime> for TaskState {
    fn from(rt: &TaskRuntime) -> Self {
        if rt.skipped {
            TaskState::Skipped
        } else if rt.failed {
            TaskState::Failed
        } else if rt.done {
            TaskState::Done
        } else if rt.started {
            TaskState::Running
        } else {
            TaskState::Pending
        }
    }
}

#[derive(Debug)]
pub struct TaskStateStore {
    tasks: Mutex<HashMap<TaskName, TaskRuntime>>,
}

impl TaskStateStore {
    pub(crate) fn new(tasks: HashMap<TaskName, TaskRuntime>) -> Self {
        Self {
            tasks: Mutex::new(tasks),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<TaskName, TaskRuntime>> {
        // A panic while holding the lock cannot leave a half-applied
        // transition behind: every transition is a single flag write.
        self.tasks.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.lock().contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// All task ids, sorted.
    pub fn task_ids(&self) -> Vec<TaskName> {
        let mut ids: Vec<TaskName> = self.lock().keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Mark `id` as started if it is pending and every dependency is done.
    ///
    /// Returns `true` only for the caller that performed the transition.
    pub fn try_start(&self, id: &str) -> bool {
        let mut tasks = self.lock();
        try_start_locked(&mut tasks, id)
    }

    /// Scan the whole table and start every eligible task.
    ///
    /// The scan holds the lock for its whole duration, so it sees one
    /// consistent table. Returned ids are sorted.
    pub fn start_all_ready(&self) -> Vec<TaskName> {
        let mut tasks = self.lock();
        let mut ids: Vec<TaskName> = tasks.keys().cloned().collect();
        ids.sort();
        ids.into_iter()
            .filter(|id| try_start_locked(&mut tasks, id))
            .collect()
    }

    /// Start the eligible tasks among `candidates` (in the given order).
    pub fn start_ready_among(&self, candidates: &[TaskName]) -> Vec<TaskName> {
        let mut tasks = self.lock();
        candidates
            .iter()
            .filter(|id| try_start_locked(&mut tasks, id))
            .cloned()
            .collect()
    }

    /// Running → Done. Returns `false` (and leaves state untouched) if the
    /// task is unknown or not currently running.
    pub fn mark_done(&self, id: &str) -> bool {
        let mut tasks = self.lock();
        match tasks.get_mut(id) {
            Some(rt) if rt.started && !rt.done && !rt.failed => {
                rt.done = true;
                debug!(task = %id, "marked done");
                true
            }
            Some(_) => {
                warn!(task = %id, "mark_done on a task that is not running; ignoring");
                false
            }
            None => {
                warn!(task = %id, "mark_done on unknown task; ignoring");
                false
            }
        }
    }

    /// Running → Failed. Same contract as [`mark_done`](Self::mark_done).
    pub fn mark_failed(&self, id: &str) -> bool {
        let mut tasks = self.lock();
        match tasks.get_mut(id) {
            Some(rt) if rt.started && !rt.done && !rt.failed => {
                rt.failed = true;
                debug!(task = %id, "marked failed");
                true
            }
            Some(_) => {
                warn!(task = %id, "mark_failed on a task that is not running; ignoring");
                false
            }
            None => {
                warn!(task = %id, "mark_failed on unknown task; ignoring");
                false
            }
        }
    }

    pub fn state_of(&self, id: &str) -> Option<TaskState> {
        self.lock().get(id).map(TaskState::from)
    }

    /// Consistent copy of every task's state.
    pub fn snapshot(&self) -> BTreeMap<TaskName, TaskState> {
        self.lock()
            .iter()
            .map(|(id, rt)| (id.clone(), TaskState::from(rt)))
            .collect()
    }
}

fn try_start_locked(tasks: &mut HashMap<TaskName, TaskRuntime>, id: &str) -> bool {
    let eligible = match tasks.get(id) {
        None => return false,
        Some(rt) if rt.done || rt.started => false,
        Some(rt) => rt
            .wait_for
            .iter()
            .all(|dep| tasks.get(dep).is_some_and(|d| d.done)),
    };

    if !eligible {
        return false;
    }

    if let Some(rt) = tasks.get_mut(id) {
        rt.started = true;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(specs: &[TaskSpec]) -> TaskStateStore {
        TaskStateStore::new(
            specs
                .iter()
                .map(|s| (s.id.clone(), TaskRuntime::from_spec(s)))
                .collect(),
        )
    }

    #[test]
    fn start_all_ready_only_starts_roots() {
        let s = store(&[
            TaskSpec::new("a"),
            TaskSpec::new("b").wait_for("a"),
            TaskSpec::new("c"),
        ]);

        assert_eq!(s.start_all_ready(), vec!["a", "c"]);
        assert_eq!(s.state_of("b"), Some(TaskState::Pending));
        // Second scan finds nothing new.
        assert!(s.start_all_ready().is_empty());
    }

    #[test]
    fn try_start_is_one_shot() {
        let s = store(&[TaskSpec::new("a")]);
        assert!(s.try_start("a"));
        assert!(!s.try_start("a"));
        assert!(!s.try_start("missing"));
    }

    #[test]
    fn dependents_become_eligible_after_done() {
        let s = store(&[TaskSpec::new("a"), TaskSpec::new("b").wait_for("a")]);
        assert!(s.try_start("a"));
        assert!(!s.try_start("b"));

        assert!(s.mark_done("a"));
        assert!(s.try_start("b"));
        assert_eq!(s.state_of("b"), Some(TaskState::Running));
    }

    #[test]
    fn failed_dependency_never_unblocks() {
        let s = store(&[TaskSpec::new("a"), TaskSpec::new("b").wait_for("a")]);
        assert!(s.try_start("a"));
        assert!(s.mark_failed("a"));

        assert!(!s.try_start("b"));
        assert!(!s.mark_done("a"), "failed is terminal");
        assert_eq!(s.state_of("a"), Some(TaskState::Failed));
    }

    #[test]
    fn skipped_tasks_satisfy_dependents() {
        let s = store(&[
            TaskSpec::new("a").skip(true),
            TaskSpec::new("b").wait_for("a"),
        ]);

        assert_eq!(s.start_all_ready(), vec!["b"]);
        assert_eq!(s.state_of("a"), Some(TaskState::Skipped));
        assert!(!s.mark_done("a"));
    }

    #[test]
    fn mark_done_requires_running() {
        let s = store(&[TaskSpec::new("a")]);
        assert!(!s.mark_done("a"));
        assert_eq!(s.state_of("a"), Some(TaskState::Pending));
    }
}
