// src/dag/scheduler.rs

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::dag::graph::TaskGraph;
use crate::dag::spec::TaskSpec;
use crate::dag::state_store::{TaskState, TaskStateStore};
use crate::dag::validate::validate_tasks;
use crate::engine::{TaskName, TaskOutcome};
use crate::errors::Result;

/// Scheduler holds the immutable graph plus the shared state store.
///
/// It is responsible for:
/// - finding the tasks that can start when a run begins
/// - marking tasks done or failed as completions arrive
/// - starting the dependents a completion unblocks
///
/// It performs no IO and spawns nothing; the runtime turns the returned ids
/// into running tasks.
#[derive(Debug)]
pub struct Scheduler {
    graph: TaskGraph,
    store: Arc<TaskStateStore>,
}

impl Scheduler {
    /// Validate `specs` and build a scheduler over them.
    pub fn from_specs(specs: Vec<TaskSpec>) -> Result<Self> {
        let validated = validate_tasks(specs)?;
        let graph = TaskGraph::from_specs(&validated.specs);

        if let Some(task) = graph.find_cycle() {
            warn!(
                task = %task,
                "dependency cycle detected; tasks on the cycle will never start"
            );
        }

        Ok(Self {
            graph,
            store: Arc::new(TaskStateStore::new(validated.table)),
        })
    }

    pub fn graph(&self) -> &TaskGraph {
        &self.graph
    }

    pub fn store(&self) -> &Arc<TaskStateStore> {
        &self.store
    }

    pub fn state_of(&self, task: &str) -> Option<TaskState> {
        self.store.state_of(task)
    }

    /// Start every task that is eligible right now.
    ///
    /// Called once at the beginning of a run. Returns the started ids, sorted.
    pub fn start(&self) -> Vec<TaskName> {
        let ready = self.store.start_all_ready();
        info!(?ready, "initial tasks ready to run");
        ready
    }

    /// Record the outcome of a finished task and start whatever it unblocks.
    ///
    /// Only the direct dependents of `task` are considered; nothing else can
    /// have become eligible because of this completion. A failed task
    /// unblocks nothing.
    pub fn handle_completion(&self, task: &str, outcome: &TaskOutcome) -> Vec<TaskName> {
        if !outcome.is_success() {
            if self.store.mark_failed(task) {
                let blocked = self.graph.dependents_of(task);
                if !blocked.is_empty() {
                    warn!(task = %task, ?blocked, "task failed; dependents will not run");
                }
            }
            return Vec::new();
        }

        if !self.store.mark_done(task) {
            return Vec::new();
        }

        let newly_ready = self.store.start_ready_among(self.graph.dependents_of(task));
        if !newly_ready.is_empty() {
            debug!(task = %task, ?newly_ready, "completion unblocked dependents");
        }
        newly_ready
    }
}
