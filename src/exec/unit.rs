// src/exec/unit.rs

//! One execution unit per dispatched task.

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::dag::TaskStateStore;
use crate::engine::{RuntimeEvent, TaskName, TaskOutcome};
use crate::errors::DagrunError;
use crate::exec::handler::TaskHandler;

/// Spawn the unit that runs `task` through `handler`.
///
/// The unit sends exactly one `TaskCompleted` event on every path: success,
/// handler error, unknown id, or a panic inside the handler.
pub fn spawn_task_unit(
    task: TaskName,
    handler: Arc<dyn TaskHandler>,
    store: Arc<TaskStateStore>,
    runtime_tx: mpsc::Sender<RuntimeEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let outcome = execute(&task, handler, &store).await;

        if runtime_tx
            .send(RuntimeEvent::TaskCompleted {
                task: task.clone(),
                outcome,
            })
            .await
            .is_err()
        {
            warn!(task = %task, "runtime loop closed before completion could be delivered");
        }
    })
}

async fn execute(task: &str, handler: Arc<dyn TaskHandler>, store: &TaskStateStore) -> TaskOutcome {
    if !store.contains(task) {
        error!(task = %task, "execution requested for unknown task");
        return TaskOutcome::Failed(DagrunError::UnknownTask(task.to_string()));
    }

    info!(task = %task, "task started");
    let started = Instant::now();

    // The handler runs in its own tokio task so that a panic, even one raised
    // before its future is first polled, surfaces here as a JoinError.
    let name = task.to_string();
    let joined = tokio::spawn(async move { handler.handle(name).await }).await;
    let elapsed_ms = started.elapsed().as_millis() as u64;

    match joined {
        Ok(Ok(())) => {
            info!(task = %task, elapsed_ms, "task finished");
            TaskOutcome::Success
        }
        Ok(Err(source)) => {
            warn!(task = %task, elapsed_ms, error = %source, "task failed");
            TaskOutcome::Failed(DagrunError::TaskFailed {
                task: task.to_string(),
                source,
            })
        }
        Err(join_err) if join_err.is_panic() => {
            error!(task = %task, elapsed_ms, "task handler panicked");
            TaskOutcome::Failed(DagrunError::TaskPanicked(task.to_string()))
        }
        Err(join_err) => {
            debug!(task = %task, error = %join_err, "task handler was cancelled");
            TaskOutcome::Failed(DagrunError::Other(anyhow::Error::new(join_err)))
        }
    }
}
