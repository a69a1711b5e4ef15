// src/engine/runtime.rs

use std::fmt;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::dag::Scheduler;
use crate::engine::error_log::ErrorLog;
use crate::engine::report::RunReport;
use crate::engine::{RuntimeEvent, TaskName, TaskOutcome};
use crate::exec::{spawn_task_unit, TaskHandler};

/// Capacity of the completion event channel.
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Drives the scheduler in response to completion events and delegates the
/// actual work to a [`TaskHandler`].
///
/// This is the only place that reacts to completions: units report back over
/// one channel, and the loop decides what starts next. The loop owns the
/// count of outstanding units and returns once it drops to zero.
pub struct Runtime {
    scheduler: Scheduler,
    handler: Arc<dyn TaskHandler>,
    errors: Arc<ErrorLog>,
    event_tx: mpsc::Sender<RuntimeEvent>,
    event_rx: mpsc::Receiver<RuntimeEvent>,
    in_flight: usize,
}

impl fmt::Debug for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("scheduler", &self.scheduler)
            .field("in_flight", &self.in_flight)
            .field("errors", &self.errors.len())
            .finish_non_exhaustive()
    }
}

impl Runtime {
    pub fn new(
        scheduler: Scheduler,
        handler: Arc<dyn TaskHandler>,
        errors: Arc<ErrorLog>,
    ) -> Self {
        let (event_tx, event_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            scheduler,
            handler,
            errors,
            event_tx,
            event_rx,
            in_flight: 0,
        }
    }

    /// Main event loop.
    ///
    /// - Starts every initially eligible task.
    /// - Consumes `RuntimeEvent`s until no unit is outstanding.
    /// - Returns a report built from the final task states.
    pub async fn run(mut self) -> RunReport {
        info!(tasks = self.scheduler.store().len(), "dagrun runtime started");

        let ready = self.scheduler.start();
        self.dispatch(ready);

        while self.in_flight > 0 {
            let event = match self.event_rx.recv().await {
                Some(e) => e,
                None => {
                    // The loop keeps its own sender alive, so this is unreachable
                    // in practice.
                    warn!(in_flight = self.in_flight, "runtime event channel closed; exiting");
                    break;
                }
            };

            debug!(?event, "runtime received event");
            self.handle_event(event);
        }

        let report = RunReport::from_snapshot(
            self.scheduler.store().snapshot(),
            self.errors.take(),
        );

        info!(
            completed = report.completed.len(),
            skipped = report.skipped.len(),
            failed = report.failed.len(),
            blocked = report.blocked.len(),
            "run finished"
        );

        report
    }

    fn handle_event(&mut self, event: RuntimeEvent) {
        match event {
            RuntimeEvent::TaskCompleted { task, outcome } => {
                self.in_flight = self.in_flight.saturating_sub(1);

                let newly_ready = self.scheduler.handle_completion(&task, &outcome);
                if let TaskOutcome::Failed(err) = outcome {
                    self.errors.record(err);
                }

                self.dispatch(newly_ready);
            }
        }
    }

    fn dispatch(&mut self, tasks: Vec<TaskName>) {
        if tasks.is_empty() {
            return;
        }

        debug!(?tasks, in_flight = self.in_flight, "dispatching ready tasks");

        for task in tasks {
            self.in_flight += 1;
            spawn_task_unit(
                task,
                Arc::clone(&self.handler),
                Arc::clone(self.scheduler.store()),
                self.event_tx.clone(),
            );
        }
    }
}
