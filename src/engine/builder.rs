// src/engine/builder.rs

use std::fmt;
use std::sync::Arc;

use tracing::info;

use crate::dag::{Scheduler, TaskGraph, TaskSpec};
use crate::engine::error_log::ErrorLog;
use crate::engine::report::{RunReport, StatusHandle};
use crate::engine::runtime::Runtime;
use crate::engine::TaskName;
use crate::errors::{DagrunError, Result};
use crate::exec::TaskHandler;

/// Collects a handler and task specs, then validates them into an [`Engine`].
///
/// ```
/// use dagrun::dag::TaskSpec;
/// use dagrun::engine::EngineBuilder;
///
/// let engine = EngineBuilder::new()
///     .handler(|id: String| async move {
///         println!("running {id}");
///         anyhow::Ok(())
///     })
///     .task(TaskSpec::new("fetch"))
///     .task(TaskSpec::new("build").wait_for("fetch"))
///     .build()
///     .unwrap();
///
/// assert_eq!(engine.task_ids(), vec!["build", "fetch"]);
/// ```
#[derive(Default)]
pub struct EngineBuilder {
    handler: Option<Arc<dyn TaskHandler>>,
    tasks: Vec<TaskSpec>,
}

impl fmt::Debug for EngineBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineBuilder")
            .field("has_handler", &self.handler.is_some())
            .field("tasks", &self.tasks)
            .finish()
    }
}

impl EngineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handler<H: TaskHandler>(mut self, handler: H) -> Self {
        self.handler = Some(Arc::new(handler));
        self
    }

    pub fn task(mut self, spec: TaskSpec) -> Self {
        self.tasks.push(spec);
        self
    }

    pub fn tasks(mut self, specs: impl IntoIterator<Item = TaskSpec>) -> Self {
        self.tasks.extend(specs);
        self
    }

    /// Validate the task set and produce a ready-to-run engine.
    ///
    /// A missing handler is reported before anything about the tasks.
    pub fn build(self) -> Result<Engine> {
        let handler = self.handler.ok_or(DagrunError::MissingHandler)?;
        let scheduler = Scheduler::from_specs(self.tasks)?;

        info!(tasks = scheduler.store().len(), "engine constructed");

        Ok(Engine {
            scheduler,
            handler,
            errors: Arc::new(ErrorLog::new()),
        })
    }
}

/// A validated task set bound to a handler. Consumed by `run`.
pub struct Engine {
    scheduler: Scheduler,
    handler: Arc<dyn TaskHandler>,
    errors: Arc<ErrorLog>,
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("scheduler", &self.scheduler)
            .finish_non_exhaustive()
    }
}

impl Engine {
    /// Shorthand for `EngineBuilder::new().handler(h).tasks(specs).build()`.
    pub fn new<H: TaskHandler>(
        handler: H,
        tasks: impl IntoIterator<Item = TaskSpec>,
    ) -> Result<Self> {
        EngineBuilder::new().handler(handler).tasks(tasks).build()
    }

    /// All task ids, sorted.
    pub fn task_ids(&self) -> Vec<TaskName> {
        self.scheduler.store().task_ids()
    }

    pub fn len(&self) -> usize {
        self.scheduler.store().len()
    }

    pub fn is_empty(&self) -> bool {
        self.scheduler.store().is_empty()
    }

    pub fn graph(&self) -> &TaskGraph {
        self.scheduler.graph()
    }

    /// Handle for observing task states and recorded errors, including
    /// while `run` is in progress on another task.
    pub fn status(&self) -> StatusHandle {
        StatusHandle::new(Arc::clone(self.scheduler.store()), Arc::clone(&self.errors))
    }

    /// Run every task to completion.
    ///
    /// Returns the first recorded failure, after all in-flight work has
    /// finished. A failure never stops independent branches.
    pub async fn run(self) -> Result<()> {
        self.run_with_report().await.into_result()
    }

    /// Like [`run`](Self::run), but returns the full [`RunReport`].
    pub async fn run_with_report(self) -> RunReport {
        Runtime::new(self.scheduler, self.handler, self.errors).run().await
    }

    /// Block the calling thread on a fresh multi-threaded tokio runtime.
    ///
    /// Panics if called from within an async context, like any nested
    /// `block_on`.
    pub fn run_blocking(self) -> Result<()> {
        let rt = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()?;
        rt.block_on(self.run())
    }
}
