// src/exec/handler.rs

//! Pluggable task handler abstraction.
//!
//! The engine never knows what a task *does*; it hands the task id to a
//! `TaskHandler` and waits for the returned future.
//!
//! - Any `Fn(TaskName) -> impl Future<Output = anyhow::Result<()>>` closure
//!   is a handler.
//! - [`ShellHandler`](crate::exec::ShellHandler) runs one shell command per
//!   task and is what the `dagrun` binary uses.
//! - Tests provide their own handlers that record invocation order.

use std::future::Future;
use std::pin::Pin;

use crate::engine::TaskName;

/// Future returned by a [`TaskHandler`].
pub type HandlerFuture = Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + 'static>>;

/// Performs the work for a single task id.
///
/// The future is spawned on its own tokio task, so a handler that panics is
/// reported as a failed task rather than taking the engine down.
pub trait TaskHandler: Send + Sync + 'static {
    fn handle(&self, task: TaskName) -> HandlerFuture;
}

impl<F, Fut> TaskHandler for F
where
    F: Fn(TaskName) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    fn handle(&self, task: TaskName) -> HandlerFuture {
        Box::pin((self)(task))
    }
}
