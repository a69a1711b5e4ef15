// src/exec/mod.rs

//! Task execution layer.
//!
//! - [`handler`] defines the `TaskHandler` trait the engine calls for each
//!   task id.
//! - [`unit`] spawns one tokio task per dispatched task and reports its
//!   outcome back to the runtime loop.
//! - [`shell`] provides `ShellHandler`, which runs a shell command per task
//!   using `tokio::process::Command`.

pub mod handler;
pub mod shell;
pub mod unit;

pub use handler::{HandlerFuture, TaskHandler};
pub use shell::ShellHandler;
pub use unit::spawn_task_unit;
