// src/engine/mod.rs

//! Execution engine.
//!
//! This module ties together:
//! - construction and validation ([`EngineBuilder`])
//! - the runtime loop that reacts to task completion events ([`runtime`])
//! - error aggregation ([`ErrorLog`])
//! - reporting ([`RunReport`], [`StatusHandle`])

use crate::errors::DagrunError;

/// Canonical task name type used throughout the engine.
pub type TaskName = String;

/// Outcome of one task execution, as seen by the scheduler.
#[derive(Debug)]
pub enum TaskOutcome {
    Success,
    Failed(DagrunError),
}

impl TaskOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, TaskOutcome::Success)
    }
}

/// Events flowing into the runtime loop from execution units.
#[derive(Debug)]
pub enum RuntimeEvent {
    /// A task's handler returned (or its unit gave up). Sent exactly once
    /// per dispatched task.
    TaskCompleted {
        task: TaskName,
        outcome: TaskOutcome,
    },
}

pub mod builder;
pub mod error_log;
pub mod report;
pub mod runtime;

pub use builder::{Engine, EngineBuilder};
pub use error_log::ErrorLog;
pub use report::{RunReport, StatusHandle};
pub use runtime::Runtime;
