// src/errors.rs

//! Crate-wide error type.
//!
//! Construction errors are returned by [`EngineBuilder::build`]; runtime
//! errors are collected by the engine and the first one is surfaced from
//! [`Engine::run`].
//!
//! [`EngineBuilder::build`]: crate::engine::EngineBuilder::build
//! [`Engine::run`]: crate::engine::Engine::run

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DagrunError {
    #[error("no task handler function provided")]
    MissingHandler,

    #[error("multiple tasks with id '{0}'")]
    DuplicateTask(String),

    #[error("tasks cannot wait for themselves, please check task(s) '{}'", .0.join("','"))]
    SelfDependency(Vec<String>),

    #[error("tasks must include at least one task that does not wait for other tasks")]
    NoRootTask,

    #[error(
        "the following tasks do not exist but are referred to in wait_for of other tasks: {}",
        .0.join(", ")
    )]
    MissingDependencies(Vec<String>),

    #[error("task with id '{0}' does not exist")]
    UnknownTask(String),

    #[error("task '{task}' failed: {source}")]
    TaskFailed {
        task: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("task '{0}' panicked")]
    TaskPanicked(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Cycle detected in DAG: {0}")]
    DagCycle(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DagrunError {
    /// The task this error is about, if it is a per-task runtime error.
    pub fn task(&self) -> Option<&str> {
        match self {
            DagrunError::UnknownTask(task)
            | DagrunError::TaskPanicked(task)
            | DagrunError::TaskFailed { task, .. } => Some(task.as_str()),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, DagrunError>;
