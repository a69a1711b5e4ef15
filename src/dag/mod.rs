// src/dag/mod.rs

//! Task graph validation, state, and scheduling.
//!
//! - [`spec`] holds the caller-facing [`TaskSpec`].
//! - [`validate`] turns specs into the initial task table or a construction
//!   error.
//! - [`graph`] keeps dependency / dependent adjacency, cycle diagnostics and
//!   execution layers.
//! - [`state_store`] is the lock-protected runtime state with atomic
//!   transitions.
//! - [`scheduler`] decides which tasks start when a run begins and when a
//!   task completes.

pub mod graph;
pub mod scheduler;
pub mod spec;
pub mod state_store;
pub(crate) mod validate;

pub use graph::TaskGraph;
pub use scheduler::Scheduler;
pub use spec::TaskSpec;
pub use state_store::{TaskState, TaskStateStore};
