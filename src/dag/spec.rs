// src/dag/spec.rs

use crate::engine::TaskName;

/// Caller-supplied description of one task.
///
/// ```
/// use dagrun::dag::TaskSpec;
///
/// let spec = TaskSpec::new("build").wait_for("fetch").wait_for("configure");
/// assert_eq!(spec.wait_for, vec!["fetch", "configure"]);
/// assert!(!spec.skip);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskSpec {
    pub id: TaskName,
    /// Tasks that must be done before this one may start.
    pub wait_for: Vec<TaskName>,
    /// Treat the task as already done; its handler is never invoked.
    pub skip: bool,
}

impl TaskSpec {
    pub fn new(id: impl Into<TaskName>) -> Self {
        Self {
            id: id.into(),
            wait_for: Vec::new(),
            skip: false,
        }
    }

    pub fn wait_for(mut self, dep: impl Into<TaskName>) -> Self {
        self.wait_for.push(dep.into());
        self
    }

    pub fn wait_for_all<I, S>(mut self, deps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<TaskName>,
    {
        self.wait_for.extend(deps.into_iter().map(Into::into));
        self
    }

    pub fn skip(mut self, skip: bool) -> Self {
        self.skip = skip;
        self
    }

    /// A root task waits for nothing.
    pub fn is_root(&self) -> bool {
        self.wait_for.is_empty()
    }
}
