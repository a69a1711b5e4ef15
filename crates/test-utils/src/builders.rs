#![allow(dead_code)]

use dagrun::dag::TaskSpec;

/// `TaskSpec` with the given dependencies.
pub fn spec(id: &str, wait_for: &[&str]) -> TaskSpec {
    TaskSpec::new(id).wait_for_all(wait_for.iter().copied())
}

/// A linear chain: each task waits for the one before it.
pub fn chain(ids: &[&str]) -> Vec<TaskSpec> {
    ids.iter()
        .enumerate()
        .map(|(i, id)| match i {
            0 => spec(id, &[]),
            _ => spec(id, &[ids[i - 1]]),
        })
        .collect()
}

/// Builder for a task set, for tests that read better as a list of edges.
#[derive(Debug, Default)]
pub struct TaskSetBuilder {
    specs: Vec<TaskSpec>,
}

impl TaskSetBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn root(mut self, id: &str) -> Self {
        self.specs.push(TaskSpec::new(id));
        self
    }

    pub fn task(mut self, id: &str, wait_for: &[&str]) -> Self {
        self.specs.push(spec(id, wait_for));
        self
    }

    pub fn skipped(mut self, id: &str, wait_for: &[&str]) -> Self {
        self.specs.push(spec(id, wait_for).skip(true));
        self
    }

    pub fn build(self) -> Vec<TaskSpec> {
        self.specs
    }
}
