// src/dag/validate.rs

//! Structural validation of a task set.
//!
//! Checks run in a fixed order so the same bad input always produces the
//! same error:
//!
//! 1. duplicate ids (fails on the first duplicate, in input order)
//! 2. no root task
//! 3. tasks that wait for themselves (all of them, in input order)
//! 4. `wait_for` entries naming tasks that don't exist (all of them, sorted)

use std::collections::{BTreeSet, HashMap};

use tracing::debug;

use crate::dag::spec::TaskSpec;
use crate::dag::state_store::TaskRuntime;
use crate::engine::TaskName;
use crate::errors::{DagrunError, Result};

/// Output of a successful validation: the initial task table plus the specs
/// that made it in, in input order.
#[derive(Debug)]
pub(crate) struct ValidatedTasks {
    pub table: HashMap<TaskName, TaskRuntime>,
    pub specs: Vec<TaskSpec>,
}

pub(crate) fn validate_tasks(specs: Vec<TaskSpec>) -> Result<ValidatedTasks> {
    let mut table: HashMap<TaskName, TaskRuntime> = HashMap::with_capacity(specs.len());
    let mut inserted: Vec<TaskSpec> = Vec::with_capacity(specs.len());
    let mut has_root = false;
    let mut wait_for_itself: Vec<TaskName> = Vec::new();

    for spec in specs {
        if table.contains_key(&spec.id) {
            return Err(DagrunError::DuplicateTask(spec.id));
        }

        if spec.wait_for.iter().any(|w| *w == spec.id) {
            wait_for_itself.push(spec.id);
            continue;
        }

        has_root |= spec.is_root();
        table.insert(spec.id.clone(), TaskRuntime::from_spec(&spec));
        inserted.push(spec);
    }

    if !has_root {
        return Err(DagrunError::NoRootTask);
    }

    if !wait_for_itself.is_empty() {
        return Err(DagrunError::SelfDependency(wait_for_itself));
    }

    let missing: BTreeSet<&TaskName> = table
        .values()
        .flat_map(|rt| rt.wait_for.iter())
        .filter(|w| !table.contains_key(*w))
        .collect();

    if !missing.is_empty() {
        return Err(DagrunError::MissingDependencies(
            missing.into_iter().cloned().collect(),
        ));
    }

    debug!(tasks = table.len(), "task set validated");

    Ok(ValidatedTasks {
        table,
        specs: inserted,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_set_has_no_root() {
        assert!(matches!(validate_tasks(vec![]), Err(DagrunError::NoRootTask)));
    }

    #[test]
    fn duplicate_wins_over_self_dependency() {
        let err = validate_tasks(vec![
            TaskSpec::new("a"),
            TaskSpec::new("b").wait_for("b"),
            TaskSpec::new("a"),
        ])
        .unwrap_err();

        assert!(matches!(err, DagrunError::DuplicateTask(ref id) if id == "a"));
    }

    #[test]
    fn no_root_is_reported_before_self_dependency() {
        let err = validate_tasks(vec![TaskSpec::new("a").wait_for("a")]).unwrap_err();
        assert!(matches!(err, DagrunError::NoRootTask));
    }

    #[test]
    fn self_dependency_names_every_offender() {
        let err = validate_tasks(vec![
            TaskSpec::new("root"),
            TaskSpec::new("x").wait_for("root").wait_for("x"),
            TaskSpec::new("y").wait_for("y"),
        ])
        .unwrap_err();

        match err {
            DagrunError::SelfDependency(ids) => assert_eq!(ids, vec!["x", "y"]),
            other => panic!("expected SelfDependency, got {other:?}"),
        }
    }

    #[test]
    fn missing_dependencies_are_sorted_and_unique() {
        let err = validate_tasks(vec![
            TaskSpec::new("root"),
            TaskSpec::new("a").wait_for("zeta").wait_for("alpha"),
            TaskSpec::new("b").wait_for("zeta"),
        ])
        .unwrap_err();

        match err {
            DagrunError::MissingDependencies(ids) => assert_eq!(ids, vec!["alpha", "zeta"]),
            other => panic!("expected MissingDependencies, got {other:?}"),
        }
    }

    #[test]
    fn skip_flag_seeds_started_and_done() {
        let validated = validate_tasks(vec![
            TaskSpec::new("a").skip(true),
            TaskSpec::new("b").wait_for("a"),
        ])
        .unwrap();

        let a = &validated.table["a"];
        assert!(a.started && a.done && a.skipped);
        let b = &validated.table["b"];
        assert!(!b.started && !b.done);
        assert_eq!(validated.specs.len(), 2);
    }
}
