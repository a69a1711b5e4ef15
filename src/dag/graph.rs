// src/dag/graph.rs

use std::collections::{BTreeMap, HashMap};

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;

use crate::dag::spec::TaskSpec;
use crate::engine::TaskName;
use crate::errors::{DagrunError, Result};

/// Internal node structure: stores immediate deps and dependents.
#[derive(Debug, Clone, Default)]
struct DagNode {
    /// Direct dependencies: tasks that must be done before this one can run.
    deps: Vec<TaskName>,
    /// Direct dependents: tasks that wait for this one.
    dependents: Vec<TaskName>,
}

/// Immutable adjacency of the task set, keyed by task id.
///
/// The scheduler uses `dependents_of` to re-evaluate only the tasks a
/// finished task can possibly unblock.
#[derive(Debug, Clone)]
pub struct TaskGraph {
    nodes: HashMap<TaskName, DagNode>,
}

impl TaskGraph {
    /// Build adjacency from task specs.
    ///
    /// Dependencies on ids that are not in `specs` are kept on the dependent
    /// side only; the validator rejects those sets before a graph is built
    /// for execution.
    pub fn from_specs<'a>(specs: impl IntoIterator<Item = &'a TaskSpec>) -> Self {
        let mut nodes: HashMap<TaskName, DagNode> = HashMap::new();

        for spec in specs {
            let node = nodes.entry(spec.id.clone()).or_default();
            node.deps = spec.wait_for.clone();
        }

        let task_names: Vec<TaskName> = nodes.keys().cloned().collect();
        for task_name in task_names {
            let deps = nodes
                .get(&task_name)
                .map(|n| n.deps.clone())
                .unwrap_or_default();

            for dep in deps {
                if let Some(dep_node) = nodes.get_mut(&dep) {
                    if !dep_node.dependents.contains(&task_name) {
                        dep_node.dependents.push(task_name.clone());
                    }
                }
            }
        }

        for node in nodes.values_mut() {
            node.dependents.sort();
        }

        Self { nodes }
    }

    /// Immediate dependencies of a task (its `wait_for` list).
    pub fn dependencies_of(&self, name: &str) -> &[TaskName] {
        self.nodes
            .get(name)
            .map(|n| n.deps.as_slice())
            .unwrap_or(&[])
    }

    /// Immediate dependents of a task (tasks that list this one in
    /// `wait_for`), sorted.
    pub fn dependents_of(&self, name: &str) -> &[TaskName] {
        self.nodes
            .get(name)
            .map(|n| n.dependents.as_slice())
            .unwrap_or(&[])
    }

    fn as_graph_map(&self) -> DiGraphMap<&str, ()> {
        // Edge direction: dep -> task.
        let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();

        for name in self.nodes.keys() {
            graph.add_node(name.as_str());
        }

        for (name, node) in self.nodes.iter() {
            for dep in node.deps.iter() {
                if let Some((dep_name, _)) = self.nodes.get_key_value(dep) {
                    graph.add_edge(dep_name.as_str(), name.as_str(), ());
                }
            }
        }

        graph
    }

    /// One task that lies on a dependency cycle, if there is any.
    pub fn find_cycle(&self) -> Option<TaskName> {
        toposort(&self.as_graph_map(), None)
            .err()
            .map(|cycle| cycle.node_id().to_string())
    }

    /// Group tasks by depth: layer 0 holds the roots, layer `n` holds tasks
    /// whose longest dependency chain has length `n`. Tasks inside a layer
    /// are sorted.
    ///
    /// Fails with [`DagrunError::DagCycle`] if the graph is not acyclic.
    pub fn layers(&self) -> Result<Vec<Vec<TaskName>>> {
        let graph = self.as_graph_map();
        let order = toposort(&graph, None).map_err(|cycle| {
            DagrunError::DagCycle(format!(
                "cycle detected in task DAG involving task '{}'",
                cycle.node_id()
            ))
        })?;

        let mut depth: HashMap<&str, usize> = HashMap::new();
        for node in order {
            let d = self
                .dependencies_of(node)
                .iter()
                .filter_map(|dep| depth.get(dep.as_str()))
                .map(|d| d + 1)
                .max()
                .unwrap_or(0);
            depth.insert(node, d);
        }

        let mut by_depth: BTreeMap<usize, Vec<TaskName>> = BTreeMap::new();
        for (name, d) in depth {
            by_depth.entry(d).or_default().push(name.to_string());
        }

        Ok(by_depth
            .into_values()
            .map(|mut layer| {
                layer.sort();
                layer
            })
            .collect())
    }
}
