//! Task graph with phase barriers.
//!
//! Pipelines are DAGs over [`TaskId`]. A node runs once every node it
//! depends on has finished; nodes of the same dependency level form a phase
//! and run concurrently.
//!
//! ```text
//! dev:   clean → fonts → { html css js images svg-sprites watch } → serve
//! prod:  clean → { html css-prod js-prod images-prod fonts svg-sprites-prod }
//! start: otf2ttf → fonts-style
//! ```

mod pipeline;
mod runner;

pub use pipeline::pipeline;
pub use runner::run;

use petgraph::{
    Direction,
    algo::{has_path_connecting, toposort},
    graph::{DiGraph, NodeIndex},
};
use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::tasks::TaskId;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GraphError {
    #[error("task `{0}` is not part of the graph")]
    Unknown(TaskId),

    #[error("dependency cycle through `{0}`")]
    Cycle(TaskId),

    #[error("`clean` must run before `{0}`")]
    CleanNotFirst(TaskId),
}

/// Directed acyclic graph of tasks; an edge `a → b` means `b` waits for `a`.
#[derive(Debug, Default, Clone)]
pub struct TaskGraph {
    graph: DiGraph<TaskId, ()>,
    nodes: FxHashMap<TaskId, NodeIndex>,
}

impl TaskGraph {
    pub fn builder() -> PhaseBuilder {
        PhaseBuilder::default()
    }

    /// Add a task, returning the existing node if already present.
    pub fn add_task(&mut self, task: TaskId) -> NodeIndex {
        *self
            .nodes
            .entry(task)
            .or_insert_with(|| self.graph.add_node(task))
    }

    /// Make `task` wait for `prerequisite`.
    pub fn add_dependency(&mut self, task: TaskId, prerequisite: TaskId) -> Result<(), GraphError> {
        let to = self.index(task)?;
        let from = self.index(prerequisite)?;
        self.graph.update_edge(from, to, ());
        Ok(())
    }

    fn index(&self, task: TaskId) -> Result<NodeIndex, GraphError> {
        self.nodes.get(&task).copied().ok_or(GraphError::Unknown(task))
    }

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn contains(&self, task: TaskId) -> bool {
        self.nodes.contains_key(&task)
    }

    /// Check ordering invariants: acyclic, and `clean` precedes every other
    /// task when it is present.
    pub fn validate(&self) -> Result<(), GraphError> {
        toposort(&self.graph, None).map_err(|cycle| GraphError::Cycle(self.graph[cycle.node_id()]))?;

        if let Some(&clean) = self.nodes.get(&TaskId::Clean) {
            for node in self.graph.node_indices().filter(|&n| n != clean) {
                if !has_path_connecting(&self.graph, clean, node, None) {
                    return Err(GraphError::CleanNotFirst(self.graph[node]));
                }
            }
        }
        Ok(())
    }

    /// Tasks grouped by dependency level (longest path from a root).
    ///
    /// Every task of level `n` depends only on tasks of levels `< n`.
    pub fn levels(&self) -> Result<Vec<Vec<TaskId>>, GraphError> {
        let order = toposort(&self.graph, None)
            .map_err(|cycle| GraphError::Cycle(self.graph[cycle.node_id()]))?;

        let mut depth: FxHashMap<NodeIndex, usize> = FxHashMap::default();
        for &node in &order {
            let level = self
                .graph
                .neighbors_directed(node, Direction::Incoming)
                .map(|pred| depth[&pred] + 1)
                .max()
                .unwrap_or(0);
            depth.insert(node, level);
        }

        let count = depth.values().max().map_or(0, |max| max + 1);
        let mut levels = vec![Vec::new(); count];
        for (node, level) in depth {
            levels[level].push(self.graph[node]);
        }
        for level in &mut levels {
            level.sort();
        }
        Ok(levels)
    }
}

/// Sequential/concurrent phase builder.
///
/// `then(a).parallel([b, c]).then(d)` makes `b` and `c` wait for `a`, and
/// `d` wait for both.
#[derive(Debug, Default)]
pub struct PhaseBuilder {
    graph: TaskGraph,
    previous: Vec<TaskId>,
}

impl PhaseBuilder {
    pub fn then(self, task: TaskId) -> Self {
        self.parallel([task])
    }

    pub fn parallel<I: IntoIterator<Item = TaskId>>(mut self, tasks: I) -> Self {
        let phase: Vec<TaskId> = tasks.into_iter().collect();
        for &task in &phase {
            self.graph.add_task(task);
        }
        for &task in &phase {
            for &before in &self.previous {
                // Both ends were added above or in an earlier phase.
                let _ = self.graph.add_dependency(task, before);
            }
        }
        if !phase.is_empty() {
            self.previous = phase;
        }
        self
    }

    pub fn build(self) -> Result<TaskGraph, GraphError> {
        self.graph.validate()?;
        Ok(self.graph)
    }
}
