//! Consumes-dependency graph
//!
//! Builds a directed graph over the collection's `consumes` edges and
//! answers the structural questions the integrity validator and impact
//! analysis need: who consumes whom, what is transitively affected by a
//! change, and which components form circular consume chains.

use std::collections::{HashMap, HashSet};

use petgraph::algo::kosaraju_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;

use crate::component::{Component, ComponentId};

/// A component reached by the dependents closure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImpactNode {
    pub id: ComponentId,
    pub depth: usize,
}

/// Directed graph of consume relationships (edge: consumer -> consumed)
pub struct ConsumesGraph {
    graph: DiGraph<ComponentId, ()>,
    node_indices: HashMap<ComponentId, NodeIndex>,
}

impl ConsumesGraph {
    /// Build the graph from a collection snapshot.
    ///
    /// Edges pointing at ids that do not exist in the snapshot are skipped;
    /// the integrity validator reports those separately.
    pub fn build(components: &[Component]) -> Self {
        let mut graph = DiGraph::new();
        let mut node_indices = HashMap::new();

        for component in components {
            let idx = graph.add_node(component.id.clone());
            node_indices.insert(component.id.clone(), idx);
        }

        for component in components {
            let from = node_indices[&component.id];
            for consumed_id in &component.consumes {
                if let Some(&to) = node_indices.get(consumed_id) {
                    graph.add_edge(from, to, ());
                }
            }
        }

        Self { graph, node_indices }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Ids a component directly consumes (that exist in the snapshot)
    pub fn dependencies_of(&self, id: &str) -> Vec<&ComponentId> {
        self.neighbors(id, Direction::Outgoing)
    }

    /// Ids of components that directly consume the given one
    pub fn consumers_of(&self, id: &str) -> Vec<&ComponentId> {
        self.neighbors(id, Direction::Incoming)
    }

    fn neighbors(&self, id: &str, direction: Direction) -> Vec<&ComponentId> {
        let Some(&idx) = self.node_indices.get(id) else {
            return Vec::new();
        };
        self.graph
            .edges_directed(idx, direction)
            .filter_map(|e| {
                let other = match direction {
                    Direction::Outgoing => e.target(),
                    Direction::Incoming => e.source(),
                };
                self.graph.node_weight(other)
            })
            .collect()
    }

    /// Every component transitively affected when the given one changes
    /// (its consumers, their consumers, and so on), sorted by distance
    pub fn dependents_closure(&self, id: &str) -> Vec<ImpactNode> {
        let Some(&start) = self.node_indices.get(id) else {
            return Vec::new();
        };

        let mut result = Vec::new();
        let mut visited = HashSet::new();
        let mut stack = vec![(start, 0usize)];

        while let Some((idx, depth)) = stack.pop() {
            if !visited.insert(idx) {
                continue;
            }
            if idx != start {
                if let Some(node_id) = self.graph.node_weight(idx) {
                    result.push(ImpactNode { id: node_id.clone(), depth });
                }
            }
            for edge in self.graph.edges_directed(idx, Direction::Incoming) {
                stack.push((edge.source(), depth + 1));
            }
        }

        result.sort_by(|a, b| a.depth.cmp(&b.depth).then_with(|| a.id.cmp(&b.id)));
        result
    }

    /// Circular consume chains: SCCs with more than one member, plus
    /// single components that consume themselves
    pub fn cycles(&self) -> Vec<Vec<ComponentId>> {
        let mut cycles = Vec::new();

        for scc in kosaraju_scc(&self.graph) {
            if scc.len() > 1 {
                let mut members: Vec<ComponentId> = scc
                    .iter()
                    .filter_map(|idx| self.graph.node_weight(*idx).cloned())
                    .collect();
                members.sort();
                cycles.push(members);
            } else if let [only] = scc[..] {
                let self_loop = self
                    .graph
                    .edges_directed(only, Direction::Outgoing)
                    .any(|e| e.target() == only);
                if self_loop {
                    if let Some(id) = self.graph.node_weight(only) {
                        cycles.push(vec![id.clone()]);
                    }
                }
            }
        }

        cycles.sort();
        cycles
    }
}
