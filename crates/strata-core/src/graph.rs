//! Component reference graph analysis using petgraph

use std::collections::HashMap;

use petgraph::algo::kosaraju_scc;
use petgraph::graph::{DiGraph, NodeIndex};

use crate::program::Program;

/// Directed graph of component references, one edge per referencing pair
#[derive(Debug)]
pub struct ReferenceGraph {
    graph: DiGraph<String, ()>,
    indices: HashMap<String, NodeIndex>,
}

impl ReferenceGraph {
    pub fn from_program(program: &Program) -> Self {
        let mut graph = DiGraph::new();
        let mut indices = HashMap::new();

        for name in program.target_components().keys() {
            let idx = graph.add_node(name.clone());
            indices.insert(name.clone(), idx);
        }

        for (name, component) in program.target_components() {
            let Some(&from) = indices.get(name) else {
                continue;
            };
            for referenced in component.referenced_components() {
                if let Some(&to) = indices.get(referenced) {
                    graph.update_edge(from, to, ());
                }
            }
        }

        Self { graph, indices }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn references(&self, from: &str, to: &str) -> bool {
        match (self.indices.get(from), self.indices.get(to)) {
            (Some(&a), Some(&b)) => self.graph.contains_edge(a, b),
            _ => false,
        }
    }

    /// Groups of components that reference each other, including
    /// self-referencing components. Sorted by name.
    pub fn cycles(&self) -> Vec<Vec<String>> {
        let mut cycles: Vec<Vec<String>> = kosaraju_scc(&self.graph)
            .into_iter()
            .filter(|scc| scc.len() > 1 || self.graph.contains_edge(scc[0], scc[0]))
            .map(|scc| self.sorted_names(scc))
            .collect();
        cycles.sort();
        cycles
    }

    /// Component names with referenced components ahead of the components
    /// that reference them. Members of a cycle are emitted together.
    pub fn dependency_order(&self) -> Vec<String> {
        // kosaraju_scc yields components in reverse topological order
        kosaraju_scc(&self.graph)
            .into_iter()
            .flat_map(|scc| self.sorted_names(scc))
            .collect()
    }

    fn sorted_names(&self, scc: Vec<NodeIndex>) -> Vec<String> {
        let mut names: Vec<String> = scc.into_iter().map(|idx| self.graph[idx].clone()).collect();
        names.sort();
        names
    }
}

impl Program {
    pub fn reference_graph(&self) -> ReferenceGraph {
        ReferenceGraph::from_program(self)
    }

    pub fn reference_cycles(&self) -> Vec<Vec<String>> {
        self.reference_graph().cycles()
    }

    pub fn dependency_order(&self) -> Vec<String> {
        self.reference_graph().dependency_order()
    }
}
