//! Influence graph over dependee and depender paths.

use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{BTreeSet, HashMap, HashSet};

/// Directed graph of influence between configuration objects.
///
/// An edge from a dependee path to a depender path means the depender's
/// activation reads that dependee's state. Nodes are canonical address
/// paths; a path index keeps lookups cheap.
#[derive(Debug, Default)]
pub struct InfluenceGraph {
    graph: DiGraph<String, ()>,
    path_index: HashMap<String, NodeIndex>,
}

impl InfluenceGraph {
    pub fn new() -> Self {
        Self::default()
    }

    fn node(&mut self, path: &str) -> NodeIndex {
        if let Some(&index) = self.path_index.get(path) {
            return index;
        }
        let index = self.graph.add_node(path.to_string());
        self.path_index.insert(path.to_string(), index);
        index
    }

    pub fn add_influence(&mut self, dependee_path: &str, depender_path: &str) {
        let from = self.node(dependee_path);
        let to = self.node(depender_path);
        if !self.graph.contains_edge(from, to) {
            self.graph.add_edge(from, to, ());
        }
    }

    pub fn contains(&self, path: &str) -> bool {
        self.path_index.contains_key(path)
    }

    /// Dependers reading `path` directly.
    pub fn dependers(&self, path: &str) -> BTreeSet<String> {
        let Some(&index) = self.path_index.get(path) else {
            return BTreeSet::new();
        };
        self.graph
            .neighbors(index)
            .map(|neighbor| self.graph[neighbor].clone())
            .collect()
    }

    /// Every depender transitively affected when `path` changes.
    ///
    /// Breadth-first over outgoing edges; the visited set makes it safe on
    /// cyclic configurations.
    pub fn closure(&self, path: &str) -> BTreeSet<String> {
        let Some(&start) = self.path_index.get(path) else {
            return BTreeSet::new();
        };
        let mut affected = BTreeSet::new();
        let mut visited: HashSet<NodeIndex> = HashSet::new();
        let mut queue = vec![start];
        while let Some(current) = queue.pop() {
            for neighbor in self.graph.neighbors(current) {
                if visited.insert(neighbor) {
                    affected.insert(self.graph[neighbor].clone());
                    queue.push(neighbor);
                }
            }
        }
        affected
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn clear(&mut self) {
        self.graph.clear();
        self.path_index.clear();
    }
}
