use std::collections::{HashMap, HashSet};

/// Client-facing node identifier.
pub type NodeId = i32;

/// A directed, unweighted graph represented as an adjacency map.
///
/// Every known node has an entry, possibly with an empty target set. Nodes
/// are never removed once created.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    /// Adjacency: NodeId -> outgoing edge targets
    adj: HashMap<NodeId, HashSet<NodeId>>,
}

impl Graph {
    pub fn new() -> Self {
        Self {
            adj: HashMap::new(),
        }
    }

    pub fn num_nodes(&self) -> usize {
        self.adj.len()
    }

    pub fn num_edges(&self) -> usize {
        self.adj.values().map(|targets| targets.len()).sum()
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.adj.contains_key(&node)
    }

    pub fn has_edge(&self, source: NodeId, target: NodeId) -> bool {
        self.adj
            .get(&source)
            .map_or(false, |targets| targets.contains(&target))
    }

    /// Outgoing neighbors of `node`. Unknown nodes have none.
    pub fn neighbors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.adj.get(&node).into_iter().flatten().copied()
    }

    /// Register `node` with an empty adjacency set. Returns true if it was new.
    pub fn ensure_node(&mut self, node: NodeId) -> bool {
        if self.adj.contains_key(&node) {
            return false;
        }
        self.adj.insert(node, HashSet::new());
        true
    }

    /// Insert `source -> target`. Both endpoints must already exist.
    ///
    /// Returns true if the edge was not present before.
    pub fn insert_edge(&mut self, source: NodeId, target: NodeId) -> bool {
        match self.adj.get_mut(&source) {
            Some(targets) => targets.insert(target),
            None => false,
        }
    }

    /// Remove `source -> target`, leaving both nodes in place.
    pub fn remove_edge(&mut self, source: NodeId, target: NodeId) -> bool {
        match self.adj.get_mut(&source) {
            Some(targets) => targets.remove(&target),
            None => false,
        }
    }
}
