use crate::path;
use crate::topology::{Graph, NodeId};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Distance reported when no directed path exists.
pub const NO_PATH: i32 = -1;

/// What an `add_edge` call changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EdgeInsert {
    /// Nodes created by this call (0, 1 or 2).
    pub nodes_created: usize,
    /// False when the edge already existed.
    pub inserted: bool,
}

/// Owner of the shared graph.
///
/// All reads go through a shared lock, all mutations through the exclusive
/// lock, and each lock is held for exactly one primitive operation.
pub struct GraphStore {
    graph: RwLock<Graph>,
    node_count: AtomicUsize,
    edge_count: AtomicUsize,
}

impl Default for GraphStore {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphStore {
    pub fn new() -> Self {
        Self {
            graph: RwLock::new(Graph::new()),
            node_count: AtomicUsize::new(0),
            edge_count: AtomicUsize::new(0),
        }
    }

    // A writer that panicked mid-operation leaves the graph structurally valid
    // (every step is a single map/set call), so poisoning is not fatal.
    fn read(&self) -> RwLockReadGuard<'_, Graph> {
        self.graph.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Graph> {
        self.graph.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Add `source -> target`, creating either endpoint if it is new.
    pub fn add_edge(&self, source: NodeId, target: NodeId) -> EdgeInsert {
        let mut graph = self.write();

        let mut nodes_created = 0;
        if graph.ensure_node(source) {
            nodes_created += 1;
        }
        if graph.ensure_node(target) {
            nodes_created += 1;
        }
        let inserted = graph.insert_edge(source, target);

        // Counters move while the write lock is still held
        self.node_count.fetch_add(nodes_created, Ordering::Relaxed);
        if inserted {
            self.edge_count.fetch_add(1, Ordering::Relaxed);
        }

        EdgeInsert {
            nodes_created,
            inserted,
        }
    }

    /// Remove `source -> target` if present. Never removes a node.
    pub fn delete_edge(&self, source: NodeId, target: NodeId) -> bool {
        let mut graph = self.write();
        let removed = graph.remove_edge(source, target);
        if removed {
            self.edge_count.fetch_sub(1, Ordering::Relaxed);
        }
        removed
    }

    /// Hop count from `source` to `target`, `None` if unreachable or unknown.
    pub fn shortest_path(&self, source: NodeId, target: NodeId) -> Option<u32> {
        if source == target {
            return Some(0);
        }

        let graph = self.read();
        if !graph.contains(source) || !graph.contains(target) {
            return None;
        }
        path::shortest_path(&graph, source, target)
    }

    /// Wire form of `shortest_path`: the hop count, or `NO_PATH`.
    pub fn query(&self, source: NodeId, target: NodeId) -> i32 {
        match self.shortest_path(source, target) {
            Some(hops) => i32::try_from(hops).unwrap_or(i32::MAX),
            None => NO_PATH,
        }
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.read().contains(node)
    }

    pub fn has_edge(&self, source: NodeId, target: NodeId) -> bool {
        self.read().has_edge(source, target)
    }

    /// Number of distinct nodes ever added. Does not take the graph lock.
    pub fn node_count(&self) -> usize {
        self.node_count.load(Ordering::Relaxed)
    }

    /// Number of edges currently present. Does not take the graph lock.
    pub fn edge_count(&self) -> usize {
        self.edge_count.load(Ordering::Relaxed)
    }
}
