//! Hop-count shortest path search.

use crate::topology::{Graph, NodeId};
use std::collections::{HashMap, VecDeque};

/// Minimum number of directed hops from `source` to `target`.
///
/// Plain BFS with early exit once `target` is dequeued. Returns `None` when
/// `target` is unreachable. The caller keeps `graph` stable for the duration
/// of the call (it holds the store's read lock).
pub fn shortest_path(graph: &Graph, source: NodeId, target: NodeId) -> Option<u32> {
    // distances doubles as the visited set
    let mut queue: VecDeque<(NodeId, u32)> = VecDeque::new();
    let mut distances: HashMap<NodeId, u32> = HashMap::new();

    queue.push_back((source, 0));
    distances.insert(source, 0);

    while let Some((current, depth)) = queue.pop_front() {
        if current == target {
            return Some(depth);
        }

        for neighbor in graph.neighbors(current) {
            if !distances.contains_key(&neighbor) {
                distances.insert(neighbor, depth + 1);
                queue.push_back((neighbor, depth + 1));
            }
        }
    }

    None
}
