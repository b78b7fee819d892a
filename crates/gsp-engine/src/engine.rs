use crate::batch::OpKind;
use crate::metrics::{MetricsCollector, MetricsSnapshot};
use crate::oplog::{OpEvent, OperationLog, TracingLog};
use crate::store::GraphStore;
use crate::topology::NodeId;
use std::sync::Arc;
use std::time::Instant;

/// The service core: graph store, metrics and the operation log.
///
/// Cheap to clone; clones share the same graph. Each primitive is timed
/// around the store call, and metrics and logging happen after the store
/// has released its lock.
pub struct GspEngine {
    store: Arc<GraphStore>,
    metrics: Arc<MetricsCollector>,
    log: Arc<dyn OperationLog>,
}

impl Clone for GspEngine {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            metrics: Arc::clone(&self.metrics),
            log: Arc::clone(&self.log),
        }
    }
}

impl Default for GspEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl GspEngine {
    pub fn new() -> Self {
        Self::with_log(Arc::new(TracingLog))
    }

    pub fn with_log(log: Arc<dyn OperationLog>) -> Self {
        Self {
            store: Arc::new(GraphStore::new()),
            metrics: Arc::new(MetricsCollector::new()),
            log,
        }
    }

    pub fn store(&self) -> &GraphStore {
        &self.store
    }

    pub(crate) fn log(&self) -> &dyn OperationLog {
        self.log.as_ref()
    }

    pub fn add_edge(&self, source: NodeId, target: NodeId) {
        let start = Instant::now();
        let change = self.store.add_edge(source, target);
        let elapsed = start.elapsed();

        self.metrics.record(OpKind::Add, elapsed);
        self.log.record(&OpEvent::EdgeAdded {
            source,
            target,
            change,
            elapsed,
        });
    }

    pub fn delete_edge(&self, source: NodeId, target: NodeId) {
        let start = Instant::now();
        let removed = self.store.delete_edge(source, target);
        let elapsed = start.elapsed();

        self.metrics.record(OpKind::Delete, elapsed);
        self.log.record(&OpEvent::EdgeDeleted {
            source,
            target,
            removed,
            elapsed,
        });
    }

    /// Shortest path length in hops, or -1 when there is none.
    pub fn query(&self, source: NodeId, target: NodeId) -> i32 {
        let start = Instant::now();
        let distance = self.store.query(source, target);
        let elapsed = start.elapsed();

        self.metrics.record(OpKind::Query, elapsed);
        self.log.record(&OpEvent::Queried {
            source,
            target,
            distance,
            elapsed,
        });
        distance
    }

    /// Startup population from an edge list. Not counted in the metrics.
    pub fn load_edges<I>(&self, edges: I) -> usize
    where
        I: IntoIterator<Item = (NodeId, NodeId)>,
    {
        let start = Instant::now();
        let mut loaded = 0;
        for (source, target) in edges {
            self.store.add_edge(source, target);
            loaded += 1;
        }

        self.log.record(&OpEvent::GraphLoaded {
            edges: loaded,
            nodes: self.store.node_count(),
            elapsed: start.elapsed(),
        });
        loaded
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics
            .snapshot(self.store.node_count(), self.store.edge_count())
    }
}
