//! Operation logging capability injected into the engine.
//!
//! The engine calls `OperationLog::record` only after the store has returned,
//! so whatever an implementation does (file I/O, formatting) runs outside the
//! graph lock.

use crate::batch::RawOperation;
use crate::error::MalformedOperation;
use crate::store::EdgeInsert;
use crate::topology::NodeId;
use std::time::Duration;

/// Something the engine did, reported after the fact.
#[derive(Debug)]
pub enum OpEvent<'a> {
    EdgeAdded {
        source: NodeId,
        target: NodeId,
        change: EdgeInsert,
        elapsed: Duration,
    },
    EdgeDeleted {
        source: NodeId,
        target: NodeId,
        removed: bool,
        elapsed: Duration,
    },
    Queried {
        source: NodeId,
        target: NodeId,
        distance: i32,
        elapsed: Duration,
    },
    Skipped {
        operation: &'a RawOperation,
        reason: &'a MalformedOperation,
    },
    BatchProcessed {
        operations: usize,
        queries: usize,
        skipped: usize,
        elapsed: Duration,
    },
    GraphLoaded {
        edges: usize,
        nodes: usize,
        elapsed: Duration,
    },
}

pub trait OperationLog: Send + Sync {
    fn record(&self, event: &OpEvent<'_>);
}

/// Emits every event through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLog;

impl OperationLog for TracingLog {
    fn record(&self, event: &OpEvent<'_>) {
        match event {
            OpEvent::EdgeAdded {
                source,
                target,
                change,
                elapsed,
            } => tracing::debug!(
                source,
                target,
                nodes_created = change.nodes_created,
                inserted = change.inserted,
                elapsed_us = elapsed.as_micros() as u64,
                "added edge"
            ),
            OpEvent::EdgeDeleted {
                source,
                target,
                removed,
                elapsed,
            } => tracing::debug!(
                source,
                target,
                removed,
                elapsed_us = elapsed.as_micros() as u64,
                "deleted edge"
            ),
            OpEvent::Queried {
                source,
                target,
                distance,
                elapsed,
            } => tracing::debug!(
                source,
                target,
                distance,
                elapsed_us = elapsed.as_micros() as u64,
                "query"
            ),
            OpEvent::Skipped { operation, reason } => {
                tracing::warn!(operation = %operation, %reason, "skipping malformed operation")
            }
            OpEvent::BatchProcessed {
                operations,
                queries,
                skipped,
                elapsed,
            } => tracing::info!(
                operations,
                queries,
                skipped,
                elapsed_ms = elapsed.as_millis() as u64,
                "processed batch"
            ),
            OpEvent::GraphLoaded {
                edges,
                nodes,
                elapsed,
            } => tracing::info!(
                edges,
                nodes,
                elapsed_ms = elapsed.as_millis() as u64,
                "initial graph loaded"
            ),
        }
    }
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullLog;

impl OperationLog for NullLog {
    fn record(&self, _event: &OpEvent<'_>) {}
}
