//! Random workloads in the line formats read by `ingest`.

use crate::batch::{OpKind, Operation};
use crate::ingest::{BATCH_END, EDGES_END};
use crate::topology::NodeId;
use rand::Rng;
use std::collections::HashSet;
use std::io::{self, Write};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkloadSpec {
    /// Node ids are drawn from `1..=num_nodes`, capped at `NodeId::MAX`
    pub num_nodes: u32,
    pub num_edges: usize,
    pub num_batches: usize,
    pub ops_per_batch: usize,
    /// Share of operations that are writes, split evenly between adds and deletes
    pub write_percentage: u8,
}

impl Default for WorkloadSpec {
    fn default() -> Self {
        Self {
            num_nodes: 1_000,
            num_edges: 500_000,
            num_batches: 1_000,
            ops_per_batch: 10,
            write_percentage: 50,
        }
    }
}

impl WorkloadSpec {
    /// Highest node id actually generated.
    pub fn max_node(&self) -> NodeId {
        NodeId::try_from(self.num_nodes).unwrap_or(NodeId::MAX)
    }

    /// Most distinct non-loop edges the node range can hold.
    pub fn max_edges(&self) -> usize {
        let n = self.max_node() as usize;
        n.saturating_mul(n.saturating_sub(1))
    }
}

fn distinct_pair<R: Rng>(rng: &mut R, max_node: NodeId) -> (NodeId, NodeId) {
    let source = rng.random_range(1..=max_node);
    let mut target = rng.random_range(1..=max_node);
    while target == source {
        target = rng.random_range(1..=max_node);
    }
    (source, target)
}

/// Unique edges without self-loops.
///
/// Capped at `max_edges`; needs at least two nodes to produce anything.
pub fn initial_edges<R: Rng>(rng: &mut R, spec: &WorkloadSpec) -> Vec<(NodeId, NodeId)> {
    let wanted = spec.num_edges.min(spec.max_edges());
    let mut seen = HashSet::with_capacity(wanted);
    let mut edges = Vec::with_capacity(wanted);

    while edges.len() < wanted {
        let edge = distinct_pair(rng, spec.max_node());
        if seen.insert(edge) {
            edges.push(edge);
        }
    }
    edges
}

fn pick_kind<R: Rng>(rng: &mut R, write_percentage: u8) -> OpKind {
    let writes = u32::from(write_percentage.min(100));
    let roll = rng.random_range(0..100u32);
    if roll < 100 - writes {
        OpKind::Query
    } else if roll < 100 - writes / 2 {
        OpKind::Add
    } else {
        OpKind::Delete
    }
}

pub fn batches<R: Rng>(rng: &mut R, spec: &WorkloadSpec) -> Vec<Vec<Operation>> {
    let max_node = spec.max_node();
    if max_node < 2 {
        return vec![Vec::new(); spec.num_batches];
    }

    (0..spec.num_batches)
        .map(|_| {
            (0..spec.ops_per_batch)
                .map(|_| {
                    let kind = pick_kind(rng, spec.write_percentage);
                    let (source, target) = distinct_pair(rng, max_node);
                    Operation::new(kind, source, target)
                })
                .collect()
        })
        .collect()
}

pub fn write_edge_list<W: Write>(mut out: W, edges: &[(NodeId, NodeId)]) -> io::Result<()> {
    for (source, target) in edges {
        writeln!(out, "{} {}", source, target)?;
    }
    writeln!(out, "{}", EDGES_END)?;
    out.flush()
}

pub fn write_batches<W: Write>(mut out: W, batches: &[Vec<Operation>]) -> io::Result<()> {
    for batch in batches {
        for op in batch {
            writeln!(out, "{}", op)?;
        }
        writeln!(out, "{}", BATCH_END)?;
    }
    out.flush()
}
