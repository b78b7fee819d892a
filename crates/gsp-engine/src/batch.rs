//! Operations and batch dispatch.
//!
//! A batch is an ordered list of operations from one client. Each operation
//! runs under its own lock acquisition, so operations from other clients may
//! interleave anywhere inside a batch.

use crate::engine::GspEngine;
use crate::error::MalformedOperation;
use crate::oplog::OpEvent;
use crate::topology::NodeId;
use std::fmt;
use std::str::FromStr;
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpKind {
    Query,
    Add,
    Delete,
}

impl OpKind {
    pub const ALL: [OpKind; 3] = [OpKind::Query, OpKind::Add, OpKind::Delete];

    /// Parse a one-character tag (`Q`, `A`, `D`, any case).
    pub fn from_tag(tag: &str) -> Result<Self, MalformedOperation> {
        match tag {
            "Q" | "q" => Ok(OpKind::Query),
            "A" | "a" => Ok(OpKind::Add),
            "D" | "d" => Ok(OpKind::Delete),
            other => Err(MalformedOperation::UnknownTag(other.to_string())),
        }
    }

    pub fn tag(self) -> char {
        match self {
            OpKind::Query => 'Q',
            OpKind::Add => 'A',
            OpKind::Delete => 'D',
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            OpKind::Query => "Query",
            OpKind::Add => "Add",
            OpKind::Delete => "Delete",
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            OpKind::Query => 0,
            OpKind::Add => 1,
            OpKind::Delete => 2,
        }
    }
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}

/// A parsed, validated operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Operation {
    pub kind: OpKind,
    pub source: NodeId,
    pub target: NodeId,
}

impl Operation {
    pub fn new(kind: OpKind, source: NodeId, target: NodeId) -> Self {
        Self {
            kind,
            source,
            target,
        }
    }

    pub fn query(source: NodeId, target: NodeId) -> Self {
        Self::new(OpKind::Query, source, target)
    }

    pub fn add(source: NodeId, target: NodeId) -> Self {
        Self::new(OpKind::Add, source, target)
    }

    pub fn delete(source: NodeId, target: NodeId) -> Self {
        Self::new(OpKind::Delete, source, target)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.kind, self.source, self.target)
    }
}

impl FromStr for Operation {
    type Err = MalformedOperation;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        RawOperation::from_line(line).parse()
    }
}

fn parse_node(field: &str) -> Result<NodeId, MalformedOperation> {
    field
        .parse()
        .map_err(|_| MalformedOperation::InvalidNode(field.to_string()))
}

/// An operation as received: whitespace-separated fields, not yet validated.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawOperation {
    pub parts: Vec<String>,
}

impl RawOperation {
    pub fn new<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            parts: parts.into_iter().map(Into::into).collect(),
        }
    }

    pub fn from_line(line: &str) -> Self {
        Self::new(line.split_whitespace())
    }

    pub fn parse(&self) -> Result<Operation, MalformedOperation> {
        match self.parts.as_slice() {
            [tag, source, target] => Ok(Operation {
                kind: OpKind::from_tag(tag.trim())?,
                source: parse_node(source.trim())?,
                target: parse_node(target.trim())?,
            }),
            parts => Err(MalformedOperation::Arity(parts.len())),
        }
    }
}

impl From<Operation> for RawOperation {
    fn from(op: Operation) -> Self {
        Self {
            parts: vec![
                op.kind.tag().to_string(),
                op.source.to_string(),
                op.target.to_string(),
            ],
        }
    }
}

impl fmt::Display for RawOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.parts.join(" "))
    }
}

impl GspEngine {
    /// Run one operation. Queries yield their distance, mutations yield nothing.
    pub fn execute(&self, op: Operation) -> Option<i32> {
        match op.kind {
            OpKind::Query => Some(self.query(op.source, op.target)),
            OpKind::Add => {
                self.add_edge(op.source, op.target);
                None
            }
            OpKind::Delete => {
                self.delete_edge(op.source, op.target);
                None
            }
        }
    }

    /// Run a batch of already-parsed operations in order.
    pub fn run_batch(&self, operations: &[Operation]) -> Vec<i32> {
        operations.iter().filter_map(|op| self.execute(*op)).collect()
    }

    /// Parse and run a batch in submission order.
    ///
    /// Returns one entry per query, in order. Malformed operations are
    /// reported to the operation log and skipped.
    pub fn process_batch(&self, operations: &[RawOperation]) -> Vec<i32> {
        let start = Instant::now();
        let mut results = Vec::new();
        let mut skipped = 0;

        for raw in operations {
            match raw.parse() {
                Ok(op) => {
                    if let Some(distance) = self.execute(op) {
                        results.push(distance);
                    }
                }
                Err(reason) => {
                    skipped += 1;
                    self.log().record(&OpEvent::Skipped {
                        operation: raw,
                        reason: &reason,
                    });
                }
            }
        }

        self.log().record(&OpEvent::BatchProcessed {
            operations: operations.len(),
            queries: results.len(),
            skipped,
            elapsed: start.elapsed(),
        });

        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oplog::OperationLog;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct SkipLog {
        skipped: Mutex<Vec<String>>,
    }

    impl OperationLog for SkipLog {
        fn record(&self, event: &OpEvent<'_>) {
            if let OpEvent::Skipped { reason, .. } = event {
                self.skipped.lock().unwrap().push(reason.to_string());
            }
        }
    }

    fn raw(lines: &[&str]) -> Vec<RawOperation> {
        lines.iter().map(|l| RawOperation::from_line(l)).collect()
    }

    #[test]
    fn test_parse_operation() {
        assert_eq!("Q 1 2".parse::<Operation>(), Ok(Operation::query(1, 2)));
        assert_eq!("a 3 4".parse::<Operation>(), Ok(Operation::add(3, 4)));
        assert_eq!("  D   -5 6 ".parse::<Operation>(), Ok(Operation::delete(-5, 6)));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert_eq!(
            "Q 1".parse::<Operation>(),
            Err(MalformedOperation::Arity(2))
        );
        assert_eq!(
            "Q 1 2 3".parse::<Operation>(),
            Err(MalformedOperation::Arity(4))
        );
        assert_eq!(
            "X 1 2".parse::<Operation>(),
            Err(MalformedOperation::UnknownTag("X".into()))
        );
        assert_eq!(
            "Query 1 2".parse::<Operation>(),
            Err(MalformedOperation::UnknownTag("Query".into()))
        );
        assert_eq!(
            "A one 2".parse::<Operation>(),
            Err(MalformedOperation::InvalidNode("one".into()))
        );
        assert_eq!(
            "A 1 99999999999".parse::<Operation>(),
            Err(MalformedOperation::InvalidNode("99999999999".into()))
        );
    }

    #[test]
    fn test_display_round_trips_through_raw() {
        let op = Operation::delete(7, 8);
        let raw = RawOperation::from(op);
        assert_eq!(raw.to_string(), "D 7 8");
        assert_eq!(raw.parse(), Ok(op));
    }

    #[test]
    fn test_batch_results_follow_query_order() {
        let engine = GspEngine::new();
        let results = engine.process_batch(&raw(&["Q 1 1", "A 1 2", "Q 1 2", "D 1 2", "Q 1 2"]));
        assert_eq!(results, vec![0, 1, -1]);
    }

    #[test]
    fn test_cycle_batch_self_query() {
        let engine = GspEngine::new();
        let results = engine.process_batch(&raw(&["A 1 2", "A 2 3", "A 3 1", "Q 1 1"]));
        assert_eq!(results, vec![0]);
        assert_eq!(engine.query(3, 2), 2);
    }

    #[test]
    fn test_empty_batch() {
        let engine = GspEngine::new();
        assert!(engine.process_batch(&[]).is_empty());
    }

    #[test]
    fn test_mutation_only_batch_has_no_results() {
        let engine = GspEngine::new();
        let results = engine.process_batch(&raw(&["A 1 2", "A 2 3", "D 1 2"]));
        assert!(results.is_empty());
        assert_eq!(engine.store().node_count(), 3);
    }

    #[test]
    fn test_malformed_operations_are_skipped() {
        let log = Arc::new(SkipLog::default());
        let engine = GspEngine::with_log(log.clone());

        let results = engine.process_batch(&raw(&[
            "A 1 2",
            "Z 1 2",
            "Q 1",
            "Q x 2",
            "Q 1 2",
            "",
            "A 2 3",
            "Q 1 3",
        ]));

        assert_eq!(results, vec![1, 2]);
        let skipped = log.skipped.lock().unwrap();
        assert_eq!(skipped.len(), 4);
        assert!(skipped[0].contains("unrecognized operation tag 'Z'"));
        assert!(skipped[1].contains("found 2"));
        assert!(skipped[2].contains("invalid node id 'x'"));
        assert!(skipped[3].contains("found 0"));
    }

    #[test]
    fn test_run_batch_matches_process_batch() {
        let typed = [
            Operation::add(1, 2),
            Operation::add(2, 3),
            Operation::query(1, 3),
            Operation::query(3, 1),
        ];
        let raw: Vec<RawOperation> = typed.iter().copied().map(RawOperation::from).collect();

        let a = GspEngine::new();
        let b = GspEngine::new();
        assert_eq!(a.run_batch(&typed), b.process_batch(&raw));
    }
}
