//! GSP: a directed-graph store with hop-count shortest path queries.
//!
//! Many clients mutate and query one shared graph concurrently over gRPC.
//! Queries share a read lock, edge additions and deletions take the write
//! lock, and a batch of operations is dispatched one lock acquisition at a
//! time.
//!
//! ```
//! use gsp_core::GspEngine;
//!
//! let engine = GspEngine::new();
//! engine.add_edge(1, 2);
//! engine.add_edge(2, 3);
//! assert_eq!(engine.query(1, 3), 2);
//! assert_eq!(engine.query(3, 1), -1);
//! ```

pub mod batch;
pub mod client;
pub mod config;
pub mod engine;
pub mod error;
pub mod ingest;
pub mod logging;
pub mod metrics;
pub mod oplog;
pub mod path;
pub mod proto;
pub mod server;
pub mod store;
pub mod topology;
pub mod workload;

pub use batch::{OpKind, Operation, RawOperation};
pub use client::GspClient;
pub use engine::GspEngine;
pub use error::{GspError, MalformedOperation, Result};
pub use metrics::{MetricsCollector, MetricsSnapshot};
pub use oplog::{NullLog, OpEvent, OperationLog, TracingLog};
pub use server::GspService;
pub use store::{GraphStore, NO_PATH};
pub use topology::{Graph, NodeId};
