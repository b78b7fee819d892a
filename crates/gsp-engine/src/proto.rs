//! Wire types for the `gsp.GraphShortestPath` gRPC service.
//!
//! Messages are prost derives kept in sync by hand with the method table in
//! `build.rs`, which generates the client and server stubs included below.

use crate::batch::RawOperation;
use crate::metrics::{KindStats, MetricsSnapshot};

include!(concat!(env!("OUT_DIR"), "/gsp.GraphShortestPath.rs"));

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Empty {}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct EdgeRequest {
    #[prost(int32, tag = "1")]
    pub source: i32,
    #[prost(int32, tag = "2")]
    pub target: i32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct QueryReply {
    /// Hop count, -1 when no path exists
    #[prost(int32, tag = "1")]
    pub distance: i32,
}

/// One operation as submitted: `[tag, source, target]`, unvalidated.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct OperationMessage {
    #[prost(string, repeated, tag = "1")]
    pub parts: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct BatchRequest {
    #[prost(message, repeated, tag = "1")]
    pub operations: ::prost::alloc::vec::Vec<OperationMessage>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct BatchReply {
    /// One entry per query operation, in submission order
    #[prost(int32, repeated, tag = "1")]
    pub results: ::prost::alloc::vec::Vec<i32>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct KindMetrics {
    #[prost(uint64, tag = "1")]
    pub count: u64,
    #[prost(uint64, tag = "2")]
    pub total_latency_us: u64,
    #[prost(double, tag = "3")]
    pub avg_latency_us: f64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct MetricsReply {
    #[prost(uint64, tag = "1")]
    pub total_nodes: u64,
    #[prost(uint64, tag = "2")]
    pub total_edges: u64,
    #[prost(uint64, tag = "3")]
    pub total_operations: u64,
    #[prost(message, optional, tag = "4")]
    pub query: ::core::option::Option<KindMetrics>,
    #[prost(message, optional, tag = "5")]
    pub add: ::core::option::Option<KindMetrics>,
    #[prost(message, optional, tag = "6")]
    pub delete: ::core::option::Option<KindMetrics>,
    #[prost(double, tag = "7")]
    pub avg_latency_us: f64,
    /// RFC 3339 server start time
    #[prost(string, tag = "8")]
    pub started_at: ::prost::alloc::string::String,
    /// Human readable report
    #[prost(string, tag = "9")]
    pub report: ::prost::alloc::string::String,
}

impl From<&RawOperation> for OperationMessage {
    fn from(op: &RawOperation) -> Self {
        Self {
            parts: op.parts.clone(),
        }
    }
}

impl From<OperationMessage> for RawOperation {
    fn from(msg: OperationMessage) -> Self {
        RawOperation { parts: msg.parts }
    }
}

impl From<&KindStats> for KindMetrics {
    fn from(stats: &KindStats) -> Self {
        Self {
            count: stats.count,
            total_latency_us: stats.total_latency_us,
            avg_latency_us: stats.avg_latency_us,
        }
    }
}

impl From<&MetricsSnapshot> for MetricsReply {
    fn from(snap: &MetricsSnapshot) -> Self {
        Self {
            total_nodes: snap.total_nodes,
            total_edges: snap.total_edges,
            total_operations: snap.total_operations,
            query: Some((&snap.query).into()),
            add: Some((&snap.add).into()),
            delete: Some((&snap.delete).into()),
            avg_latency_us: snap.avg_latency_us,
            started_at: snap.started_at.to_rfc3339(),
            report: snap.to_string(),
        }
    }
}
