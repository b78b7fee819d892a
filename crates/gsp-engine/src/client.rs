use crate::batch::RawOperation;
use crate::error::Result;
use crate::proto::graph_shortest_path_client::GraphShortestPathClient;
use crate::proto::{BatchRequest, EdgeRequest, Empty, MetricsReply, OperationMessage};
use crate::topology::NodeId;
use std::time::{Duration, Instant};
use tonic::transport::Channel;
use tracing::{debug, info};

/// Result of one remote call plus its round-trip time.
#[derive(Debug, Clone, PartialEq)]
pub struct Timed<T> {
    pub value: T,
    pub elapsed: Duration,
}

/// Thin typed client for a remote GSP server.
///
/// Transport faults come back as `GspError::Transport` or `GspError::Rpc`;
/// retrying is up to the caller.
#[derive(Clone)]
pub struct GspClient {
    client_id: String,
    inner: GraphShortestPathClient<Channel>,
}

impl GspClient {
    pub async fn connect(client_id: impl Into<String>, endpoint: impl Into<String>) -> Result<Self> {
        let client_id = client_id.into();
        let endpoint = endpoint.into();
        let inner = GraphShortestPathClient::connect(endpoint.clone()).await?;
        info!(client = %client_id, %endpoint, "connected to server");
        Ok(Self { client_id, inner })
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub async fn add_edge(&mut self, source: NodeId, target: NodeId) -> Result<Timed<()>> {
        let start = Instant::now();
        self.inner.add_edge(EdgeRequest { source, target }).await?;
        let elapsed = start.elapsed();
        debug!(client = %self.client_id, source, target, elapsed_ms = elapsed.as_millis() as u64, "added edge");
        Ok(Timed { value: (), elapsed })
    }

    pub async fn delete_edge(&mut self, source: NodeId, target: NodeId) -> Result<Timed<()>> {
        let start = Instant::now();
        self.inner.delete_edge(EdgeRequest { source, target }).await?;
        let elapsed = start.elapsed();
        debug!(client = %self.client_id, source, target, elapsed_ms = elapsed.as_millis() as u64, "deleted edge");
        Ok(Timed { value: (), elapsed })
    }

    pub async fn query(&mut self, source: NodeId, target: NodeId) -> Result<Timed<i32>> {
        let start = Instant::now();
        let reply = self.inner.query(EdgeRequest { source, target }).await?;
        let elapsed = start.elapsed();
        let distance = reply.into_inner().distance;
        debug!(client = %self.client_id, source, target, distance, elapsed_ms = elapsed.as_millis() as u64, "query");
        Ok(Timed {
            value: distance,
            elapsed,
        })
    }

    pub async fn send_batch(&mut self, operations: &[RawOperation]) -> Result<Timed<Vec<i32>>> {
        let request = BatchRequest {
            operations: operations.iter().map(OperationMessage::from).collect(),
        };

        let start = Instant::now();
        let reply = self.inner.process_batch(request).await?;
        let elapsed = start.elapsed();
        let results = reply.into_inner().results;
        info!(
            client = %self.client_id,
            operations = operations.len(),
            results = results.len(),
            elapsed_ms = elapsed.as_millis() as u64,
            "processed batch"
        );
        Ok(Timed {
            value: results,
            elapsed,
        })
    }

    pub async fn metrics(&mut self) -> Result<MetricsReply> {
        let reply = self.inner.get_metrics(Empty {}).await?;
        Ok(reply.into_inner())
    }
}

/// `http://host:port` endpoint for a server address.
pub fn endpoint(host: &str, port: u16) -> String {
    if host.contains(':') && !host.starts_with('[') {
        format!("http://[{}]:{}", host, port)
    } else {
        format!("http://{}:{}", host, port)
    }
}
