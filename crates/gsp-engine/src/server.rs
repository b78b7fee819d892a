use crate::batch::RawOperation;
use crate::engine::GspEngine;
use crate::proto::graph_shortest_path_server::{GraphShortestPath, GraphShortestPathServer};
use crate::proto::{
    BatchReply, BatchRequest, EdgeRequest, Empty, MetricsReply, QueryReply,
};
use tonic::{Request, Response, Status};

/// gRPC front of a `GspEngine`.
///
/// Engine calls may block on the graph lock, so each one runs on the
/// blocking pool rather than on a runtime worker.
#[derive(Clone, Default)]
pub struct GspService {
    engine: GspEngine,
}

impl GspService {
    pub fn new(engine: GspEngine) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &GspEngine {
        &self.engine
    }

    pub fn into_server(self) -> GraphShortestPathServer<Self> {
        GraphShortestPathServer::new(self)
    }

    async fn run<T, F>(&self, f: F) -> Result<T, Status>
    where
        T: Send + 'static,
        F: FnOnce(GspEngine) -> T + Send + 'static,
    {
        let engine = self.engine.clone();
        tokio::task::spawn_blocking(move || f(engine))
            .await
            .map_err(|e| Status::internal(format!("Worker failed: {}", e)))
    }
}

#[tonic::async_trait]
impl GraphShortestPath for GspService {
    async fn add_edge(&self, request: Request<EdgeRequest>) -> Result<Response<Empty>, Status> {
        let EdgeRequest { source, target } = request.into_inner();
        self.run(move |engine| engine.add_edge(source, target)).await?;
        Ok(Response::new(Empty {}))
    }

    async fn delete_edge(
        &self,
        request: Request<EdgeRequest>,
    ) -> Result<Response<Empty>, Status> {
        let EdgeRequest { source, target } = request.into_inner();
        self.run(move |engine| engine.delete_edge(source, target)).await?;
        Ok(Response::new(Empty {}))
    }

    async fn query(&self, request: Request<EdgeRequest>) -> Result<Response<QueryReply>, Status> {
        let EdgeRequest { source, target } = request.into_inner();
        let distance = self.run(move |engine| engine.query(source, target)).await?;
        Ok(Response::new(QueryReply { distance }))
    }

    async fn process_batch(
        &self,
        request: Request<BatchRequest>,
    ) -> Result<Response<BatchReply>, Status> {
        let operations: Vec<RawOperation> = request
            .into_inner()
            .operations
            .into_iter()
            .map(RawOperation::from)
            .collect();

        let results = self
            .run(move |engine| engine.process_batch(&operations))
            .await?;
        Ok(Response::new(BatchReply { results }))
    }

    async fn get_metrics(&self, _request: Request<Empty>) -> Result<Response<MetricsReply>, Status> {
        let snapshot = self.run(|engine| engine.metrics()).await?;
        Ok(Response::new(MetricsReply::from(&snapshot)))
    }
}
