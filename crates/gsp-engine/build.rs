use tonic_build::manual::{Builder, Method, Service};

/// Unary prost method on the GraphShortestPath service.
fn unary(name: &str, route: &str, input: &str, output: &str) -> Method {
    Method::builder()
        .name(name)
        .route_name(route)
        .input_type(format!("crate::proto::{}", input))
        .output_type(format!("crate::proto::{}", output))
        .codec_path("tonic::codec::ProstCodec")
        .build()
}

fn main() {
    // Messages are hand-derived in src/proto.rs, so no protoc is involved here.
    let service = Service::builder()
        .name("GraphShortestPath")
        .package("gsp")
        .method(unary("add_edge", "AddEdge", "EdgeRequest", "Empty"))
        .method(unary("delete_edge", "DeleteEdge", "EdgeRequest", "Empty"))
        .method(unary("query", "Query", "EdgeRequest", "QueryReply"))
        .method(unary("process_batch", "ProcessBatch", "BatchRequest", "BatchReply"))
        .method(unary("get_metrics", "GetMetrics", "Empty", "MetricsReply"))
        .build();

    Builder::new().compile(&[service]);
    println!("cargo:rerun-if-changed=build.rs");
}
