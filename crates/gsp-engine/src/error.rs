//! Error types for the GSP service.

use thiserror::Error;

/// A batch operation that could not be parsed.
///
/// These are reported and skipped; they never fail the batch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedOperation {
    #[error("expected 3 fields, found {0}")]
    Arity(usize),

    #[error("unrecognized operation tag '{0}'")]
    UnknownTag(String),

    #[error("invalid node id '{0}'")]
    InvalidNode(String),
}

#[derive(Debug, Error)]
pub enum GspError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid server address '{0}'")]
    InvalidAddress(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Line decode error: {0}")]
    Lines(#[from] tokio_util::codec::AnyDelimiterCodecError),

    #[error("Transport error: {0}")]
    Transport(#[from] tonic::transport::Error),

    #[error("RPC failed: {0}")]
    Rpc(#[from] tonic::Status),
}

pub type Result<T> = std::result::Result<T, GspError>;
