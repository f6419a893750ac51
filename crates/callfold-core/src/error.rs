//! Error type shared by the graph, pipeline and cache

use crate::model::NodeId;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The external parser rejected the input. No graph is produced.
    #[error("parse failed: {0}")]
    Parse(String),

    /// A node id was looked up after it had been removed, or never existed.
    #[error("node {0} not found")]
    NotFound(NodeId),

    #[error("cache i/o: {0}")]
    Io(#[from] std::io::Error),

    #[error("cache serialization: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("cache format version {found} does not match expected {expected}")]
    CacheVersion { found: u32, expected: u32 },
}

pub type Result<T> = std::result::Result<T, Error>;
