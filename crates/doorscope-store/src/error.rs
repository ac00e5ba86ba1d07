use doorscope_types::{NodeId, TypeError};

/// Errors from snapshot access and loading.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A node handle does not belong to the snapshot.
    #[error("node not found: {0}")]
    NodeNotFound(NodeId),

    /// The snapshot violates a structural invariant.
    #[error("malformed snapshot: {0}")]
    MalformedSnapshot(String),

    /// A document file could not be parsed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error while reading a document file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("type error: {0}")]
    Type(#[from] TypeError),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
