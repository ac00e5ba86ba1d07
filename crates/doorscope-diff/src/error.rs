//! Error types for the diff crate.

use doorscope_history::HistoryError;
use doorscope_store::{CodecError, StoreError};

/// Errors that can occur during diff operations.
#[derive(Debug, thiserror::Error)]
pub enum DiffError {
    /// A snapshot is malformed or its root is not a document.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Two values of different types were compared. Never fatal: the tree
    /// differ reports the attribute as changed.
    #[error("type mismatch: {expected} compared with {actual}")]
    TypeMismatch {
        expected: &'static str,
        actual: &'static str,
    },

    /// Snapshot access failed.
    #[error("store error: {0}")]
    Store(StoreError),

    /// The history store rejected the commit.
    #[error("history error: {0}")]
    History(#[from] HistoryError),

    /// A stored value could not be decoded to text.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    /// Internal fault of the text differ; unreachable for correct input.
    #[error("diff algorithm invariant violated: {0}")]
    AlgorithmInvariant(String),

    /// Configuration could not be parsed.
    #[error("config error: {0}")]
    Config(String),
}

impl From<StoreError> for DiffError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::MalformedSnapshot(_) | StoreError::NodeNotFound(_) => {
                Self::InvalidArgument(e.to_string())
            }
            other => Self::Store(other),
        }
    }
}

/// Convenience alias for diff results.
pub type DiffResult<T> = Result<T, DiffError>;
