use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid identifier: {0:?}")]
    InvalidIdentifier(String),

    #[error("unknown attribute: {0}")]
    UnknownAttribute(String),

    #[error("unknown node kind: {0}")]
    UnknownKind(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}
