use doorscope_types::SnapshotId;

/// Errors produced by history operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HistoryError {
    /// A record in a batch violates the record invariants; the whole batch
    /// was rejected.
    #[error("integrity violation in batch for {document}: {reason}")]
    IntegrityViolation { document: SnapshotId, reason: String },

    #[error("history lock poisoned")]
    LockPoisoned,
}

/// Result alias for history operations.
pub type HistoryResult<T> = Result<T, HistoryError>;
