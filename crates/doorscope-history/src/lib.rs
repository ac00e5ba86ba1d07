//! Append-only change history for DoorScope documents.
//!
//! This crate provides:
//! - [`ChangeRecord`] / [`ChangeKind`] -- one detected difference between two
//!   versions of a document
//! - [`ChangeFlags`] -- per-node change markers for the review views
//! - [`HistoryBatch`] -- a unit of work committed atomically
//! - `HistoryWriter` / `HistoryReader` trait boundaries
//! - [`InMemoryHistory`] implementation for tests, the CLI and embedding
//!
//! Records are never mutated after commit. The only way to remove them is to
//! clear the whole history of a document.

pub mod batch;
pub mod error;
pub mod memory;
pub mod record;
pub mod traits;

pub use batch::{CommitSummary, HistoryBatch, HistoryOp};
pub use error::{HistoryError, HistoryResult};
pub use memory::InMemoryHistory;
pub use record::{ChangeFlags, ChangeKind, ChangeRecord};
pub use traits::{HistoryReader, HistoryWriter};
