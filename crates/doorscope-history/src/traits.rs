use doorscope_types::{AttrId, NodeId, SnapshotId};

use crate::batch::{CommitSummary, HistoryBatch};
use crate::error::HistoryResult;
use crate::record::{ChangeFlags, ChangeRecord};

/// Write boundary of the change history.
pub trait HistoryWriter: Send + Sync {
    /// Apply all operations of `batch` atomically, in order.
    ///
    /// On error nothing of the batch is visible to readers.
    fn commit(&self, batch: HistoryBatch) -> HistoryResult<CommitSummary>;

    /// Append a single record; returns it with its sequence number.
    fn append(&self, document: SnapshotId, record: ChangeRecord) -> HistoryResult<ChangeRecord>;

    /// Erase the whole history of `document`. Returns the number of erased
    /// records.
    fn clear_all(&self, document: SnapshotId) -> HistoryResult<usize> {
        let mut batch = HistoryBatch::new(document);
        batch.clear_all();
        Ok(self.commit(batch)?.cleared)
    }

    /// Discard the history of `document` at the user's request.
    fn reset(&self, document: SnapshotId) -> HistoryResult<usize> {
        self.clear_all(document)
    }
}

/// Read boundary of the change history.
pub trait HistoryReader: Send + Sync {
    /// All records of `document` in queue order.
    fn document_records(&self, document: SnapshotId) -> HistoryResult<Vec<ChangeRecord>>;

    /// Records attached to `node`, oldest first.
    fn records_for(&self, document: SnapshotId, node: NodeId) -> HistoryResult<Vec<ChangeRecord>>;

    /// Records attached to `node` that concern `attribute`, oldest first.
    fn records_for_attribute(
        &self,
        document: SnapshotId,
        node: NodeId,
        attribute: AttrId,
    ) -> HistoryResult<Vec<ChangeRecord>> {
        Ok(self
            .records_for(document, node)?
            .into_iter()
            .filter(|r| r.touches(attribute))
            .collect())
    }

    /// Oldest record of `node`, optionally restricted to one attribute.
    fn first_change(
        &self,
        document: SnapshotId,
        node: NodeId,
        attribute: Option<AttrId>,
    ) -> HistoryResult<Option<ChangeRecord>>;

    /// Newest record of `node`, optionally restricted to one attribute.
    fn latest_change(
        &self,
        document: SnapshotId,
        node: NodeId,
        attribute: Option<AttrId>,
    ) -> HistoryResult<Option<ChangeRecord>>;

    fn flags(&self, document: SnapshotId, node: NodeId) -> HistoryResult<ChangeFlags>;

    /// The snapshot `document` was last compared against.
    fn diff_source(&self, document: SnapshotId) -> HistoryResult<Option<SnapshotId>>;

    fn record_count(&self, document: SnapshotId) -> HistoryResult<usize>;
}
