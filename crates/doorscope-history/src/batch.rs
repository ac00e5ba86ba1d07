use doorscope_types::{NodeId, SnapshotId};

use crate::record::{ChangeFlags, ChangeRecord};

/// One operation of a [`HistoryBatch`].
#[derive(Clone, Debug, PartialEq)]
pub enum HistoryOp {
    /// Erase every record, flag and diff source of the document.
    ClearAll,
    Append(ChangeRecord),
    SetFlags(NodeId, ChangeFlags),
    SetDiffSource(SnapshotId),
}

/// A unit of work against the history of one document.
///
/// A batch is applied by [`HistoryWriter::commit`](crate::HistoryWriter::commit)
/// as a whole or not at all. Dropping a batch without committing it discards
/// it.
#[derive(Clone, Debug, PartialEq)]
pub struct HistoryBatch {
    document: SnapshotId,
    ops: Vec<HistoryOp>,
}

impl HistoryBatch {
    pub fn new(document: SnapshotId) -> Self {
        Self {
            document,
            ops: Vec::new(),
        }
    }

    pub fn document(&self) -> SnapshotId {
        self.document
    }

    pub fn clear_all(&mut self) -> &mut Self {
        self.ops.push(HistoryOp::ClearAll);
        self
    }

    pub fn append(&mut self, record: ChangeRecord) -> &mut Self {
        self.ops.push(HistoryOp::Append(record));
        self
    }

    pub fn set_flags(&mut self, node: NodeId, flags: ChangeFlags) -> &mut Self {
        self.ops.push(HistoryOp::SetFlags(node, flags));
        self
    }

    pub fn set_diff_source(&mut self, source: SnapshotId) -> &mut Self {
        self.ops.push(HistoryOp::SetDiffSource(source));
        self
    }

    pub fn ops(&self) -> &[HistoryOp] {
        &self.ops
    }

    pub fn into_ops(self) -> Vec<HistoryOp> {
        self.ops
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Records appended by this batch, in order.
    pub fn records(&self) -> impl Iterator<Item = &ChangeRecord> {
        self.ops.iter().filter_map(|op| match op {
            HistoryOp::Append(record) => Some(record),
            _ => None,
        })
    }
}

/// Outcome of a successful commit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CommitSummary {
    pub document: SnapshotId,
    /// Records erased by `ClearAll` operations.
    pub cleared: usize,
    pub appended: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use doorscope_types::StableId;

    #[test]
    fn records_skips_other_ops() {
        let doc = SnapshotId::generate();
        let mut batch = HistoryBatch::new(doc);
        batch
            .clear_all()
            .append(ChangeRecord::deleted(StableId::Number(1), "1"))
            .set_flags(NodeId::new(1), ChangeFlags::TEXT)
            .set_diff_source(SnapshotId::generate());

        assert_eq!(batch.len(), 4);
        assert_eq!(batch.records().count(), 1);
        assert_eq!(batch.document(), doc);
    }
}
