use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::debug;

use doorscope_types::{AttrId, NodeId, SnapshotId};

use crate::batch::{CommitSummary, HistoryBatch, HistoryOp};
use crate::error::{HistoryError, HistoryResult};
use crate::record::{ChangeFlags, ChangeKind, ChangeRecord};
use crate::traits::{HistoryReader, HistoryWriter};

/// In-memory change history for tests, the CLI and embedding.
///
/// Each document owns one chronological queue of records. Node-local lists
/// hold positions into that queue, so a record is stored once and reachable
/// from both places.
pub struct InMemoryHistory {
    inner: RwLock<HistoryState>,
}

#[derive(Default)]
struct HistoryState {
    documents: HashMap<SnapshotId, DocumentHistory>,
}

#[derive(Default)]
struct DocumentHistory {
    queue: Vec<ChangeRecord>,
    by_node: HashMap<NodeId, Vec<usize>>,
    flags: HashMap<NodeId, ChangeFlags>,
    diff_source: Option<SnapshotId>,
}

impl DocumentHistory {
    fn push(&mut self, mut record: ChangeRecord) -> &ChangeRecord {
        let position = self.queue.len();
        record.seq = position as u64 + 1;
        if let Some(node) = record.node {
            self.by_node.entry(node).or_default().push(position);
        }
        self.queue.push(record);
        &self.queue[position]
    }

    fn node_records(&self, node: NodeId) -> impl Iterator<Item = &ChangeRecord> {
        self.by_node
            .get(&node)
            .into_iter()
            .flatten()
            .map(|&position| &self.queue[position])
    }

    fn is_empty(&self) -> bool {
        self.queue.is_empty() && self.flags.is_empty() && self.diff_source.is_none()
    }
}

impl InMemoryHistory {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(HistoryState::default()),
        }
    }

    /// Documents that currently have any history.
    pub fn documents(&self) -> HistoryResult<Vec<SnapshotId>> {
        let state = self.read()?;
        let mut ids: Vec<_> = state.documents.keys().copied().collect();
        ids.sort();
        Ok(ids)
    }

    fn read(&self) -> HistoryResult<RwLockReadGuard<'_, HistoryState>> {
        self.inner.read().map_err(|_| HistoryError::LockPoisoned)
    }

    fn write(&self) -> HistoryResult<RwLockWriteGuard<'_, HistoryState>> {
        self.inner.write().map_err(|_| HistoryError::LockPoisoned)
    }

    fn with_document<T>(
        &self,
        document: SnapshotId,
        f: impl FnOnce(&DocumentHistory) -> T,
    ) -> HistoryResult<Option<T>> {
        let state = self.read()?;
        Ok(state.documents.get(&document).map(f))
    }
}

impl Default for InMemoryHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for InMemoryHistory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let documents = self.inner.read().map(|s| s.documents.len()).unwrap_or(0);
        f.debug_struct("InMemoryHistory")
            .field("documents", &documents)
            .finish()
    }
}

/// Kind-specific shape of a record.
fn check_record(document: SnapshotId, record: &ChangeRecord) -> HistoryResult<()> {
    let violation = |reason: &str| HistoryError::IntegrityViolation {
        document,
        reason: format!("{} record for {}: {reason}", record.kind, record.subject),
    };
    match record.kind {
        ChangeKind::Modified if record.attribute.is_none() => Err(violation("missing attribute")),
        ChangeKind::Created | ChangeKind::Moved if record.attribute.is_some() => {
            Err(violation("unexpected attribute"))
        }
        ChangeKind::Created | ChangeKind::Modified | ChangeKind::Moved if record.node.is_none() => {
            Err(violation("missing node"))
        }
        ChangeKind::Deleted if record.node.is_some() || record.attribute.is_some() => {
            Err(violation("deleted objects have no node or attribute"))
        }
        _ => Ok(()),
    }
}

impl HistoryWriter for InMemoryHistory {
    fn commit(&self, batch: HistoryBatch) -> HistoryResult<CommitSummary> {
        let document = batch.document();
        for record in batch.records() {
            check_record(document, record)?;
        }

        let mut state = self.write()?;
        let history = state.documents.entry(document).or_default();
        let mut summary = CommitSummary {
            document,
            cleared: 0,
            appended: 0,
        };

        for op in batch.into_ops() {
            match op {
                HistoryOp::ClearAll => {
                    summary.cleared += history.queue.len();
                    *history = DocumentHistory::default();
                }
                HistoryOp::Append(record) => {
                    history.push(record);
                    summary.appended += 1;
                }
                HistoryOp::SetFlags(node, flags) => {
                    let entry = history.flags.entry(node).or_default();
                    *entry = entry.union(flags);
                }
                HistoryOp::SetDiffSource(source) => history.diff_source = Some(source),
            }
        }

        if history.is_empty() {
            state.documents.remove(&document);
        }

        debug!(
            document = %document,
            cleared = summary.cleared,
            appended = summary.appended,
            "history batch committed"
        );
        Ok(summary)
    }

    fn append(&self, document: SnapshotId, record: ChangeRecord) -> HistoryResult<ChangeRecord> {
        check_record(document, &record)?;
        let mut state = self.write()?;
        let history = state.documents.entry(document).or_default();
        Ok(history.push(record).clone())
    }
}

impl HistoryReader for InMemoryHistory {
    fn document_records(&self, document: SnapshotId) -> HistoryResult<Vec<ChangeRecord>> {
        Ok(self
            .with_document(document, |h| h.queue.clone())?
            .unwrap_or_default())
    }

    fn records_for(&self, document: SnapshotId, node: NodeId) -> HistoryResult<Vec<ChangeRecord>> {
        Ok(self
            .with_document(document, |h| h.node_records(node).cloned().collect())?
            .unwrap_or_default())
    }

    fn first_change(
        &self,
        document: SnapshotId,
        node: NodeId,
        attribute: Option<AttrId>,
    ) -> HistoryResult<Option<ChangeRecord>> {
        Ok(self
            .with_document(document, |h| {
                h.node_records(node)
                    .find(|r| attribute.map_or(true, |a| r.touches(a)))
                    .cloned()
            })?
            .flatten())
    }

    fn latest_change(
        &self,
        document: SnapshotId,
        node: NodeId,
        attribute: Option<AttrId>,
    ) -> HistoryResult<Option<ChangeRecord>> {
        Ok(self
            .with_document(document, |h| {
                let positions = h.by_node.get(&node)?;
                positions
                    .iter()
                    .rev()
                    .map(|&position| &h.queue[position])
                    .find(|r| attribute.map_or(true, |a| r.touches(a)))
                    .cloned()
            })?
            .flatten())
    }

    fn flags(&self, document: SnapshotId, node: NodeId) -> HistoryResult<ChangeFlags> {
        Ok(self
            .with_document(document, |h| h.flags.get(&node).copied().unwrap_or_default())?
            .unwrap_or_default())
    }

    fn diff_source(&self, document: SnapshotId) -> HistoryResult<Option<SnapshotId>> {
        Ok(self.with_document(document, |h| h.diff_source)?.flatten())
    }

    fn record_count(&self, document: SnapshotId) -> HistoryResult<usize> {
        Ok(self
            .with_document(document, |h| h.queue.len())?
            .unwrap_or(0))
    }
}
