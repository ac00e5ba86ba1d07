//! Tree-level diff: compare two snapshots of a document and record the
//! differences as change history of the current one.
//!
//! Objects are matched across snapshots by stable id. Every object of the
//! current snapshot is either matched (and compared attribute by attribute
//! and by position) or reported as created; every indexed object of the
//! previous snapshot left unmatched is reported as deleted.

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use doorscope_history::{ChangeFlags, ChangeKind, ChangeRecord, HistoryBatch, HistoryWriter};
use doorscope_store::{content_preorder, preceding_content_sibling, RichTextCodec, SnapshotReader};
use doorscope_types::{AttrId, NodeId, NodeKind, Schema, SnapshotId, StableId, Value};

use crate::config::DiffConfig;
use crate::error::{DiffError, DiffResult};
use crate::ident_index::IdentifierIndex;

/// Counts of one history computation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct HistorySummary {
    pub document: SnapshotId,
    pub source: SnapshotId,
    /// Records erased from the previous history of `document`.
    pub cleared: usize,
    pub created: usize,
    pub modified: usize,
    pub moved: usize,
    pub deleted: usize,
}

impl HistorySummary {
    pub fn total(&self) -> usize {
        self.created + self.modified + self.moved + self.deleted
    }
}

/// Compares document snapshots and writes their differences to a history.
pub struct TreeDiffer<'a> {
    schema: &'a Schema,
    codec: &'a dyn RichTextCodec,
    config: &'a DiffConfig,
}

impl<'a> TreeDiffer<'a> {
    pub fn new(schema: &'a Schema, codec: &'a dyn RichTextCodec, config: &'a DiffConfig) -> Self {
        Self {
            schema,
            codec,
            config,
        }
    }

    /// Replace the change history of `current` with its differences to
    /// `previous`.
    ///
    /// Only attributes in `tracked` are compared. Records are committed in
    /// pre-order of `current`, followed by the deleted objects in pre-order
    /// of `previous`. The history, the change flags and the diff source of
    /// `current` are replaced in one commit; on error nothing is written.
    pub fn compute_history<P, C, H>(
        &self,
        history: &H,
        previous: &P,
        current: &C,
        tracked: &BTreeSet<AttrId>,
    ) -> DiffResult<HistorySummary>
    where
        P: SnapshotReader + ?Sized,
        C: SnapshotReader + ?Sized,
        H: HistoryWriter + ?Sized,
    {
        check_document_root(previous, "previous")?;
        check_document_root(current, "current")?;

        let mut index = IdentifierIndex::build(previous, self.schema)?;
        let visits = content_preorder(current, current.root())?;
        let mut changes = Changes::default();

        for visit in &visits {
            let node = visit.node;
            let Some(id) = current.stable_id(node, self.schema)? else {
                continue;
            };
            let Some(entry) = index.lookup(&id).copied() else {
                let (author, timestamp) = self.attribution(current, node)?;
                changes.emit(
                    node,
                    ChangeRecord::created(id, node).by(author, timestamp),
                    ChangeFlags::TEXT.union(ChangeFlags::ATTRIBUTES),
                );
                continue;
            };

            let prev_kind = previous.kind(entry.node)?;
            let cur_kind = current.kind(node)?;
            if prev_kind.role() != cur_kind.role() {
                // A heading that gained or lost its body half; the half
                // without a counterpart is left unmatched.
                debug!(subject = %id, previous = %prev_kind, current = %cur_kind, "split roles differ");
                continue;
            }
            index.consume(&id);

            let side = Side {
                previous: entry.node,
                previous_preceding: entry.preceding,
                current: node,
                current_preceding: visit.preceding,
            };
            self.compare(previous, current, &id, side, tracked, &mut changes)?;

            if previous.is_split_body(entry.node)? && current.is_split_body(node)? {
                let prev_title = split_title(previous, entry.node)?;
                let cur_title = split_title(current, node)?;
                let side = Side {
                    previous: prev_title,
                    previous_preceding: preceding_content_sibling(previous, prev_title)?,
                    current: cur_title,
                    current_preceding: preceding_content_sibling(current, cur_title)?,
                };
                // Title records use the title's attribution and sit at its
                // position in the queue.
                self.compare(previous, current, &id, side, tracked, &mut changes)?;
            }
        }

        let (author, timestamp) = self.attribution(current, current.root())?;
        let mut deleted = Vec::new();
        for (id, entry) in index.unconsumed() {
            let info = self.summarize(previous, entry.node, id)?;
            deleted.push(ChangeRecord::deleted(id.clone(), info).by(author.clone(), timestamp));
        }

        let document = current.snapshot_id();
        let source = previous.snapshot_id();
        let mut summary = HistorySummary {
            document,
            source,
            cleared: 0,
            created: 0,
            modified: 0,
            moved: 0,
            deleted: deleted.len(),
        };

        let mut batch = HistoryBatch::new(document);
        batch.clear_all();
        for visit in &visits {
            for record in changes.records.remove(&visit.node).unwrap_or_default() {
                match record.kind {
                    ChangeKind::Created => summary.created += 1,
                    ChangeKind::Modified => summary.modified += 1,
                    ChangeKind::Moved => summary.moved += 1,
                    ChangeKind::Deleted => summary.deleted += 1,
                }
                batch.append(record);
            }
            if let Some(flags) = changes.flags.get(&visit.node) {
                batch.set_flags(visit.node, *flags);
            }
        }
        for record in deleted {
            batch.append(record);
        }
        batch.set_diff_source(source);

        let commit = history.commit(batch)?;
        summary.cleared = commit.cleared;

        info!(
            document = %document.short(),
            source = %source.short(),
            created = summary.created,
            modified = summary.modified,
            moved = summary.moved,
            deleted = summary.deleted,
            "history computed"
        );
        Ok(summary)
    }

    /// Compare one matched pair; records are attached to its current node.
    fn compare<P, C>(
        &self,
        previous: &P,
        current: &C,
        id: &StableId,
        side: Side,
        tracked: &BTreeSet<AttrId>,
        changes: &mut Changes,
    ) -> DiffResult<()>
    where
        P: SnapshotReader + ?Sized,
        C: SnapshotReader + ?Sized,
    {
        let (author, timestamp) = self.attribution(current, side.current)?;

        for &attr in tracked {
            let old = previous.value(side.previous, attr)?;
            let new = current.value(side.current, attr)?;
            if self.unchanged(attr, &old, &new) {
                continue;
            }
            let flag = if attr == self.schema.text() {
                ChangeFlags::TEXT
            } else {
                ChangeFlags::ATTRIBUTES
            };
            changes.emit(
                side.current,
                ChangeRecord::modified(id.clone(), side.current, attr, old, new)
                    .by(author.clone(), timestamp),
                flag,
            );
        }

        if !self.config.detect_moves {
            return Ok(());
        }
        let old_parent = parent_id(previous, side.previous, self.schema)?;
        let new_parent = parent_id(current, side.current, self.schema)?;
        let old_after = optional_id(previous, side.previous_preceding, self.schema)?;
        let new_after = optional_id(current, side.current_preceding, self.schema)?;
        if old_parent != new_parent || old_after != new_after {
            let info = format!(
                "parent {} -> {}, after {} -> {}",
                describe(&old_parent),
                describe(&new_parent),
                describe(&old_after),
                describe(&new_after)
            );
            changes.emit(
                side.current,
                ChangeRecord::moved(id.clone(), side.current, info).by(author, timestamp),
                ChangeFlags::MOVED,
            );
        }
        Ok(())
    }

    fn unchanged(&self, attr: AttrId, old: &Value, new: &Value) -> bool {
        match check_comparable(old, new) {
            Ok(()) => old == new,
            Err(e) => {
                debug!(attribute = %self.schema.display_name(attr), error = %e, "treated as changed");
                false
            }
        }
    }

    /// Plain text of a value; undecodable values read as empty.
    fn plain_text(&self, value: &Value) -> String {
        self.codec.decode_to_plain_text(value).unwrap_or_else(|e| {
            debug!(error = %e, "value not readable as text");
            String::new()
        })
    }

    /// Author and time of the last modification of `node`.
    fn attribution<R: SnapshotReader + ?Sized>(
        &self,
        reader: &R,
        node: NodeId,
    ) -> DiffResult<(Option<String>, Option<DateTime<Utc>>)> {
        let author = self.plain_text(&reader.value(node, self.schema.modified_by())?);
        let author = (!author.is_empty()).then_some(author);
        let on = reader.value(node, self.schema.modified_on())?;
        Ok((author, on.as_date()))
    }

    /// Object number and leading text of a deleted object.
    fn summarize<R: SnapshotReader + ?Sized>(
        &self,
        reader: &R,
        node: NodeId,
        id: &StableId,
    ) -> DiffResult<String> {
        let number = self.plain_text(&reader.value(node, self.schema.object_number())?);
        let number = if number.is_empty() { id.to_string() } else { number };
        let text = self.plain_text(&reader.value(node, self.schema.text())?);
        let text = elide(&text, self.config.summary_length);
        Ok(if text.is_empty() {
            number
        } else {
            format!("{number} {text}")
        })
    }
}

/// Node pair being compared, with each side's preceding content sibling.
#[derive(Clone, Copy)]
struct Side {
    previous: NodeId,
    previous_preceding: Option<NodeId>,
    current: NodeId,
    current_preceding: Option<NodeId>,
}

/// Records and flags collected per node of the current snapshot.
#[derive(Default)]
struct Changes {
    records: HashMap<NodeId, Vec<ChangeRecord>>,
    flags: HashMap<NodeId, ChangeFlags>,
}

impl Changes {
    fn emit(&mut self, node: NodeId, record: ChangeRecord, flags: ChangeFlags) {
        debug!(kind = %record.kind, subject = %record.subject, node = %node, "change");
        self.records.entry(node).or_default().push(record);
        let entry = self.flags.entry(node).or_default();
        *entry = entry.union(flags);
    }
}

fn check_document_root<R: SnapshotReader + ?Sized>(reader: &R, which: &str) -> DiffResult<()> {
    let kind = reader.kind(reader.root())?;
    if kind != NodeKind::Document {
        return Err(DiffError::InvalidArgument(format!(
            "{which} snapshot root is a {kind}, not a document"
        )));
    }
    Ok(())
}

/// Values of different types are never equal. Null compares with anything.
fn check_comparable(old: &Value, new: &Value) -> DiffResult<()> {
    if old.is_null() || new.is_null() || old.same_type(new) {
        Ok(())
    } else {
        Err(DiffError::TypeMismatch {
            expected: old.type_name(),
            actual: new.type_name(),
        })
    }
}

fn split_title<R: SnapshotReader + ?Sized>(reader: &R, body: NodeId) -> DiffResult<NodeId> {
    reader
        .split_partner(body)?
        .ok_or_else(|| DiffError::InvalidArgument(format!("split body {body} has no title")))
}

fn parent_id<R: SnapshotReader + ?Sized>(
    reader: &R,
    node: NodeId,
    schema: &Schema,
) -> DiffResult<Option<StableId>> {
    optional_id(reader, reader.parent(node)?, schema)
}

fn optional_id<R: SnapshotReader + ?Sized>(
    reader: &R,
    node: Option<NodeId>,
    schema: &Schema,
) -> DiffResult<Option<StableId>> {
    match node {
        Some(node) => Ok(reader.stable_id(node, schema)?),
        None => Ok(None),
    }
}

fn describe(id: &Option<StableId>) -> String {
    match id {
        Some(id) => id.to_string(),
        None => "none".to_string(),
    }
}

/// First `limit` characters of `text` on one line, marked when cut.
fn elide(text: &str, limit: usize) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= limit {
        return flat;
    }
    let mut out: String = flat.chars().take(limit).collect();
    out.push_str("...");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use doorscope_history::{HistoryReader, InMemoryHistory};
    use doorscope_store::{PlainTextCodec, Snapshot, SnapshotBuilder};

    struct Fixture {
        schema: Schema,
        config: DiffConfig,
        history: InMemoryHistory,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                schema: Schema::doors(),
                config: DiffConfig::default(),
                history: InMemoryHistory::new(),
            }
        }

        fn run(&self, previous: &Snapshot, current: &Snapshot) -> DiffResult<HistorySummary> {
            let tracked = BTreeSet::from([self.schema.text()]);
            TreeDiffer::new(&self.schema, &PlainTextCodec, &self.config).compute_history(
                &self.history,
                previous,
                current,
                &tracked,
            )
        }
    }

    fn flat(schema: &Schema, objects: &[(i64, &str)]) -> Snapshot {
        let mut b = SnapshotBuilder::new("doc");
        let root = b.root();
        for (id, text) in objects {
            let s = b.add(root, NodeKind::Section).unwrap();
            b.set(s, schema.identifier(), *id).unwrap();
            b.set(s, schema.text(), *text).unwrap();
        }
        b.build().unwrap()
    }

    #[test]
    fn elide_flattens_and_cuts() {
        assert_eq!(elide("a\n b\tc", 10), "a b c");
        assert_eq!(elide("abcdef", 3), "abc...");
        assert_eq!(elide("", 3), "");
    }

    #[test]
    fn type_mismatch_counts_as_change() {
        assert!(check_comparable(&Value::from("1"), &Value::Integer(1)).is_err());
        assert!(check_comparable(&Value::Null, &Value::Integer(1)).is_ok());
    }

    #[test]
    fn deleted_summary_uses_number_and_text() {
        let fx = Fixture::new();
        let mut b = SnapshotBuilder::new("doc");
        let root = b.root();
        let s = b.add(root, NodeKind::Section).unwrap();
        b.set(s, fx.schema.identifier(), 4).unwrap();
        b.set(s, fx.schema.object_number(), "1.2").unwrap();
        b.set(s, fx.schema.text(), "Removed requirement").unwrap();
        let previous = b.build().unwrap();
        let current = flat(&fx.schema, &[]);

        let summary = fx.run(&previous, &current).unwrap();
        assert_eq!(summary.deleted, 1);
        let records = fx.history.document_records(current.id()).unwrap();
        assert_eq!(records[0].info.as_deref(), Some("1.2 Removed requirement"));
        assert_eq!(records[0].node, None);
    }

    #[test]
    fn moves_can_be_disabled() {
        let mut fx = Fixture::new();
        fx.config.detect_moves = false;
        let previous = flat(&fx.schema, &[(1, "a"), (2, "b")]);
        let current = flat(&fx.schema, &[(2, "b"), (1, "a")]);

        let summary = fx.run(&previous, &current).unwrap();
        assert_eq!(summary.total(), 0);
    }

    #[test]
    fn nodes_without_id_are_ignored() {
        let fx = Fixture::new();
        let previous = flat(&fx.schema, &[(1, "a")]);
        let mut b = SnapshotBuilder::new("doc");
        let root = b.root();
        let s = b.add(root, NodeKind::Section).unwrap();
        b.set(s, fx.schema.identifier(), 1).unwrap();
        b.set(s, fx.schema.text(), "a").unwrap();
        b.add(root, NodeKind::Section).unwrap();
        let current = b.build().unwrap();

        let summary = fx.run(&previous, &current).unwrap();
        assert_eq!(summary.total(), 0);
        assert_eq!(fx.history.diff_source(current.id()).unwrap(), Some(previous.id()));
    }

    fn kinds(records: &[ChangeRecord]) -> Vec<(ChangeKind, StableId)> {
        records.iter().map(|r| (r.kind, r.subject.clone())).collect()
    }

    #[test]
    fn text_change_is_one_modified_record() {
        let fx = Fixture::new();
        let previous = flat(&fx.schema, &[(1, "alpha"), (2, "gamma")]);
        let current = flat(&fx.schema, &[(1, "alpha beta"), (2, "gamma")]);

        let summary = fx.run(&previous, &current).unwrap();
        assert_eq!(summary.modified, 1);
        assert_eq!(summary.total(), 1);

        let records = fx.history.document_records(current.id()).unwrap();
        let record = &records[0];
        assert_eq!(record.seq, 1);
        assert_eq!(record.kind, ChangeKind::Modified);
        assert_eq!(record.attribute, Some(fx.schema.text()));
        assert_eq!(record.old_value, Value::from("alpha"));
        assert_eq!(record.new_value, Value::from("alpha beta"));

        let node = record.node.unwrap();
        assert_eq!(fx.history.flags(current.id(), node).unwrap(), ChangeFlags::TEXT);
        assert_eq!(fx.history.records_for(current.id(), node).unwrap().len(), 1);
    }

    #[test]
    fn new_object_is_created() {
        let fx = Fixture::new();
        let previous = flat(&fx.schema, &[(1, "a")]);
        let current = flat(&fx.schema, &[(1, "a"), (2, "b")]);

        fx.run(&previous, &current).unwrap();
        let records = fx.history.document_records(current.id()).unwrap();
        assert_eq!(kinds(&records), vec![(ChangeKind::Created, StableId::Number(2))]);
        let flags = fx.history.flags(current.id(), records[0].node.unwrap()).unwrap();
        assert!(flags.text && flags.attributes && !flags.moved);
    }

    #[test]
    fn swapped_siblings_are_moved() {
        let fx = Fixture::new();
        let previous = flat(&fx.schema, &[(1, "a"), (2, "b"), (3, "c")]);
        let current = flat(&fx.schema, &[(1, "a"), (3, "c"), (2, "b")]);

        let summary = fx.run(&previous, &current).unwrap();
        assert_eq!(summary.moved, 2);
        let records = fx.history.document_records(current.id()).unwrap();
        assert_eq!(
            kinds(&records),
            vec![
                (ChangeKind::Moved, StableId::Number(3)),
                (ChangeKind::Moved, StableId::Number(2)),
            ]
        );
        assert_eq!(records[0].info.as_deref(), Some("parent none -> none, after 2 -> 1"));
        assert!(records[0].old_value.is_null());
    }

    #[test]
    fn reparented_object_is_moved() {
        let fx = Fixture::new();
        let previous = flat(&fx.schema, &[(1, "a"), (2, "b")]);
        let mut b = SnapshotBuilder::new("doc");
        let root = b.root();
        let s1 = b.add(root, NodeKind::Section).unwrap();
        b.set(s1, fx.schema.identifier(), 1).unwrap();
        b.set(s1, fx.schema.text(), "a").unwrap();
        let s2 = b.add(s1, NodeKind::Section).unwrap();
        b.set(s2, fx.schema.identifier(), 2).unwrap();
        b.set(s2, fx.schema.text(), "b").unwrap();
        let current = b.build().unwrap();

        fx.run(&previous, &current).unwrap();
        let records = fx.history.document_records(current.id()).unwrap();
        assert_eq!(kinds(&records), vec![(ChangeKind::Moved, StableId::Number(2))]);
        assert_eq!(records[0].node, Some(s2));
        assert_eq!(fx.history.flags(current.id(), s2).unwrap(), ChangeFlags::MOVED);
    }

    #[test]
    fn records_follow_current_preorder_then_deletions() {
        let fx = Fixture::new();
        let previous = flat(&fx.schema, &[(1, "a"), (7, "gone"), (2, "b"), (8, "gone too")]);

        let mut b = SnapshotBuilder::new("doc");
        let root = b.root();
        let s1 = b.add(root, NodeKind::Section).unwrap();
        b.set(s1, fx.schema.identifier(), 1).unwrap();
        b.set(s1, fx.schema.text(), "a!").unwrap();
        let child = b.add(s1, NodeKind::Section).unwrap();
        b.set(child, fx.schema.identifier(), 5).unwrap();
        let s2 = b.add(root, NodeKind::Section).unwrap();
        b.set(s2, fx.schema.identifier(), 2).unwrap();
        b.set(s2, fx.schema.text(), "b!").unwrap();
        let current = b.build().unwrap();

        fx.run(&previous, &current).unwrap();
        let records = fx.history.document_records(current.id()).unwrap();
        assert_eq!(
            kinds(&records),
            vec![
                (ChangeKind::Modified, StableId::Number(1)),
                (ChangeKind::Created, StableId::Number(5)),
                (ChangeKind::Modified, StableId::Number(2)),
                (ChangeKind::Moved, StableId::Number(2)),
                (ChangeKind::Deleted, StableId::Number(7)),
                (ChangeKind::Deleted, StableId::Number(8)),
            ]
        );
        let seqs: Vec<u64> = records.iter().map(|r| r.seq).collect();
        assert_eq!(seqs, vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn recomputing_replaces_history() {
        let fx = Fixture::new();
        let previous = flat(&fx.schema, &[(1, "a"), (2, "b")]);
        let current = flat(&fx.schema, &[(1, "a changed"), (3, "new")]);

        let first = fx.run(&previous, &current).unwrap();
        let before = fx.history.document_records(current.id()).unwrap();
        let second = fx.run(&previous, &current).unwrap();
        let after = fx.history.document_records(current.id()).unwrap();

        assert_eq!(before, after);
        assert_eq!(first.cleared, 0);
        assert_eq!(second.cleared, first.total());
    }

    struct Rerooted<'a> {
        inner: &'a Snapshot,
        root: NodeId,
    }

    impl SnapshotReader for Rerooted<'_> {
        fn snapshot_id(&self) -> SnapshotId {
            self.inner.snapshot_id()
        }
        fn root(&self) -> NodeId {
            self.root
        }
        fn kind(&self, node: NodeId) -> doorscope_store::StoreResult<NodeKind> {
            self.inner.kind(node)
        }
        fn parent(&self, node: NodeId) -> doorscope_store::StoreResult<Option<NodeId>> {
            self.inner.parent(node)
        }
        fn first_child(&self, node: NodeId) -> doorscope_store::StoreResult<Option<NodeId>> {
            self.inner.first_child(node)
        }
        fn next_sibling(&self, node: NodeId) -> doorscope_store::StoreResult<Option<NodeId>> {
            self.inner.next_sibling(node)
        }
        fn split_partner(&self, node: NodeId) -> doorscope_store::StoreResult<Option<NodeId>> {
            self.inner.split_partner(node)
        }
        fn value(&self, node: NodeId, attr: AttrId) -> doorscope_store::StoreResult<Value> {
            self.inner.value(node, attr)
        }
    }

    #[test]
    fn non_document_root_leaves_history_untouched() {
        let fx = Fixture::new();
        let previous = flat(&fx.schema, &[(1, "a")]);
        let current = flat(&fx.schema, &[(1, "b")]);
        fx.run(&previous, &current).unwrap();
        let before = fx.history.document_records(current.id()).unwrap();

        let section = current.first_child(current.root()).unwrap().unwrap();
        let rerooted = Rerooted {
            inner: &current,
            root: section,
        };
        let tracked = BTreeSet::from([fx.schema.text()]);
        let err = TreeDiffer::new(&fx.schema, &PlainTextCodec, &fx.config)
            .compute_history(&fx.history, &previous, &rerooted, &tracked)
            .unwrap_err();

        assert!(matches!(err, DiffError::InvalidArgument(_)));
        assert_eq!(fx.history.document_records(current.id()).unwrap(), before);
    }

    fn split_doc(schema: &Schema, heading: &str, body: &str) -> (Snapshot, NodeId, NodeId) {
        let mut b = SnapshotBuilder::new("doc");
        let root = b.root();
        let title = b.add(root, NodeKind::Title).unwrap();
        b.set(title, schema.identifier(), 1).unwrap();
        b.set(title, schema.text(), heading).unwrap();
        let half = b.split(title, NodeKind::Section).unwrap();
        b.set(half, schema.identifier(), 1).unwrap();
        b.set(half, schema.text(), body).unwrap();
        (b.build().unwrap(), title, half)
    }

    #[test]
    fn split_title_change_is_recorded_on_the_title() {
        let fx = Fixture::new();
        let (previous, _, _) = split_doc(&fx.schema, "Intro", "Body text");
        let (current, title, body) = split_doc(&fx.schema, "Introduction", "Body text!");

        fx.run(&previous, &current).unwrap();
        let records = fx.history.document_records(current.id()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].node, Some(title));
        assert_eq!(records[0].new_value, Value::from("Introduction"));
        assert_eq!(records[1].node, Some(body));
        assert_eq!(fx.history.flags(current.id(), title).unwrap(), ChangeFlags::TEXT);
        assert_eq!(fx.history.flags(current.id(), body).unwrap(), ChangeFlags::TEXT);
    }

    #[test]
    fn opposite_split_roles_are_not_matched() {
        let fx = Fixture::new();
        let (previous, _, _) = split_doc(&fx.schema, "Intro", "Body text");

        let mut b = SnapshotBuilder::new("doc");
        let root = b.root();
        let title = b.add(root, NodeKind::Title).unwrap();
        b.set(title, fx.schema.identifier(), 1).unwrap();
        b.set(title, fx.schema.text(), "Intro").unwrap();
        let current = b.build().unwrap();

        fx.run(&previous, &current).unwrap();
        let records = fx.history.document_records(current.id()).unwrap();
        assert_eq!(kinds(&records), vec![(ChangeKind::Deleted, StableId::Number(1))]);
    }

    #[test]
    fn link_stubs_are_not_content() {
        let fx = Fixture::new();
        let previous = flat(&fx.schema, &[(1, "a")]);
        let mut b = SnapshotBuilder::new("doc");
        let root = b.root();
        let s = b.add(root, NodeKind::Section).unwrap();
        b.set(s, fx.schema.identifier(), 1).unwrap();
        b.set(s, fx.schema.text(), "a").unwrap();
        let link = b.add(s, NodeKind::OutLink).unwrap();
        b.set(link, fx.schema.identifier(), 99).unwrap();
        let current = b.build().unwrap();

        assert_eq!(fx.run(&previous, &current).unwrap().total(), 0);
    }

    #[test]
    fn attribution_comes_from_the_current_object() {
        let fx = Fixture::new();
        let previous = flat(&fx.schema, &[(1, "a")]);
        let when: DateTime<Utc> = "2024-03-01T10:00:00Z".parse().unwrap();
        let mut b = SnapshotBuilder::new("doc");
        let root = b.root();
        let s = b.add(root, NodeKind::Section).unwrap();
        b.set(s, fx.schema.identifier(), 1).unwrap();
        b.set(s, fx.schema.text(), "b").unwrap();
        b.set(s, fx.schema.modified_by(), "jdoe").unwrap();
        b.set(s, fx.schema.modified_on(), when).unwrap();
        let current = b.build().unwrap();

        fx.run(&previous, &current).unwrap();
        let record = fx.history.latest_change(current.id(), s, None).unwrap().unwrap();
        assert_eq!(record.author.as_deref(), Some("jdoe"));
        assert_eq!(record.timestamp, Some(when));
    }

    #[test]
    fn changed_value_type_is_modified() {
        let fx = Fixture::new();
        let mut b = SnapshotBuilder::new("doc");
        let s = b.add(b.root(), NodeKind::Section).unwrap();
        b.set(s, fx.schema.identifier(), 1).unwrap();
        b.set(s, fx.schema.text(), "5").unwrap();
        let previous = b.build().unwrap();
        let mut b = SnapshotBuilder::new("doc");
        let s = b.add(b.root(), NodeKind::Section).unwrap();
        b.set(s, fx.schema.identifier(), 1).unwrap();
        b.set(s, fx.schema.text(), 5).unwrap();
        let current = b.build().unwrap();

        assert_eq!(fx.run(&previous, &current).unwrap().modified, 1);
    }
}
