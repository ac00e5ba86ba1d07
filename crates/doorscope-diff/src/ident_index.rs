//! Stable-id index over the previous snapshot.

use std::collections::HashMap;

use doorscope_store::{content_preorder, SnapshotReader};
use doorscope_types::{NodeId, Schema, StableId};

use crate::error::DiffResult;

/// Where an indexed object sits in the previous snapshot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IndexEntry {
    pub node: NodeId,
    /// Closest preceding content sibling.
    pub preceding: Option<NodeId>,
    /// Pre-order position of `node`.
    pub order: usize,
    /// Set once a counterpart was found in the current snapshot.
    pub consumed: bool,
}

/// Map from stable id to node of one snapshot.
///
/// When several nodes carry the same id the one visited last wins. For a
/// split pair that is the body, which is inserted as the title's first child.
#[derive(Clone, Debug, Default)]
pub struct IdentifierIndex {
    entries: HashMap<StableId, IndexEntry>,
}

impl IdentifierIndex {
    /// Index all content nodes of `reader` that carry a stable id.
    pub fn build<R: SnapshotReader + ?Sized>(reader: &R, schema: &Schema) -> DiffResult<Self> {
        let mut entries = HashMap::new();
        for (order, visit) in content_preorder(reader, reader.root())?.into_iter().enumerate() {
            if let Some(id) = reader.stable_id(visit.node, schema)? {
                entries.insert(
                    id,
                    IndexEntry {
                        node: visit.node,
                        preceding: visit.preceding,
                        order,
                        consumed: false,
                    },
                );
            }
        }
        Ok(Self { entries })
    }

    pub fn lookup(&self, id: &StableId) -> Option<&IndexEntry> {
        self.entries.get(id)
    }

    /// Mark `id` as matched. Returns `false` for an unknown id.
    pub fn consume(&mut self, id: &StableId) -> bool {
        match self.entries.get_mut(id) {
            Some(entry) => {
                entry.consumed = true;
                true
            }
            None => false,
        }
    }

    /// Entries never matched, in pre-order of the indexed snapshot.
    pub fn unconsumed(&self) -> Vec<(&StableId, &IndexEntry)> {
        let mut out: Vec<_> = self.entries.iter().filter(|(_, e)| !e.consumed).collect();
        out.sort_by_key(|(_, e)| e.order);
        out
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use doorscope_store::SnapshotBuilder;
    use doorscope_types::NodeKind;

    #[test]
    fn split_body_wins_over_title() {
        let schema = Schema::doors();
        let mut b = SnapshotBuilder::new("doc");
        let root = b.root();
        let title = b.add(root, NodeKind::Title).unwrap();
        b.set(title, schema.identifier(), 1).unwrap();
        let body = b.split(title, NodeKind::Section).unwrap();
        b.set(body, schema.identifier(), 1).unwrap();
        let plain = b.add(root, NodeKind::Section).unwrap();
        b.set(plain, schema.identifier(), 2).unwrap();
        let snap = b.build().unwrap();

        let index = IdentifierIndex::build(&snap, &schema).unwrap();
        assert_eq!(index.len(), 2);
        assert_eq!(index.lookup(&StableId::Number(1)).unwrap().node, body);
        let entry = index.lookup(&StableId::Number(2)).unwrap();
        assert_eq!(entry.node, plain);
        assert_eq!(entry.preceding, Some(title));
    }

    #[test]
    fn unconsumed_in_preorder() {
        let schema = Schema::doors();
        let mut b = SnapshotBuilder::new("doc");
        let root = b.root();
        for n in [5, 3, 9] {
            let s = b.add(root, NodeKind::Section).unwrap();
            b.set(s, schema.identifier(), n).unwrap();
        }
        // Objects without an id are not indexed.
        b.add(root, NodeKind::Section).unwrap();
        let snap = b.build().unwrap();

        let mut index = IdentifierIndex::build(&snap, &schema).unwrap();
        assert_eq!(index.len(), 3);
        assert!(index.consume(&StableId::Number(3)));
        assert!(!index.consume(&StableId::Number(4)));

        let left: Vec<_> = index.unconsumed().into_iter().map(|(id, _)| id.clone()).collect();
        assert_eq!(left, vec![StableId::Number(5), StableId::Number(9)]);
    }
}
