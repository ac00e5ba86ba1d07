use doorscope_types::{AttrId, NodeId, NodeKind, Role, Schema, SnapshotId, StableId, Value};

use crate::error::StoreResult;

/// Read-only traversal over one document snapshot.
///
/// This is the only way the diff engine reaches a snapshot. Implementations
/// must satisfy these invariants:
/// - The root is a [`NodeKind::Document`] node for well-formed snapshots.
/// - Children are ordered; `first_child` / `next_sibling` enumerate them
///   left to right and every child's `parent` is the enumerating node.
/// - Split links are reciprocal: `split_partner(a) == Some(b)` implies
///   `split_partner(b) == Some(a)`.
/// - A handle that does not belong to the snapshot yields
///   [`StoreError::NodeNotFound`](crate::StoreError::NodeNotFound).
pub trait SnapshotReader {
    fn snapshot_id(&self) -> SnapshotId;

    fn root(&self) -> NodeId;

    fn kind(&self, node: NodeId) -> StoreResult<NodeKind>;

    fn parent(&self, node: NodeId) -> StoreResult<Option<NodeId>>;

    fn first_child(&self, node: NodeId) -> StoreResult<Option<NodeId>>;

    fn next_sibling(&self, node: NodeId) -> StoreResult<Option<NodeId>>;

    /// The other half of a split pair, if `node` is part of one.
    fn split_partner(&self, node: NodeId) -> StoreResult<Option<NodeId>>;

    /// Attribute value, `Value::Null` when unset.
    fn value(&self, node: NodeId, attr: AttrId) -> StoreResult<Value>;

    /// The node owning `node`; its parent.
    fn owner(&self, node: NodeId) -> StoreResult<Option<NodeId>> {
        self.parent(node)
    }

    /// Returns `true` if `node` is the body half of a split pair.
    fn is_split_body(&self, node: NodeId) -> StoreResult<bool> {
        Ok(self.kind(node)?.role() == Role::Body && self.split_partner(node)?.is_some())
    }

    /// Stable id read through the schema's identifier attribute.
    fn stable_id(&self, node: NodeId, schema: &Schema) -> StoreResult<Option<StableId>> {
        Ok(StableId::from_value(&self.value(node, schema.identifier())?))
    }

    /// All children of `node`, in order.
    fn children(&self, node: NodeId) -> StoreResult<Vec<NodeId>> {
        let mut out = Vec::new();
        let mut cursor = self.first_child(node)?;
        while let Some(child) = cursor {
            out.push(child);
            cursor = self.next_sibling(child)?;
        }
        Ok(out)
    }
}
