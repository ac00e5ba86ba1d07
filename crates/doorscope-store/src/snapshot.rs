use std::collections::{BTreeMap, HashSet};

use doorscope_types::{AttrId, NodeId, NodeKind, Role, Schema, SnapshotId, StableId, Value};

use crate::error::{StoreError, StoreResult};
use crate::traits::SnapshotReader;
use crate::traverse::content_preorder;

/// Arena record of one node.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeData {
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    pub first_child: Option<NodeId>,
    pub last_child: Option<NodeId>,
    pub next_sibling: Option<NodeId>,
    pub split: Option<NodeId>,
    pub attributes: BTreeMap<AttrId, Value>,
}

impl NodeData {
    fn new(kind: NodeKind, parent: Option<NodeId>) -> Self {
        Self {
            kind,
            parent,
            first_child: None,
            last_child: None,
            next_sibling: None,
            split: None,
            attributes: BTreeMap::new(),
        }
    }
}

/// Immutable document snapshot held in an arena.
///
/// Node 0 is always the document root. Snapshots are produced by
/// [`SnapshotBuilder`] (or the JSON loader, which uses it) and are validated
/// once on construction; afterwards they are never mutated.
#[derive(Clone, Debug)]
pub struct Snapshot {
    id: SnapshotId,
    name: String,
    nodes: Vec<NodeData>,
}

impl Snapshot {
    pub fn id(&self) -> SnapshotId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of nodes, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    pub fn node(&self, id: NodeId) -> StoreResult<&NodeData> {
        self.nodes.get(id.index()).ok_or(StoreError::NodeNotFound(id))
    }

    /// Content nodes carrying `stable_id`, in pre-order.
    ///
    /// A split pair yields both halves, title first.
    pub fn nodes_with_stable_id(
        &self,
        schema: &Schema,
        stable_id: &StableId,
    ) -> StoreResult<Vec<NodeId>> {
        let mut out = Vec::new();
        for visit in content_preorder(self, self.root())? {
            if self.stable_id(visit.node, schema)?.as_ref() == Some(stable_id) {
                out.push(visit.node);
            }
        }
        Ok(out)
    }

    /// Check the structural invariants of the arena.
    ///
    /// - node 0 is the only `Document` node
    /// - every link points into the arena
    /// - every node is reachable from the root exactly once, and its
    ///   `parent` is the node whose child list contains it
    /// - split links are reciprocal and join a `Title` with a body node
    pub fn validate(&self) -> StoreResult<()> {
        let root = self
            .nodes
            .first()
            .ok_or_else(|| StoreError::MalformedSnapshot("snapshot has no root".into()))?;
        if root.kind != NodeKind::Document {
            return Err(StoreError::MalformedSnapshot(format!(
                "root is a {} node, expected document",
                root.kind
            )));
        }
        if root.parent.is_some() {
            return Err(StoreError::MalformedSnapshot("root has a parent".into()));
        }

        let mut seen = HashSet::new();
        let mut pending = vec![NodeId::new(0)];
        seen.insert(NodeId::new(0));
        while let Some(id) = pending.pop() {
            let mut cursor = self.node(id)?.first_child;
            while let Some(child) = cursor {
                let data = self.node(child)?;
                if !seen.insert(child) {
                    return Err(StoreError::MalformedSnapshot(format!(
                        "node {child} is linked more than once"
                    )));
                }
                if data.kind == NodeKind::Document {
                    return Err(StoreError::MalformedSnapshot(format!(
                        "nested document node {child}"
                    )));
                }
                if data.parent != Some(id) {
                    return Err(StoreError::MalformedSnapshot(format!(
                        "node {child} listed under {id} but its parent is {:?}",
                        data.parent
                    )));
                }
                pending.push(child);
                cursor = data.next_sibling;
            }
        }
        if seen.len() != self.nodes.len() {
            return Err(StoreError::MalformedSnapshot(format!(
                "{} nodes are not reachable from the root",
                self.nodes.len() - seen.len()
            )));
        }

        for (index, data) in self.nodes.iter().enumerate() {
            let id = NodeId::new(index as u32);
            let Some(partner) = data.split else { continue };
            let other = self.node(partner)?;
            if other.split != Some(id) {
                return Err(StoreError::MalformedSnapshot(format!(
                    "split link {id} -> {partner} is not reciprocal"
                )));
            }
            let roles = (data.kind.role(), other.kind.role());
            if !matches!(roles, (Role::Heading, Role::Body) | (Role::Body, Role::Heading)) {
                return Err(StoreError::MalformedSnapshot(format!(
                    "split pair {id}/{partner} must join a title with a body node"
                )));
            }
        }

        Ok(())
    }
}

impl SnapshotReader for Snapshot {
    fn snapshot_id(&self) -> SnapshotId {
        self.id
    }

    fn root(&self) -> NodeId {
        NodeId::new(0)
    }

    fn kind(&self, node: NodeId) -> StoreResult<NodeKind> {
        Ok(self.node(node)?.kind)
    }

    fn parent(&self, node: NodeId) -> StoreResult<Option<NodeId>> {
        Ok(self.node(node)?.parent)
    }

    fn first_child(&self, node: NodeId) -> StoreResult<Option<NodeId>> {
        Ok(self.node(node)?.first_child)
    }

    fn next_sibling(&self, node: NodeId) -> StoreResult<Option<NodeId>> {
        Ok(self.node(node)?.next_sibling)
    }

    fn split_partner(&self, node: NodeId) -> StoreResult<Option<NodeId>> {
        Ok(self.node(node)?.split)
    }

    fn value(&self, node: NodeId, attr: AttrId) -> StoreResult<Value> {
        Ok(self
            .node(node)?
            .attributes
            .get(&attr)
            .cloned()
            .unwrap_or_default())
    }
}

/// Incremental constructor for [`Snapshot`]s.
pub struct SnapshotBuilder {
    id: SnapshotId,
    name: String,
    nodes: Vec<NodeData>,
}

impl SnapshotBuilder {
    /// Start a snapshot containing only the document root.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: SnapshotId::generate(),
            name: name.into(),
            nodes: vec![NodeData::new(NodeKind::Document, None)],
        }
    }

    /// Use a fixed snapshot id instead of a generated one.
    pub fn with_id(mut self, id: SnapshotId) -> Self {
        self.id = id;
        self
    }

    pub fn root(&self) -> NodeId {
        NodeId::new(0)
    }

    /// Append a new node of `kind` as the last child of `parent`.
    pub fn add(&mut self, parent: NodeId, kind: NodeKind) -> StoreResult<NodeId> {
        if kind == NodeKind::Document {
            return Err(StoreError::MalformedSnapshot(
                "a snapshot has exactly one document node".into(),
            ));
        }
        let id = self.push(kind, parent)?;
        let last = self.node_mut(parent)?.last_child.replace(id);
        match last {
            Some(prev) => self.node_mut(prev)?.next_sibling = Some(id),
            None => self.node_mut(parent)?.first_child = Some(id),
        }
        Ok(id)
    }

    /// Split `title` by inserting a body node of `kind` as its first child.
    ///
    /// The two nodes are linked reciprocally. Copying the stable id onto the
    /// body is left to the caller.
    pub fn split(&mut self, title: NodeId, kind: NodeKind) -> StoreResult<NodeId> {
        let data = self.node_mut(title)?;
        if data.kind != NodeKind::Title {
            return Err(StoreError::MalformedSnapshot(format!(
                "only titles can be split, {title} is a {}",
                data.kind
            )));
        }
        if data.split.is_some() {
            return Err(StoreError::MalformedSnapshot(format!(
                "title {title} is already split"
            )));
        }
        if kind.role() != Role::Body {
            return Err(StoreError::MalformedSnapshot(format!(
                "split body must be a body node, got {kind}"
            )));
        }

        let body = self.push(kind, title)?;
        let title_data = self.node_mut(title)?;
        let old_first = title_data.first_child.replace(body);
        if title_data.last_child.is_none() {
            title_data.last_child = Some(body);
        }
        title_data.split = Some(body);
        let body_data = self.node_mut(body)?;
        body_data.next_sibling = old_first;
        body_data.split = Some(title);
        Ok(body)
    }

    pub fn set(&mut self, node: NodeId, attr: AttrId, value: impl Into<Value>) -> StoreResult<()> {
        let value = value.into();
        let attributes = &mut self.node_mut(node)?.attributes;
        if value.is_null() {
            attributes.remove(&attr);
        } else {
            attributes.insert(attr, value);
        }
        Ok(())
    }

    /// Validate and freeze the snapshot.
    pub fn build(self) -> StoreResult<Snapshot> {
        let snapshot = Snapshot {
            id: self.id,
            name: self.name,
            nodes: self.nodes,
        };
        snapshot.validate()?;
        Ok(snapshot)
    }

    fn push(&mut self, kind: NodeKind, parent: NodeId) -> StoreResult<NodeId> {
        self.node_mut(parent)?;
        let id = NodeId::new(self.nodes.len() as u32);
        self.nodes.push(NodeData::new(kind, Some(parent)));
        Ok(id)
    }

    fn node_mut(&mut self, id: NodeId) -> StoreResult<&mut NodeData> {
        self.nodes
            .get_mut(id.index())
            .ok_or(StoreError::NodeNotFound(id))
    }
}
