//! Depth-first traversal of content nodes.

use std::collections::HashSet;

use doorscope_types::NodeId;

use crate::error::{StoreError, StoreResult};
use crate::traits::SnapshotReader;

/// One node reached by [`content_preorder`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Visit {
    pub node: NodeId,
    /// The closest preceding sibling that is itself a content node.
    pub preceding: Option<NodeId>,
    /// Depth below the root; top-level objects are at depth 1.
    pub depth: usize,
}

/// Pre-order walk of all content nodes below `root` (the root excluded).
///
/// Parents come before children and siblings left to right. Link stubs and
/// everything below them are skipped. A node reached twice means the sibling
/// or child links form a cycle, which is reported as a malformed snapshot.
pub fn content_preorder<R: SnapshotReader + ?Sized>(
    reader: &R,
    root: NodeId,
) -> StoreResult<Vec<Visit>> {
    let mut out = Vec::new();
    let mut seen = HashSet::new();
    seen.insert(root);

    // Per level: next sibling to visit and the last content node seen.
    let mut stack: Vec<(Option<NodeId>, Option<NodeId>)> = vec![(reader.first_child(root)?, None)];

    while let Some(level) = stack.last_mut() {
        let Some(node) = level.0 else {
            stack.pop();
            continue;
        };
        if !seen.insert(node) {
            return Err(StoreError::MalformedSnapshot(format!(
                "node {node} reached twice during traversal"
            )));
        }
        level.0 = reader.next_sibling(node)?;

        if !reader.kind(node)?.is_content() {
            continue;
        }
        let preceding = level.1.replace(node);
        let depth = stack.len();
        out.push(Visit {
            node,
            preceding,
            depth,
        });
        stack.push((reader.first_child(node)?, None));
    }

    Ok(out)
}

/// The closest preceding content sibling of `node`.
pub fn preceding_content_sibling<R: SnapshotReader + ?Sized>(
    reader: &R,
    node: NodeId,
) -> StoreResult<Option<NodeId>> {
    let Some(parent) = reader.parent(node)? else {
        return Ok(None);
    };
    let mut last = None;
    for sibling in reader.children(parent)? {
        if sibling == node {
            return Ok(last);
        }
        if reader.kind(sibling)?.is_content() {
            last = Some(sibling);
        }
    }
    Err(StoreError::MalformedSnapshot(format!(
        "node {node} is not a child of its parent {parent}"
    )))
}
