//! Document snapshots for DoorScope.
//!
//! A snapshot is an immutable tree of document objects rooted at a document
//! node. The diff engine never touches snapshot storage directly; it walks
//! snapshots through the [`SnapshotReader`] trait.
//!
//! # Contents
//!
//! - [`Snapshot`] / [`SnapshotBuilder`] -- arena-backed snapshot and its builder
//! - [`SnapshotReader`] -- read-only traversal boundary
//! - [`content_preorder`] -- depth-first walk over content nodes
//! - [`load_document`] -- JSON document format
//! - [`RichTextCodec`] / [`PlainTextCodec`] -- stored value to plain text
//!
//! # Design Rules
//!
//! 1. Snapshots are validated once when built and immutable afterwards.
//! 2. Nodes are addressed by [`NodeId`](doorscope_types::NodeId) arena
//!    handles; no references into the arena escape.
//! 3. Link stubs are part of the tree but never content.

pub mod codec;
pub mod document;
pub mod error;
pub mod snapshot;
pub mod traits;
pub mod traverse;

pub use codec::{CodecError, PlainTextCodec, RichTextCodec};
pub use document::{build_document, load_document, load_document_file, DocumentSpec, NodeSpec};
pub use error::{StoreError, StoreResult};
pub use snapshot::{NodeData, Snapshot, SnapshotBuilder};
pub use traits::SnapshotReader;
pub use traverse::{content_preorder, preceding_content_sibling, Visit};
