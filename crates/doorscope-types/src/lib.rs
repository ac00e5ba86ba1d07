//! Foundation types for DoorScope.
//!
//! This crate provides the identity, structural and value types shared by the
//! snapshot store, the change history and the diff engine.
//!
//! # Key Types
//!
//! - [`NodeId`] -- arena handle of a node inside one snapshot
//! - [`StableId`] -- version-stable object identifier ("Absolute Number")
//! - [`SnapshotId`] -- UUID v7 identity of a document snapshot
//! - [`NodeKind`] / [`Role`] -- closed set of node kinds and their matching role
//! - [`Value`] / [`RichText`] -- typed attribute values
//! - [`Schema`] / [`AttrId`] -- attribute atom registry with well-known roles

pub mod error;
pub mod id;
pub mod kind;
pub mod schema;
pub mod value;

pub use error::TypeError;
pub use id::{AttrId, NodeId, SnapshotId, StableId};
pub use kind::{NodeKind, Role};
pub use schema::{names, Schema};
pub use value::{Fragment, RichText, Value};
