//! Diff engine for DoorScope.
//!
//! Compares two snapshots of a requirements document and records what
//! changed as history of the newer one, and renders character-level
//! differences of attribute text for review.
//!
//! # Key Types
//!
//! - [`TreeDiffer`] / [`HistorySummary`] -- stable-id tree comparison
//! - [`IdentifierIndex`] -- stable id to node map of the previous snapshot
//! - [`diff_text`] / [`EditItem`] -- Myers character diff
//! - [`render_diff`] / [`StyledRun`] -- styled runs for display
//! - [`attribute_diff`] -- cumulative difference of one attribute
//! - [`DiffConfig`] -- tracked attributes and summary settings

pub mod config;
pub mod error;
pub mod ident_index;
pub mod render;
pub mod text_diff;
pub mod tree_diff;

pub use config::DiffConfig;
pub use error::{DiffError, DiffResult};
pub use ident_index::{IdentifierIndex, IndexEntry};
pub use render::{attribute_diff, new_text, old_text, render_diff, render_script, RunStyle, StyledRun};
pub use text_diff::{apply_edits, diff_chars, diff_text, EditItem, EditStats};
pub use tree_diff::{HistorySummary, TreeDiffer};
