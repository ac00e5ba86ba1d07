use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::warn;

use doorscope_types::{names, AttrId, Schema};

use crate::error::{DiffError, DiffResult};

/// Settings of a history computation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffConfig {
    /// Attribute names compared between matched objects.
    pub tracked_attributes: Vec<String>,
    /// Characters of object text kept in the summary of a deleted object.
    pub summary_length: usize,
    /// Record `Moved` changes when an object's parent or predecessor changed.
    pub detect_moves: bool,
}

impl Default for DiffConfig {
    fn default() -> Self {
        Self {
            tracked_attributes: vec![names::OBJECT_TEXT.to_string()],
            summary_length: 40,
            detect_moves: true,
        }
    }
}

impl DiffConfig {
    /// Parse a TOML document; missing keys take their defaults.
    pub fn from_toml_str(text: &str) -> DiffResult<Self> {
        toml::from_str(text).map_err(|e| DiffError::Config(e.to_string()))
    }

    /// Resolve the tracked attribute names against `schema`.
    ///
    /// Names the schema does not know yet are interned, so they simply never
    /// change in snapshots that do not carry them.
    pub fn resolve_tracked(&self, schema: &mut Schema) -> BTreeSet<AttrId> {
        self.tracked_attributes
            .iter()
            .map(|name| {
                schema.lookup(name).unwrap_or_else(|| {
                    warn!(attribute = %name, "tracked attribute not in schema");
                    schema.intern(name)
                })
            })
            .collect()
    }
}
