use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::TypeError;
use crate::value::Value;

/// Arena handle of a node inside one snapshot.
///
/// A `NodeId` is only meaningful together with the snapshot that issued it.
/// Handles are never reused within a snapshot and never point into mutable
/// storage.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(u32);

impl NodeId {
    /// Create a handle from a raw arena index.
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// The arena index.
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Stable identifier ("Absolute Number") of a document object.
///
/// Stable ids survive across versions of a document and are the key used to
/// match nodes of two snapshots. Within one snapshot an id is unique, except
/// for the two halves of a split pair.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StableId {
    Number(i64),
    Text(String),
}

impl StableId {
    /// Interpret an identifier attribute value.
    ///
    /// Integers and non-empty strings are identifiers; whole-valued reals are
    /// accepted as integers. Everything else means "no identifier".
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Integer(n) => Some(Self::Number(*n)),
            Value::Real(r) if r.fract() == 0.0 && r.is_finite() => Some(Self::Number(*r as i64)),
            Value::String(s) if !s.trim().is_empty() => Some(Self::Text(s.trim().to_string())),
            _ => None,
        }
    }

    /// The identifier as an attribute value.
    pub fn to_value(&self) -> Value {
        match self {
            Self::Number(n) => Value::Integer(*n),
            Self::Text(s) => Value::String(s.clone()),
        }
    }
}

impl fmt::Debug for StableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "StableId({n})"),
            Self::Text(s) => write!(f, "StableId({s:?})"),
        }
    }
}

impl fmt::Display for StableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<i64> for StableId {
    fn from(n: i64) -> Self {
        Self::Number(n)
    }
}

impl From<&str> for StableId {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl FromStr for StableId {
    type Err = TypeError;

    /// Numeric text parses as a number, anything else as a text id.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(TypeError::InvalidIdentifier(s.to_string()));
        }
        Ok(match trimmed.parse::<i64>() {
            Ok(n) => Self::Number(n),
            Err(_) => Self::Text(trimmed.to_string()),
        })
    }
}

/// Identity of one document snapshot (UUID v7, time ordered).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SnapshotId(Uuid);

impl SnapshotId {
    /// Generate a fresh snapshot id.
    pub fn generate() -> Self {
        Self(Uuid::now_v7())
    }

    /// Wrap an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Short form (first 8 hex digits) for log output.
    pub fn short(&self) -> String {
        self.0.simple().to_string()[..8].to_string()
    }
}

impl fmt::Debug for SnapshotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SnapshotId({})", self.short())
    }
}

impl fmt::Display for SnapshotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Interned attribute name, issued by a [`Schema`](crate::Schema).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AttrId(u32);

impl AttrId {
    pub(crate) const fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u32 {
        self.0
    }
}

impl fmt::Debug for AttrId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AttrId({})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stable_id_from_integer_value() {
        assert_eq!(
            StableId::from_value(&Value::Integer(42)),
            Some(StableId::Number(42))
        );
    }

    #[test]
    fn stable_id_from_whole_real() {
        assert_eq!(
            StableId::from_value(&Value::Real(7.0)),
            Some(StableId::Number(7))
        );
        assert_eq!(StableId::from_value(&Value::Real(7.5)), None);
    }

    #[test]
    fn null_and_blank_values_have_no_id() {
        assert_eq!(StableId::from_value(&Value::Null), None);
        assert_eq!(StableId::from_value(&Value::String("  ".into())), None);
    }

    #[test]
    fn parse_prefers_numbers() {
        assert_eq!("12".parse::<StableId>().unwrap(), StableId::Number(12));
        assert_eq!(
            "REQ-7".parse::<StableId>().unwrap(),
            StableId::Text("REQ-7".into())
        );
        assert!("".parse::<StableId>().is_err());
    }

    #[test]
    fn stable_id_serde_is_untagged() {
        let json = serde_json::to_string(&StableId::Number(3)).unwrap();
        assert_eq!(json, "3");
        let parsed: StableId = serde_json::from_str("\"A-1\"").unwrap();
        assert_eq!(parsed, StableId::Text("A-1".into()));
    }

    #[test]
    fn snapshot_ids_are_unique() {
        let a = SnapshotId::generate();
        let b = SnapshotId::generate();
        assert_ne!(a, b);
        assert_eq!(a.short().len(), 8);
    }

    #[test]
    fn node_id_display() {
        assert_eq!(format!("{}", NodeId::new(5)), "#5");
        assert_eq!(NodeId::new(5).index(), 5);
    }
}
