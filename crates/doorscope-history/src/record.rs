use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use doorscope_types::{AttrId, NodeId, StableId, Value};

/// What kind of difference a change record describes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChangeKind {
    Created,
    Modified,
    Deleted,
    Moved,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created => write!(f, "created"),
            Self::Modified => write!(f, "modified"),
            Self::Deleted => write!(f, "deleted"),
            Self::Moved => write!(f, "moved"),
        }
    }
}

/// One detected difference between two versions of a document.
///
/// Records are immutable once committed. `seq` is the 1-based position in the
/// document's chronological queue and is assigned by the history store.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChangeRecord {
    pub seq: u64,
    pub kind: ChangeKind,
    /// Stable id of the changed object.
    pub subject: StableId,
    /// The object in the current snapshot; `None` when it no longer exists.
    pub node: Option<NodeId>,
    /// Changed attribute, set for `Modified` only.
    pub attribute: Option<AttrId>,
    pub old_value: Value,
    pub new_value: Value,
    pub author: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
    /// Free-text description, used where the subject cannot be shown.
    pub info: Option<String>,
}

impl ChangeRecord {
    fn new(kind: ChangeKind, subject: StableId, node: Option<NodeId>) -> Self {
        Self {
            seq: 0,
            kind,
            subject,
            node,
            attribute: None,
            old_value: Value::Null,
            new_value: Value::Null,
            author: None,
            timestamp: None,
            info: None,
        }
    }

    pub fn created(subject: StableId, node: NodeId) -> Self {
        Self::new(ChangeKind::Created, subject, Some(node))
    }

    pub fn modified(
        subject: StableId,
        node: NodeId,
        attribute: AttrId,
        old_value: Value,
        new_value: Value,
    ) -> Self {
        Self {
            attribute: Some(attribute),
            old_value,
            new_value,
            ..Self::new(ChangeKind::Modified, subject, Some(node))
        }
    }

    pub fn moved(subject: StableId, node: NodeId, info: impl Into<String>) -> Self {
        Self {
            info: Some(info.into()),
            ..Self::new(ChangeKind::Moved, subject, Some(node))
        }
    }

    /// A removed object. `info` summarizes it since it cannot be navigated to.
    pub fn deleted(subject: StableId, info: impl Into<String>) -> Self {
        Self {
            info: Some(info.into()),
            ..Self::new(ChangeKind::Deleted, subject, None)
        }
    }

    /// Attach attribution.
    pub fn by(mut self, author: Option<String>, timestamp: Option<DateTime<Utc>>) -> Self {
        self.author = author;
        self.timestamp = timestamp;
        self
    }

    /// Returns `true` if this record concerns `attribute`.
    pub fn touches(&self, attribute: AttrId) -> bool {
        self.attribute == Some(attribute)
    }
}

/// Change markers of one node, as shown by the review views.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeFlags {
    pub text: bool,
    pub attributes: bool,
    pub moved: bool,
}

impl ChangeFlags {
    pub const TEXT: Self = Self {
        text: true,
        attributes: false,
        moved: false,
    };
    pub const ATTRIBUTES: Self = Self {
        text: false,
        attributes: true,
        moved: false,
    };
    pub const MOVED: Self = Self {
        text: false,
        attributes: false,
        moved: true,
    };
    pub const ALL: Self = Self {
        text: true,
        attributes: true,
        moved: true,
    };

    pub fn is_empty(&self) -> bool {
        !(self.text || self.attributes || self.moved)
    }

    pub fn union(self, other: Self) -> Self {
        Self {
            text: self.text || other.text,
            attributes: self.attributes || other.attributes,
            moved: self.moved || other.moved,
        }
    }
}
