use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// The closed set of node kinds a document snapshot contains.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// Root of a snapshot.
    Document,
    /// Heading object; the heading half of a split pair.
    Title,
    /// Body text object; the body half of a split pair.
    Section,
    Table,
    TableRow,
    TableCell,
    Picture,
    /// Stub for an outgoing link. Not a content node.
    OutLink,
    /// Stub for an incoming link. Not a content node.
    InLink,
}

/// Structural role used when matching nodes across snapshots.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Root,
    Heading,
    Body,
    LinkStub,
}

impl NodeKind {
    /// All kinds, in declaration order.
    pub const ALL: [NodeKind; 9] = [
        Self::Document,
        Self::Title,
        Self::Section,
        Self::Table,
        Self::TableRow,
        Self::TableCell,
        Self::Picture,
        Self::OutLink,
        Self::InLink,
    ];

    pub fn role(&self) -> Role {
        match self {
            Self::Document => Role::Root,
            Self::Title => Role::Heading,
            Self::Section | Self::Table | Self::TableRow | Self::TableCell | Self::Picture => {
                Role::Body
            }
            Self::OutLink | Self::InLink => Role::LinkStub,
        }
    }

    /// Link stubs mirror objects of other documents and carry foreign ids.
    pub fn is_link_stub(&self) -> bool {
        self.role() == Role::LinkStub
    }

    /// Content nodes take part in identifier matching.
    pub fn is_content(&self) -> bool {
        matches!(self.role(), Role::Heading | Role::Body)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Document => "document",
            Self::Title => "title",
            Self::Section => "section",
            Self::Table => "table",
            Self::TableRow => "table_row",
            Self::TableCell => "table_cell",
            Self::Picture => "picture",
            Self::OutLink => "out_link",
            Self::InLink => "in_link",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeKind {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| TypeError::UnknownKind(s.to_string()))
    }
}
