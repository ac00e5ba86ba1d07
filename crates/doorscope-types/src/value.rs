use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// A typed attribute value.
///
/// Equality is deep and includes the variant: `Integer(1)` and `Real(1.0)`
/// are different values.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum Value {
    #[default]
    Null,
    String(String),
    Integer(i64),
    Real(f64),
    Date(DateTime<Utc>),
    /// Encoded [`RichText`] payload.
    RichText(Vec<u8>),
    /// Opaque image data.
    Image(Vec<u8>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::String(_) => "string",
            Self::Integer(_) => "integer",
            Self::Real(_) => "real",
            Self::Date(_) => "date",
            Self::RichText(_) => "rich_text",
            Self::Image(_) => "image",
        }
    }

    /// Returns `true` if both values are of the same variant.
    pub fn same_type(&self, other: &Self) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Date(d) => Some(*d),
            _ => None,
        }
    }

    /// Encode rich text into a `RichText` value.
    pub fn rich(text: &RichText) -> Result<Self, TypeError> {
        Ok(Self::RichText(text.encode()?))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Integer(n as i64)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Integer(n)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(d: DateTime<Utc>) -> Self {
        Self::Date(d)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::String(s) => f.write_str(s),
            Self::Integer(n) => write!(f, "{n}"),
            Self::Real(r) => write!(f, "{r}"),
            Self::Date(d) => write!(f, "{}", d.format("%Y-%m-%d %H:%M:%S")),
            Self::RichText(bytes) => write!(f, "(rich text, {} bytes)", bytes.len()),
            Self::Image(bytes) => write!(f, "(image, {} bytes)", bytes.len()),
        }
    }
}

/// One run of formatted text.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fragment {
    pub text: String,
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub italic: bool,
    #[serde(default)]
    pub underline: bool,
    #[serde(default)]
    pub superscript: bool,
    #[serde(default)]
    pub subscript: bool,
}

impl Fragment {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }
}

/// Formatted object text as stored in a `Value::RichText` payload.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RichText {
    pub fragments: Vec<Fragment>,
}

impl RichText {
    pub fn new(fragments: Vec<Fragment>) -> Self {
        Self { fragments }
    }

    /// Concatenated text of all fragments, formatting dropped.
    pub fn plain_text(&self) -> String {
        self.fragments.iter().map(|f| f.text.as_str()).collect()
    }

    pub fn encode(&self) -> Result<Vec<u8>, TypeError> {
        bincode::serialize(self).map_err(|e| TypeError::Serialization(e.to_string()))
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, TypeError> {
        bincode::deserialize(bytes).map_err(|e| TypeError::Serialization(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_includes_type() {
        assert_ne!(Value::Integer(1), Value::Real(1.0));
        assert_ne!(Value::String("1".into()), Value::Integer(1));
        assert_eq!(Value::from("a"), Value::String("a".into()));
    }

    #[test]
    fn same_type_ignores_payload() {
        assert!(Value::from("a").same_type(&Value::from("b")));
        assert!(!Value::Null.same_type(&Value::from("b")));
    }

    #[test]
    fn rich_text_payload_decodes() {
        let rich = RichText::new(vec![
            Fragment::plain("The system "),
            Fragment {
                text: "shall".into(),
                bold: true,
                ..Default::default()
            },
            Fragment::plain(" log."),
        ]);
        let value = Value::rich(&rich).unwrap();
        let Value::RichText(bytes) = &value else {
            panic!("expected rich text, got {value:?}");
        };
        let decoded = RichText::decode(bytes).unwrap();
        assert_eq!(decoded.plain_text(), "The system shall log.");
    }

    #[test]
    fn garbage_payload_is_an_error() {
        assert!(RichText::decode(&[1, 2, 3]).is_err());
    }

    #[test]
    fn display_formats_scalars() {
        assert_eq!(Value::Null.to_string(), "");
        assert_eq!(Value::Integer(12).to_string(), "12");
        assert_eq!(Value::Image(vec![0; 3]).to_string(), "(image, 3 bytes)");
    }
}
