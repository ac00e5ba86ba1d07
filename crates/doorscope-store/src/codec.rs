//! Decoding of stored attribute values into plain text for diffing.

use doorscope_types::{RichText, Value};

/// Errors from [`RichTextCodec`] implementations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    /// The value type has no textual representation.
    #[error("cannot decode {0} value as text")]
    Unsupported(&'static str),

    /// A rich-text payload is corrupt.
    #[error("corrupt rich text: {0}")]
    Decode(String),
}

/// Turns a stored value (plain string or embedded rich-text blob) into the
/// plain text that is shown to reviewers and fed to the text differ.
pub trait RichTextCodec: Send + Sync {
    fn decode_to_plain_text(&self, value: &Value) -> Result<String, CodecError>;
}

/// Default codec for values produced by this workspace.
///
/// Rich text is the encoded [`RichText`] payload; scalars are formatted the
/// way they are displayed; images have no text.
#[derive(Clone, Copy, Debug, Default)]
pub struct PlainTextCodec;

impl RichTextCodec for PlainTextCodec {
    fn decode_to_plain_text(&self, value: &Value) -> Result<String, CodecError> {
        match value {
            Value::Null => Ok(String::new()),
            Value::String(s) => Ok(s.clone()),
            Value::Integer(_) | Value::Real(_) | Value::Date(_) => Ok(value.to_string()),
            Value::RichText(bytes) => RichText::decode(bytes)
                .map(|rich| rich.plain_text())
                .map_err(|e| CodecError::Decode(e.to_string())),
            Value::Image(_) => Err(CodecError::Unsupported(value.type_name())),
        }
    }
}
