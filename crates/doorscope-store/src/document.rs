//! JSON document format.
//!
//! A document file describes one snapshot as a nested tree:
//!
//! ```json
//! { "name": "Spec v2",
//!   "attributes": { "Last Modified By": "ann" },
//!   "children": [
//!     { "kind": "title", "id": 1,
//!       "attributes": { "Object Text": "Introduction" },
//!       "body": { "kind": "section", "attributes": { "Object Text": "..." } },
//!       "children": [] } ] }
//! ```
//!
//! Attribute values map as follows: strings, integers, floats and `null`
//! directly; booleans to `"true"` / `"false"`; `{"date": "<rfc3339>"}` to a
//! date; `{"rich": [fragments]}` to encoded rich text; `{"image": [bytes]}` to
//! image data. Attribute names are interned into the caller's schema.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use doorscope_types::{Fragment, NodeId, NodeKind, RichText, Schema, SnapshotId, StableId, Value};

use crate::error::{StoreError, StoreResult};
use crate::snapshot::{Snapshot, SnapshotBuilder};

/// Top level of a document file.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct DocumentSpec {
    pub name: String,
    /// Fixed snapshot id; generated when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    #[serde(default)]
    pub attributes: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    pub children: Vec<NodeSpec>,
}

/// One object of a document file.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NodeSpec {
    pub kind: NodeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<StableId>,
    #[serde(default)]
    pub attributes: BTreeMap<String, serde_json::Value>,
    /// Body half of a split title; receives the title's id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Box<NodeSpec>>,
    #[serde(default)]
    pub children: Vec<NodeSpec>,
}

/// Parse a document from JSON text.
pub fn load_document(json: &str, schema: &mut Schema) -> StoreResult<Snapshot> {
    let spec: DocumentSpec = serde_json::from_str(json)?;
    build_document(&spec, schema)
}

/// Read and parse a document file.
pub fn load_document_file(path: &Path, schema: &mut Schema) -> StoreResult<Snapshot> {
    let json = std::fs::read_to_string(path)?;
    let snapshot = load_document(&json, schema)?;
    debug!(path = %path.display(), nodes = snapshot.len(), "document loaded");
    Ok(snapshot)
}

/// Build a snapshot from an already parsed document.
pub fn build_document(spec: &DocumentSpec, schema: &mut Schema) -> StoreResult<Snapshot> {
    let mut builder = SnapshotBuilder::new(spec.name.clone());
    if let Some(id) = spec.id {
        builder = builder.with_id(SnapshotId::from_uuid(id));
    }
    let root = builder.root();
    set_attributes(&mut builder, schema, root, &spec.attributes)?;
    for child in &spec.children {
        add_node(&mut builder, schema, root, child)?;
    }
    builder.build()
}

fn add_node(
    builder: &mut SnapshotBuilder,
    schema: &mut Schema,
    parent: NodeId,
    spec: &NodeSpec,
) -> StoreResult<NodeId> {
    let node = builder.add(parent, spec.kind)?;
    set_attributes(builder, schema, node, &spec.attributes)?;
    if let Some(id) = &spec.id {
        builder.set(node, schema.identifier(), id.to_value())?;
    }

    if let Some(body_spec) = &spec.body {
        let body = builder.split(node, body_spec.kind)?;
        set_attributes(builder, schema, body, &body_spec.attributes)?;
        let body_id = spec.id.as_ref().or(body_spec.id.as_ref());
        if let Some(id) = body_id {
            builder.set(body, schema.identifier(), id.to_value())?;
        }
        if body_spec.body.is_some() {
            return Err(StoreError::MalformedSnapshot(
                "a split body cannot itself be split".into(),
            ));
        }
        for child in &body_spec.children {
            add_node(builder, schema, body, child)?;
        }
    }

    for child in &spec.children {
        add_node(builder, schema, node, child)?;
    }
    Ok(node)
}

fn set_attributes(
    builder: &mut SnapshotBuilder,
    schema: &mut Schema,
    node: NodeId,
    attributes: &BTreeMap<String, serde_json::Value>,
) -> StoreResult<()> {
    for (name, raw) in attributes {
        let attr = schema.intern(name);
        let value = convert_value(name, raw)?;
        builder.set(node, attr, value)?;
    }
    Ok(())
}

/// Convert a JSON attribute value into a typed [`Value`].
pub fn convert_value(name: &str, raw: &serde_json::Value) -> StoreResult<Value> {
    use serde_json::Value as Json;

    let malformed = |what: String| StoreError::MalformedSnapshot(format!("attribute {name:?}: {what}"));

    match raw {
        Json::Null => Ok(Value::Null),
        Json::Bool(b) => Ok(Value::String(b.to_string())),
        Json::String(s) => Ok(Value::String(s.clone())),
        Json::Number(n) => match n.as_i64() {
            Some(i) => Ok(Value::Integer(i)),
            None => n
                .as_f64()
                .map(Value::Real)
                .ok_or_else(|| malformed(format!("unrepresentable number {n}"))),
        },
        Json::Object(map) if map.len() == 1 => {
            let (tag, inner) = map.iter().next().ok_or_else(|| malformed("empty object".into()))?;
            match tag.as_str() {
                "date" => {
                    let text = inner
                        .as_str()
                        .ok_or_else(|| malformed("date must be a string".into()))?;
                    let date = DateTime::parse_from_rfc3339(text)
                        .map_err(|e| malformed(format!("invalid date {text:?}: {e}")))?;
                    Ok(Value::Date(date.with_timezone(&Utc)))
                }
                "rich" => {
                    let fragments: Vec<Fragment> = serde_json::from_value(inner.clone())?;
                    Ok(Value::rich(&RichText::new(fragments))?)
                }
                "image" => {
                    let bytes: Vec<u8> = serde_json::from_value(inner.clone())?;
                    Ok(Value::Image(bytes))
                }
                other => Err(malformed(format!("unknown value tag {other:?}"))),
            }
        }
        Json::Object(_) => Err(malformed("tagged values have exactly one key".into())),
        Json::Array(_) => Err(malformed("arrays are not attribute values".into())),
    }
}
