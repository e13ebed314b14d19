use log::debug;
use serde::Deserialize;
use serde_json::Value;

use super::DocumentError;

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawEnvelope {
    root_id: Value,
    hub_id: Value,
    selected_id: Value,
    nodes: Value,
    backlinks: Option<Value>,
    back_links: Option<Value>,
    relations: Option<Value>,
    edges: Option<Value>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct RawNode {
    pub(super) id: Value,
    pub(super) label: Value,
    pub(super) content: Value,
    #[serde(rename = "type")]
    pub(super) kind: Value,
    pub(super) children: Value,
    pub(super) collapsed: Value,
    pub(super) shape: Value,
    pub(super) w: Value,
    pub(super) h: Value,
    pub(super) fill: Value,
    pub(super) stroke: Value,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct RawBacklink {
    pub(super) id: Value,
    pub(super) from: Value,
    pub(super) source: Value,
    pub(super) to: Value,
    pub(super) target: Value,
    pub(super) style: Value,
    pub(super) color: Value,
    pub(super) bend: Value,
    pub(super) pad: Value,
    pub(super) title: Value,
    pub(super) note: Value,
}

/// Input document with every field still loosely typed; defaults are applied later.
#[derive(Debug, Default)]
pub(super) struct RawDocument {
    pub(super) root_id: Option<String>,
    pub(super) hub_id: Option<String>,
    pub(super) selected_id: Option<String>,
    /// `(key, record)` in document order.
    pub(super) nodes: Vec<(String, RawNode)>,
    /// `None` marks an entry that was not an object; it still takes up a position.
    pub(super) backlinks: Vec<Option<RawBacklink>>,
}

pub(super) fn parse_document(value: Value) -> Result<RawDocument, DocumentError> {
    if !value.is_object() {
        return Err(DocumentError::NotAnObject);
    }
    let envelope = RawEnvelope::deserialize(&value).map_err(|_| DocumentError::NotAnObject)?;

    let backlinks = [
        envelope.backlinks,
        envelope.back_links,
        envelope.relations,
        envelope.edges,
    ]
    .into_iter()
    .flatten()
    .next()
    .map(parse_backlinks)
    .unwrap_or_default();

    Ok(RawDocument {
        root_id: id_from(&envelope.root_id),
        hub_id: id_from(&envelope.hub_id),
        selected_id: id_from(&envelope.selected_id),
        nodes: parse_nodes(&envelope.nodes),
        backlinks,
    })
}

/// Nodes come either as a list of records or as a map keyed by id; records
/// without an id are skipped in both forms.
fn parse_nodes(value: &Value) -> Vec<(String, RawNode)> {
    match value {
        Value::Array(entries) => entries
            .iter()
            .filter_map(|entry| RawNode::deserialize(entry).ok())
            .filter_map(|node| id_from(&node.id).map(|id| (id, node)))
            .collect(),
        Value::Object(entries) => entries
            .iter()
            .filter_map(|(key, entry)| {
                let node = RawNode::deserialize(entry).ok()?;
                id_from(&node.id)?;
                Some((key.clone(), node))
            })
            .collect(),
        Value::Null => Vec::new(),
        other => {
            debug!("ignoring nodes of unexpected type: {other}");
            Vec::new()
        }
    }
}

fn parse_backlinks(value: Value) -> Vec<Option<RawBacklink>> {
    match value {
        Value::Array(entries) => entries
            .iter()
            .map(|entry| RawBacklink::deserialize(entry).ok())
            .collect(),
        _ => Vec::new(),
    }
}

/// Ids may be written as strings or numbers; empty strings count as absent.
pub(super) fn id_from(value: &Value) -> Option<String> {
    match value {
        Value::String(text) if !text.is_empty() => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

pub(super) fn text_from(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

pub(super) fn string_only(value: &Value) -> Option<String> {
    value.as_str().map(str::to_owned)
}

pub(super) fn non_empty_string(value: &Value) -> Option<String> {
    value
        .as_str()
        .filter(|text| !text.is_empty())
        .map(str::to_owned)
}

pub(super) fn number_from(value: &Value) -> Option<f32> {
    value.as_f64().map(|number| number as f32)
}

pub(super) fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|number| number != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
