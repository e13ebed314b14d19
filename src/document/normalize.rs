use indexmap::IndexMap;
use serde_json::Value;

use super::DocumentError;
use super::parse::{
    RawBacklink, RawDocument, RawNode, id_from, non_empty_string, number_from, string_only,
    text_from, truthy,
};
use crate::graph::{
    Backlink, DEFAULT_BACKLINK_BEND, DEFAULT_BACKLINK_COLOR, DEFAULT_BACKLINK_PAD,
    DEFAULT_NODE_STROKE, Graph, LinkStyle, Node, NodeKind, NodeShape,
};

pub(super) fn build_graph(document: RawDocument) -> Result<Graph, DocumentError> {
    let mut nodes = IndexMap::with_capacity(document.nodes.len());
    for (id, raw) in document.nodes {
        let node = node_from(&id, &raw);
        nodes.insert(id, node);
    }

    let backlinks = document
        .backlinks
        .iter()
        .enumerate()
        .filter_map(|(index, raw)| backlink_from(index, raw.as_ref()?))
        .collect();

    let graph = Graph::new(
        document.root_id.as_deref().unwrap_or_default(),
        document.hub_id.as_deref(),
        document.selected_id.as_deref(),
        nodes,
        backlinks,
    )?;
    Ok(graph)
}

fn node_from(id: &str, raw: &RawNode) -> Node {
    let mut node = Node::new(id);
    if let Some(label) = text_from(&raw.label) {
        node.label = label;
    }
    node.content = text_from(&raw.content).unwrap_or_default();
    node.kind = raw
        .kind
        .as_str()
        .and_then(NodeKind::parse)
        .unwrap_or_default();
    node.children = match &raw.children {
        Value::Array(children) => children.iter().filter_map(id_from).collect(),
        _ => Vec::new(),
    };
    node.collapsed = truthy(&raw.collapsed);
    node.shape = raw
        .shape
        .as_str()
        .and_then(NodeShape::parse)
        .unwrap_or_default();
    node.w = number_from(&raw.w);
    node.h = number_from(&raw.h);
    node.fill = non_empty_string(&raw.fill);
    node.stroke = non_empty_string(&raw.stroke).unwrap_or_else(|| DEFAULT_NODE_STROKE.to_owned());
    node
}

/// `from`/`to` fall back to `source`/`target` only when absent; unnamed links
/// get `bl-<position>`.
fn backlink_from(index: usize, raw: &RawBacklink) -> Option<Backlink> {
    let from = id_from(if raw.from.is_null() {
        &raw.source
    } else {
        &raw.from
    })?;
    let to = id_from(if raw.to.is_null() { &raw.target } else { &raw.to })?;

    let id = id_from(&raw.id).unwrap_or_else(|| format!("bl-{index}"));
    Some(Backlink {
        id,
        from,
        to,
        style: raw
            .style
            .as_str()
            .and_then(LinkStyle::parse)
            .unwrap_or_default(),
        color: non_empty_string(&raw.color).unwrap_or_else(|| DEFAULT_BACKLINK_COLOR.to_owned()),
        bend: number_from(&raw.bend).unwrap_or(DEFAULT_BACKLINK_BEND),
        pad: number_from(&raw.pad).unwrap_or(DEFAULT_BACKLINK_PAD),
        title: string_only(&raw.title).unwrap_or_default(),
        note: string_only(&raw.note).unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::document::parse::parse_document;
    use crate::graph::StructureError;

    fn graph_from(value: Value) -> Result<Graph, DocumentError> {
        build_graph(parse_document(value)?)
    }

    fn base_nodes() -> Value {
        json!([
            {"id": "r", "type": "root", "children": ["h"]},
            {"id": "h", "type": "hub", "children": ["a", "b"]},
            {"id": "a"},
            {"id": "b"}
        ])
    }

    #[test]
    fn node_defaults_fill_missing_fields() {
        let graph = graph_from(json!({
            "rootId": "r",
            "nodes": [
                {"id": "r", "children": ["x", "ghost"], "collapsed": 1},
                {"id": "x", "label": 42, "type": "weird", "shape": "hexagon", "w": "wide", "h": 10, "fill": "", "stroke": ""}
            ]
        }))
        .unwrap();

        let root = graph.root().unwrap();
        assert_eq!(root.label, "node");
        assert_eq!(root.content, "");
        assert_eq!(root.children, vec!["x".to_owned()]);
        assert!(root.collapsed);

        let x = graph.node("x").unwrap();
        assert_eq!(x.label, "42");
        assert_eq!(x.kind, NodeKind::Child);
        assert_eq!(x.shape, NodeShape::Circle);
        assert_eq!(x.w, None);
        assert_eq!(x.h, Some(10.0));
        assert_eq!(x.fill, None);
        assert_eq!(x.stroke, DEFAULT_NODE_STROKE);
        assert_eq!(x.parent_id.as_deref(), Some("r"));
    }

    #[test]
    fn backlinks_get_defaults_and_positional_ids() {
        let graph = graph_from(json!({
            "rootId": "r",
            "nodes": base_nodes(),
            "backlinks": [
                {"from": "a", "to": "b"},
                {"source": "b", "target": "a", "id": "named", "style": "dotted",
                 "color": "red", "bend": -20, "pad": 4, "title": "t", "note": "n"},
                {"from": "a", "to": "b", "bend": "big", "pad": null, "title": 5, "style": "wavy"}
            ]
        }))
        .unwrap();

        let first = &graph.backlinks[0];
        assert_eq!(first.id, "bl-0");
        assert_eq!(first.style, LinkStyle::Dashed);
        assert_eq!(first.color, DEFAULT_BACKLINK_COLOR);
        assert_eq!(first.bend, 40.0);
        assert_eq!(first.pad, 10.0);

        let second = &graph.backlinks[1];
        assert_eq!(second.id, "named");
        assert_eq!((second.from.as_str(), second.to.as_str()), ("b", "a"));
        assert_eq!(second.style, LinkStyle::Dotted);
        assert_eq!(second.color, "red");
        assert_eq!(second.bend, -20.0);
        assert_eq!(second.pad, 4.0);
        assert_eq!((second.title.as_str(), second.note.as_str()), ("t", "n"));

        let third = &graph.backlinks[2];
        assert_eq!(third.id, "bl-2");
        assert_eq!(third.bend, 40.0);
        assert_eq!(third.pad, 10.0);
        assert_eq!(third.title, "");
        assert_eq!(third.style, LinkStyle::Dashed);
    }

    #[test]
    fn malformed_backlinks_are_dropped() {
        let graph = graph_from(json!({
            "rootId": "r",
            "nodes": base_nodes(),
            "edges": [
                {"from": "a"},
                {"to": "b"},
                {"from": "a", "to": "a"},
                {"from": "a", "to": "missing"},
                {"from": "", "source": "a", "to": "b"},
                "junk",
                {},
                {"title": "orphan", "note": "no endpoints"},
                {"from": "a", "to": "h"}
            ]
        }))
        .unwrap();

        let ids = graph
            .backlinks
            .iter()
            .map(|link| link.id.as_str())
            .collect::<Vec<_>>();
        assert_eq!(ids, vec!["bl-8"]);
    }

    #[test]
    fn hub_and_selection_fall_back_when_unknown() {
        let graph = graph_from(json!({
            "rootId": "r",
            "hubId": "nope",
            "selectedId": "nope",
            "nodes": base_nodes()
        }))
        .unwrap();
        assert_eq!(graph.hub_id, None);
        assert_eq!(graph.selected_id.as_deref(), Some("r"));

        let graph = graph_from(json!({
            "rootId": "r",
            "hubId": "h",
            "selectedId": "b",
            "nodes": base_nodes()
        }))
        .unwrap();
        assert_eq!(graph.hub_id.as_deref(), Some("h"));
        assert_eq!(graph.selected_id.as_deref(), Some("b"));
    }

    #[test]
    fn root_must_be_present_and_known() {
        assert!(matches!(
            graph_from(json!({"nodes": base_nodes()})),
            Err(DocumentError::Structure(StructureError::MissingRoot))
        ));
        assert!(matches!(
            graph_from(json!({"rootId": "", "nodes": base_nodes()})),
            Err(DocumentError::Structure(StructureError::MissingRoot))
        ));
        assert!(matches!(
            graph_from(json!({"rootId": "zzz", "nodes": base_nodes()})),
            Err(DocumentError::Structure(StructureError::UnknownRoot(_)))
        ));
    }

    #[test]
    fn keyed_nodes_use_their_map_key() {
        let graph = graph_from(json!({
            "rootId": 1,
            "nodes": {
                "1": {"id": 1, "children": [2]},
                "2": {"id": "two", "label": "Second"}
            }
        }))
        .unwrap();

        assert_eq!(graph.root_id, "1");
        let second = graph.node("2").unwrap();
        assert_eq!(second.id, "2");
        assert_eq!(second.label, "Second");
        assert_eq!(second.parent_id.as_deref(), Some("1"));
    }

    #[test]
    fn cyclic_children_are_repaired() {
        let graph = graph_from(json!({
            "rootId": "r",
            "nodes": [
                {"id": "r", "children": ["a"]},
                {"id": "a", "children": ["b"]},
                {"id": "b", "children": ["a", "r"]}
            ]
        }))
        .unwrap();

        assert!(graph.node("b").unwrap().children.is_empty());
        assert_eq!(graph.visible_ids(), vec!["r", "a", "b"]);
    }
}
