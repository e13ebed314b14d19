use std::collections::HashSet;

use eframe::egui::{Rect, Vec2, vec2};

use crate::backlinks::{BacklinkRoute, HIT_WIDTH, route_visible};
use crate::graph::{Graph, Node, NodeKind, NodeShape};
use crate::util::distance_to_segment;

/// Bottom-left corner of a node's label, relative to the node center.
pub const LABEL_OFFSET: Vec2 = vec2(14.0, -12.0);
const LABEL_CHAR_WIDTH: f32 = 7.5;
const LABEL_HEIGHT: f32 = 16.0;

#[derive(Clone, Debug, PartialEq)]
pub struct SceneNode {
    pub id: String,
    pub label: String,
    pub kind: NodeKind,
    pub shape: NodeShape,
    pub pos: Vec2,
    pub radius: f32,
    pub size: Vec2,
    pub depth: usize,
    pub has_children: bool,
    pub collapsed: bool,
    pub selected: bool,
    pub fill: Option<String>,
    pub stroke: String,
}

impl SceneNode {
    fn from_node(node: &Node, selected: bool) -> Self {
        Self {
            id: node.id.clone(),
            label: node.label.clone(),
            kind: node.kind,
            shape: node.shape,
            pos: node.pos,
            radius: node.radius(),
            size: node.size(),
            depth: node.depth,
            has_children: node.has_children(),
            collapsed: node.collapsed,
            selected,
            fill: node.fill.clone(),
            stroke: node.stroke.clone(),
        }
    }

    /// Label prefixed with a disclosure marker for branches.
    pub fn display_label(&self) -> String {
        let marker = match (self.has_children, self.collapsed) {
            (false, _) => "",
            (true, true) => "▸ ",
            (true, false) => "▾ ",
        };
        format!("{marker}{}", self.label)
    }

    /// Estimated world-space box of the label drawn beside the shape.
    pub fn label_rect(&self) -> Rect {
        let width = LABEL_CHAR_WIDTH * self.display_label().chars().count() as f32;
        let corner = (self.pos + LABEL_OFFSET).to_pos2();
        Rect::from_min_max(corner - vec2(0.0, LABEL_HEIGHT), corner + vec2(width, 0.0))
    }

    /// Shape or label; both select the node.
    pub fn contains(&self, point: Vec2) -> bool {
        let in_shape = match self.shape {
            NodeShape::Circle => (point - self.pos).length() <= self.radius,
            NodeShape::Rect | NodeShape::Triangle => {
                Rect::from_center_size(self.pos.to_pos2(), self.size).contains(point.to_pos2())
            }
        };
        in_shape || self.label_rect().contains(point.to_pos2())
    }
}

/// Parent-to-child line, carrying what its hover tooltip and tint need.
#[derive(Clone, Debug, PartialEq)]
pub struct TreeEdge {
    pub parent: String,
    pub child: String,
    pub child_label: String,
    pub child_kind: NodeKind,
    pub child_depth: usize,
    pub child_fill: Option<String>,
    pub from: Vec2,
    pub to: Vec2,
}

impl TreeEdge {
    pub fn hit(&self, point: Vec2) -> bool {
        distance_to_segment(point, self.from, self.to) <= HIT_WIDTH / 2.0
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Scene {
    /// Visible nodes in pre-order; later entries draw on top.
    pub nodes: Vec<SceneNode>,
    pub edges: Vec<TreeEdge>,
    pub backlinks: Vec<BacklinkRoute>,
}

impl Scene {
    /// Snapshot of the laid-out graph; call after the layout pass.
    pub fn build(graph: &Graph) -> Self {
        let visible_ids = graph.visible_ids();
        let visible = visible_ids
            .iter()
            .map(String::as_str)
            .collect::<HashSet<_>>();
        let selected = graph.selected_id.as_deref();

        let nodes = visible_ids
            .iter()
            .filter_map(|id| graph.node(id))
            .map(|node| SceneNode::from_node(node, selected == Some(node.id.as_str())))
            .collect::<Vec<_>>();

        let edges = visible_ids
            .iter()
            .filter_map(|id| graph.node(id))
            .filter_map(|child| {
                let parent_id = child.parent_id.as_deref()?;
                if !visible.contains(parent_id) {
                    return None;
                }
                let parent = graph.node(parent_id)?;
                Some(TreeEdge {
                    parent: parent.id.clone(),
                    child: child.id.clone(),
                    child_label: child.label.clone(),
                    child_kind: child.kind,
                    child_depth: child.depth,
                    child_fill: child.fill.clone(),
                    from: parent.pos,
                    to: child.pos,
                })
            })
            .collect();

        let backlinks = route_visible(graph, &visible);

        Self {
            nodes,
            edges,
            backlinks,
        }
    }

    #[cfg(test)]
    pub fn node(&self, id: &str) -> Option<&SceneNode> {
        self.nodes.iter().find(|node| node.id == id)
    }

    pub fn node_at(&self, point: Vec2) -> Option<&SceneNode> {
        self.nodes.iter().rev().find(|node| node.contains(point))
    }

    pub fn edge_at(&self, point: Vec2) -> Option<&TreeEdge> {
        self.edges.iter().rev().find(|edge| edge.hit(point))
    }

    pub fn backlink_at(&self, point: Vec2) -> Option<&BacklinkRoute> {
        self.backlinks.iter().rev().find(|route| route.hit(point))
    }

    pub fn bounds(&self, pad: f32) -> Option<Rect> {
        let mut nodes = self.nodes.iter();
        let first = nodes.next()?;
        let mut bounds = Rect::from_min_max(first.pos.to_pos2(), first.pos.to_pos2());
        for node in nodes {
            bounds.extend_with(node.pos.to_pos2());
        }
        Some(bounds.expand(pad))
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::vec2;

    use super::*;
    use crate::graph::Backlink;
    use crate::graph::tests::{build, node};
    use crate::layout::{LayoutConfig, layout};

    fn scenario() -> Graph {
        let mut graph = build(
            vec![
                node("r", NodeKind::Root, &["h"]),
                node("h", NodeKind::Hub, &["a", "b"]),
                node("a", NodeKind::Child, &[]),
                node("b", NodeKind::Child, &[]),
            ],
            Some("h"),
            vec![Backlink::new("ab", "a", "b")],
        );
        layout(&mut graph, 500.0, &LayoutConfig::default());
        graph
    }

    #[test]
    fn scene_lists_visible_geometry() {
        let graph = scenario();
        let scene = Scene::build(&graph);

        let ids = scene.nodes.iter().map(|node| node.id.as_str()).collect::<Vec<_>>();
        assert_eq!(ids, vec!["r", "h", "a", "b"]);
        assert_eq!(scene.edges.len(), 3);
        assert_eq!(scene.backlinks.len(), 1);
        assert!(scene.node("r").unwrap().selected);

        let hub = scene.node("h").unwrap();
        assert_eq!(hub.display_label(), "▾ H");
        assert_eq!(scene.node("a").unwrap().display_label(), "A");
    }

    #[test]
    fn collapsed_hub_drops_children_edges_and_backlinks() {
        let mut graph = scenario();
        graph.toggle_collapse("h");
        layout(&mut graph, 500.0, &LayoutConfig::default());
        let scene = Scene::build(&graph);

        assert_eq!(scene.nodes.len(), 2);
        assert_eq!(scene.edges.len(), 1);
        assert!(scene.backlinks.is_empty());
        assert_eq!(scene.node("h").unwrap().display_label(), "▸ H");
    }

    #[test]
    fn hit_tests_find_nodes_and_edges() {
        let graph = scenario();
        let scene = Scene::build(&graph);
        let a = scene.node("a").unwrap().pos;

        assert_eq!(scene.node_at(a + vec2(3.0, 3.0)).map(|node| node.id.as_str()), Some("a"));
        assert!(scene.node_at(a + vec2(30.0, 0.0)).is_none());

        let hub = scene.node("h").unwrap().pos;
        let middle = (hub + a) * 0.5;
        let edge = scene.edge_at(middle).unwrap();
        assert_eq!(edge.child, "a");
        assert_eq!(edge.child_label, "A");
    }

    #[test]
    fn rect_nodes_hit_their_box() {
        let mut graph = scenario();
        if let Some(node) = graph.nodes.get_mut("b") {
            node.shape = NodeShape::Rect;
            node.w = Some(40.0);
            node.h = Some(10.0);
        }
        let scene = Scene::build(&graph);
        let b = scene.node("b").unwrap().pos;

        assert!(scene.node("b").unwrap().contains(b + vec2(18.0, 4.0)));
        assert!(!scene.node("b").unwrap().contains(b + vec2(18.0, 6.0)));
    }

    #[test]
    fn labels_are_part_of_the_node() {
        let scene = Scene::build(&scenario());
        let hub = scene.node("h").unwrap();
        let label = hub.label_rect();

        assert_eq!(label.left(), hub.pos.x + 14.0);
        assert_eq!(label.bottom(), hub.pos.y - 12.0);
        assert!(hub.contains(hub.pos + LABEL_OFFSET + vec2(4.0, -6.0)));
        assert!(!hub.contains(hub.pos + LABEL_OFFSET + vec2(label.width() + 2.0, -6.0)));
        assert_eq!(
            scene
                .node_at(hub.pos + LABEL_OFFSET + vec2(2.0, -2.0))
                .map(|node| node.id.as_str()),
            Some("h")
        );
    }

    #[test]
    fn bounds_cover_visible_nodes() {
        let scene = Scene::build(&scenario());
        let bounds = scene.bounds(40.0).unwrap();

        assert_eq!(bounds.min.x, 60.0 - 40.0);
        assert_eq!(bounds.max.x, 380.0 + 40.0);
        assert_eq!(bounds.min.y, 215.0 - 40.0);
        assert_eq!(bounds.max.y, 285.0 + 40.0);
        assert!(Scene::default().bounds(10.0).is_none());
    }
}
