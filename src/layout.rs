use std::collections::HashMap;

use eframe::egui::vec2;

use crate::graph::Graph;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutConfig {
    /// Horizontal step per depth level.
    pub dx: f32,
    /// Row height; one unit of leaf weight.
    pub dy: f32,
    pub margin_left: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            dx: 160.0,
            dy: 70.0,
            margin_left: 60.0,
        }
    }
}

/// Vertical interval reserved for one child subtree.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Span {
    pub top: f32,
    pub bottom: f32,
}

impl Span {
    pub fn center(self) -> f32 {
        (self.top + self.bottom) / 2.0
    }

    #[cfg(test)]
    pub fn height(self) -> f32 {
        self.bottom - self.top
    }
}

/// Positions every visible node: root at the left margin, hub one step to the
/// right, and each deeper level stacked in weighted spans around its parent.
pub fn layout(graph: &mut Graph, viewport_height: f32, config: &LayoutConfig) {
    let visible = graph.walk_visible();
    for (id, depth) in &visible {
        if let Some(node) = graph.nodes.get_mut(id) {
            node.depth = *depth;
        }
    }

    let center_y = viewport_height / 2.0;
    let root_id = graph.root_id.clone();
    let Some(root) = graph.nodes.get_mut(&root_id) else {
        return;
    };
    root.pos = vec2(config.margin_left, center_y);
    let root_x = root.pos.x;

    let Some(hub_id) = graph.hub_id.clone() else {
        return;
    };
    if !visible.iter().any(|(id, _)| *id == hub_id) {
        return;
    }
    if let Some(hub) = graph.nodes.get_mut(&hub_id) {
        hub.pos = vec2(root_x + config.dx, center_y);
    }

    let weights = leaf_weights(graph);
    place_subtree(graph, &hub_id, &weights, config);
}

/// Number of visible leaves below each visible node; collapsed nodes count as one.
pub fn leaf_weights(graph: &Graph) -> HashMap<String, usize> {
    let visible = graph.walk_visible();
    let mut weights = HashMap::with_capacity(visible.len());

    for (id, _) in visible.iter().rev() {
        let Some(node) = graph.node(id) else {
            continue;
        };
        let sum = graph
            .visible_children(node)
            .map(|child| weights.get(&child.id).copied().unwrap_or(1))
            .sum::<usize>();
        weights.insert(id.clone(), sum.max(1));
    }

    weights
}

/// Stacks spans of `(weight - 1) * dy` with `dy` between neighbours, centered on `center_y`.
pub fn allocate_spans(center_y: f32, weights: &[usize], dy: f32) -> Vec<Span> {
    let total_leaves = weights.iter().sum::<usize>();
    let total_height = (total_leaves.saturating_sub(1) as f32 * dy).max(0.0);
    let mut cursor = center_y - total_height / 2.0;

    weights
        .iter()
        .map(|weight| {
            let height = weight.saturating_sub(1) as f32 * dy;
            let span = Span {
                top: cursor,
                bottom: cursor + height,
            };
            cursor += height + dy;
            span
        })
        .collect()
}

fn place_subtree(
    graph: &mut Graph,
    parent_id: &str,
    weights: &HashMap<String, usize>,
    config: &LayoutConfig,
) {
    let mut pending = vec![parent_id.to_owned()];

    while let Some(id) = pending.pop() {
        let Some(parent) = graph.node(&id) else {
            continue;
        };
        let origin = parent.pos;
        let children = graph
            .visible_children(parent)
            .map(|child| child.id.clone())
            .collect::<Vec<_>>();
        if children.is_empty() {
            continue;
        }

        let child_weights = children
            .iter()
            .map(|child| weights.get(child).copied().unwrap_or(1))
            .collect::<Vec<_>>();
        let spans = allocate_spans(origin.y, &child_weights, config.dy);

        for (child_id, span) in children.iter().zip(spans) {
            if let Some(child) = graph.nodes.get_mut(child_id) {
                child.pos = vec2(origin.x + config.dx, span.center());
            }
        }
        pending.extend(children);
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::Vec2;

    use super::*;
    use crate::graph::NodeKind;
    use crate::graph::tests::{build, node, sample_graph};

    fn pos(graph: &Graph, id: &str) -> Vec2 {
        graph.node(id).unwrap().pos
    }

    #[test]
    fn hub_children_split_evenly_around_hub() {
        let mut graph = build(
            vec![
                node("r", NodeKind::Root, &["h"]),
                node("h", NodeKind::Hub, &["a", "b"]),
                node("a", NodeKind::Child, &[]),
                node("b", NodeKind::Child, &[]),
            ],
            Some("h"),
            Vec::new(),
        );
        layout(&mut graph, 600.0, &LayoutConfig::default());

        assert_eq!(pos(&graph, "r"), vec2(60.0, 300.0));
        assert_eq!(pos(&graph, "h"), vec2(220.0, 300.0));
        assert_eq!(pos(&graph, "a"), vec2(380.0, 265.0));
        assert_eq!(pos(&graph, "b"), vec2(380.0, 335.0));
        assert_eq!(graph.node("a").unwrap().depth, 2);
    }

    #[test]
    fn leaf_weight_counts_visible_leaves() {
        let mut graph = sample_graph();
        let weights = leaf_weights(&graph);
        assert_eq!(weights["a"], 2);
        assert_eq!(weights["h"], 3);
        assert_eq!(weights["r"], 3);
        assert_eq!(weights["b"], 1);

        graph.toggle_collapse("a");
        let weights = leaf_weights(&graph);
        assert_eq!(weights["a"], 1);
        assert_eq!(weights["h"], 2);
        assert!(!weights.contains_key("a1"));
    }

    #[test]
    fn spans_are_proportional_and_disjoint() {
        let dy = 70.0;
        let weights = [3usize, 1, 5, 2];
        let spans = allocate_spans(100.0, &weights, dy);

        let total = weights.iter().sum::<usize>();
        let extent = spans.last().unwrap().bottom - spans[0].top;
        assert!((extent - (total - 1) as f32 * dy).abs() < 1e-3);
        assert!(((spans[0].top + spans.last().unwrap().bottom) / 2.0 - 100.0).abs() < 1e-3);

        for (span, weight) in spans.iter().zip(weights) {
            assert!((span.height() - (weight - 1) as f32 * dy).abs() < 1e-3);
        }
        for pair in spans.windows(2) {
            assert!(pair[1].top - pair[0].bottom >= dy - 1e-3);
        }
    }

    #[test]
    fn deeper_levels_reuse_weighted_spans() {
        let mut graph = sample_graph();
        layout(&mut graph, 400.0, &LayoutConfig::default());

        let a = pos(&graph, "a");
        let b = pos(&graph, "b");
        assert_eq!(a.y, 200.0 - 35.0);
        assert_eq!(b.y, 200.0 + 70.0);
        assert_eq!(pos(&graph, "a1"), vec2(540.0, a.y - 35.0));
        assert_eq!(pos(&graph, "a2"), vec2(540.0, a.y + 35.0));
        assert_eq!(graph.node("a2").unwrap().depth, 3);
    }

    #[test]
    fn collapsing_frees_space_and_keeps_stale_positions() {
        let mut graph = sample_graph();
        let config = LayoutConfig::default();
        layout(&mut graph, 400.0, &config);
        let stale = pos(&graph, "a1");

        graph.toggle_collapse("a");
        layout(&mut graph, 400.0, &config);
        assert_eq!(pos(&graph, "a").y, 165.0);
        assert_eq!(pos(&graph, "b").y, 235.0);
        assert_eq!(pos(&graph, "a1"), stale);

        graph.toggle_collapse("h");
        layout(&mut graph, 400.0, &config);
        assert_eq!(graph.visible_ids(), vec!["r", "h"]);
    }

    #[test]
    fn without_hub_only_root_is_placed() {
        let mut graph = build(
            vec![node("r", NodeKind::Root, &["a"]), node("a", NodeKind::Child, &[])],
            None,
            Vec::new(),
        );
        layout(&mut graph, 300.0, &LayoutConfig::default());

        assert_eq!(pos(&graph, "r"), vec2(60.0, 150.0));
        assert_eq!(pos(&graph, "a"), Vec2::ZERO);
        assert_eq!(graph.node("a").unwrap().depth, 1);
    }

    #[test]
    fn siblings_never_overlap_in_a_wide_tree() {
        let mut nodes = vec![
            node("r", NodeKind::Root, &["h"]),
            node("h", NodeKind::Hub, &["p0", "p1", "p2"]),
        ];
        for parent in 0..3 {
            let kids = (0..=parent + 1)
                .map(|leaf| format!("p{parent}c{leaf}"))
                .collect::<Vec<_>>();
            let kid_refs = kids.iter().map(String::as_str).collect::<Vec<_>>();
            nodes.push(node(&format!("p{parent}"), NodeKind::Child, &kid_refs));
            for kid in &kids {
                nodes.push(node(kid, NodeKind::Child, &[]));
            }
        }
        let mut graph = build(nodes, Some("h"), Vec::new());
        layout(&mut graph, 800.0, &LayoutConfig::default());

        let mut leaf_ys = graph
            .visible_ids()
            .iter()
            .filter(|id| id.contains('c'))
            .map(|id| pos(&graph, id).y)
            .collect::<Vec<_>>();
        leaf_ys.sort_by(f32::total_cmp);
        for pair in leaf_ys.windows(2) {
            assert!(pair[1] - pair[0] >= 70.0 - 1e-3);
        }
        assert_eq!(leaf_ys.len(), 9);
    }
}
