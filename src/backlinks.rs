use std::collections::HashSet;

use eframe::egui::{Rect, Vec2, vec2};

use crate::graph::{Backlink, Graph, LinkStyle, Node};
use crate::util::{distance_to_segment, offset_point};

pub const ARROW_HEAD_LENGTH: f32 = 6.0;
/// Width of the invisible stroke used for hover detection.
pub const HIT_WIDTH: f32 = 14.0;
const CURVE_SAMPLES: usize = 24;
const LABEL_HEIGHT: f32 = 18.0;

#[derive(Clone, Debug, PartialEq)]
pub struct LabelBubble {
    pub text: String,
    pub center: Vec2,
    pub size: Vec2,
}

impl LabelBubble {
    fn for_title(title: &str, center: Vec2) -> Option<Self> {
        let text = title.trim();
        if text.is_empty() {
            return None;
        }

        let width = (7.5 * text.chars().count() as f32 + 12.0).max(30.0);
        Some(Self {
            text: text.to_owned(),
            center,
            size: vec2(width, LABEL_HEIGHT),
        })
    }

    pub fn rect(&self) -> Rect {
        Rect::from_center_size(self.center.to_pos2(), self.size)
    }
}

/// Quadratic curve geometry for one backlink, in world coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct BacklinkRoute {
    pub id: String,
    pub start: Vec2,
    pub control: Vec2,
    pub end: Vec2,
    pub style: LinkStyle,
    pub color: String,
    pub title: String,
    pub note: String,
    pub label: Option<LabelBubble>,
}

impl BacklinkRoute {
    pub fn point_at(&self, t: f32) -> Vec2 {
        let inverse = 1.0 - t;
        self.start * (inverse * inverse) + self.control * (2.0 * inverse * t) + self.end * (t * t)
    }

    pub fn sample(&self, segments: usize) -> Vec<Vec2> {
        let segments = segments.max(1);
        (0..=segments)
            .map(|step| self.point_at(step as f32 / segments as f32))
            .collect()
    }

    pub fn distance_to(&self, point: Vec2) -> f32 {
        self.sample(CURVE_SAMPLES)
            .windows(2)
            .map(|pair| distance_to_segment(point, pair[0], pair[1]))
            .fold(f32::INFINITY, f32::min)
    }

    /// Hover region: the wide hit stroke plus the optional title bubble.
    pub fn hit(&self, point: Vec2) -> bool {
        self.distance_to(point) <= HIT_WIDTH / 2.0
            || self
                .label
                .as_ref()
                .is_some_and(|label| label.rect().contains(point.to_pos2()))
    }

    pub fn tooltip(&self) -> Option<String> {
        tooltip_text(&self.title, &self.note)
    }
}

pub fn tooltip_text(title: &str, note: &str) -> Option<String> {
    let parts = [title.trim(), note.trim()]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" — "))
    }
}

/// Curve from `source` to `target` that clears both shapes and the arrowhead,
/// bowed sideways by `link.bend`.
pub fn route(link: &Backlink, source: &Node, target: &Node) -> BacklinkRoute {
    let start = offset_point(source.pos, target.pos, source.radius() + link.pad);
    let end = offset_point(
        target.pos,
        source.pos,
        target.radius() + link.pad + ARROW_HEAD_LENGTH,
    );

    let middle = (start + end) * 0.5;
    let direction = end - start;
    let length = direction.length();
    let length = if length > 0.0 { length } else { 1.0 };
    let normal = vec2(-direction.y, direction.x) / length;
    let control = middle + normal * link.bend;

    BacklinkRoute {
        id: link.id.clone(),
        start,
        control,
        end,
        style: link.style,
        color: link.color.clone(),
        title: link.title.clone(),
        note: link.note.clone(),
        label: LabelBubble::for_title(&link.title, control),
    }
}

/// Routes every backlink whose endpoints are both in `visible`.
pub fn route_visible(graph: &Graph, visible: &HashSet<&str>) -> Vec<BacklinkRoute> {
    graph
        .backlinks
        .iter()
        .filter(|link| visible.contains(link.from.as_str()) && visible.contains(link.to.as_str()))
        .filter_map(|link| {
            let source = graph.node(&link.from)?;
            let target = graph.node(&link.to)?;
            Some(route(link, source, target))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::NodeKind;
    use crate::graph::tests::{build, node};

    fn placed(id: &str, x: f32, y: f32) -> Node {
        let mut node = node(id, NodeKind::Child, &[]);
        node.pos = vec2(x, y);
        node
    }

    fn line_distance(point: Vec2, a: Vec2, b: Vec2) -> f32 {
        let direction = (b - a).normalized();
        let offset = point - a;
        offset.x * direction.y - offset.y * direction.x
    }

    #[test]
    fn endpoints_clear_node_shapes_and_arrowhead() {
        let source = placed("a", 0.0, 0.0);
        let target = placed("b", 200.0, 0.0);
        let mut link = Backlink::new("l", "a", "b");
        link.bend = 0.0;
        let route = route(&link, &source, &target);

        assert_eq!(route.start, vec2(7.5 + 10.0, 0.0));
        assert_eq!(route.end, vec2(200.0 - 7.5 - 10.0 - ARROW_HEAD_LENGTH, 0.0));
        assert_eq!(route.control, (route.start + route.end) * 0.5);
    }

    #[test]
    fn control_point_bows_perpendicular_by_bend() {
        let source = placed("a", 10.0, 20.0);
        let target = placed("b", 130.0, 180.0);
        let link = Backlink::new("l", "a", "b");
        let route = route(&link, &source, &target);

        let distance = line_distance(route.control, source.pos, target.pos);
        assert!((distance.abs() - 40.0).abs() < 1e-3);

        // normal (-dy, dx) of a->b points to the side where the cross product is negative
        assert!(distance < 0.0);

        let reversed = super::route(&Backlink::new("r", "b", "a"), &target, &source);
        let reversed_distance = line_distance(reversed.control, source.pos, target.pos);
        assert!((reversed_distance - 40.0).abs() < 1e-3);
    }

    #[test]
    fn hit_region_is_wider_than_curve() {
        let source = placed("a", 0.0, 0.0);
        let target = placed("b", 200.0, 0.0);
        let mut link = Backlink::new("l", "a", "b");
        link.bend = 0.0;
        let route = route(&link, &source, &target);

        assert!(route.hit(vec2(100.0, 6.0)));
        assert!(!route.hit(vec2(100.0, 9.0)));
        assert!(!route.hit(vec2(0.0, 0.0)));
    }

    #[test]
    fn title_bubble_extends_hover_region() {
        let source = placed("a", 0.0, 0.0);
        let target = placed("b", 200.0, 0.0);
        let mut link = Backlink::new("l", "a", "b");
        link.title = "  cites  ".to_owned();
        let route = route(&link, &source, &target);

        let label = route.label.as_ref().unwrap();
        assert_eq!(label.text, "cites");
        assert_eq!(label.size, vec2(7.5 * 5.0 + 12.0, 18.0));
        assert_eq!(label.center, route.control);
        assert!(route.hit(route.control + vec2(22.0, 8.0)));

        link.title = "ab".to_owned();
        assert_eq!(super::route(&link, &source, &target).label.unwrap().size.x, 30.0);
    }

    #[test]
    fn tooltip_joins_present_parts() {
        assert_eq!(tooltip_text("Title", "Note").as_deref(), Some("Title — Note"));
        assert_eq!(tooltip_text(" ", "Note").as_deref(), Some("Note"));
        assert_eq!(tooltip_text("Title", "").as_deref(), Some("Title"));
        assert_eq!(tooltip_text("", "  "), None);
    }

    #[test]
    fn only_fully_visible_links_are_routed() {
        let mut graph = build(
            vec![
                node("r", NodeKind::Root, &["a", "b"]),
                node("a", NodeKind::Child, &["c"]),
                node("b", NodeKind::Child, &[]),
                node("c", NodeKind::Child, &[]),
            ],
            None,
            vec![Backlink::new("ab", "a", "b"), Backlink::new("cb", "c", "b")],
        );
        graph.toggle_collapse("a");

        let visible_ids = graph.visible_ids();
        let visible = visible_ids.iter().map(String::as_str).collect::<HashSet<_>>();
        let routes = route_visible(&graph, &visible);
        assert_eq!(routes.len(), 1);
        assert_eq!(routes[0].id, "ab");
    }
}
