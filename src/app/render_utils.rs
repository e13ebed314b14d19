use eframe::egui::{Color32, Painter, Pos2, Rect, Shape, Stroke, Vec2, pos2, vec2};

use crate::graph::{NodeKind, NodeShape};
use crate::scene::SceneNode;
use crate::viewport::Viewport;

pub(super) const LINE_COLOR: Color32 = Color32::from_rgb(74, 86, 112);
pub(super) const ROOT_COLOR: Color32 = Color32::from_rgb(255, 196, 92);
pub(super) const NODE_COLOR: Color32 = Color32::from_rgb(120, 170, 255);
pub(super) const SELECTED_COLOR: Color32 = Color32::from_rgb(245, 206, 93);

const LEVEL_COLORS: [Color32; 8] = [
    Color32::from_rgb(120, 170, 255),
    Color32::from_rgb(98, 208, 196),
    Color32::from_rgb(146, 214, 112),
    Color32::from_rgb(226, 204, 96),
    Color32::from_rgb(240, 152, 92),
    Color32::from_rgb(232, 112, 132),
    Color32::from_rgb(190, 124, 222),
    Color32::from_rgb(150, 150, 176),
];

pub(super) fn blend_color(base: Color32, overlay: Color32, amount: f32) -> Color32 {
    let amount = amount.clamp(0.0, 1.0);
    let inverse = 1.0 - amount;

    Color32::from_rgba_unmultiplied(
        ((base.r() as f32 * inverse) + (overlay.r() as f32 * amount)) as u8,
        ((base.g() as f32 * inverse) + (overlay.g() as f32 * amount)) as u8,
        ((base.b() as f32 * inverse) + (overlay.b() as f32 * amount)) as u8,
        ((base.a() as f32 * inverse) + (overlay.a() as f32 * amount)) as u8,
    )
}

/// Palette entry for a depth level; levels are 1-based and capped at 8.
pub(super) fn level_color(level: usize) -> Color32 {
    LEVEL_COLORS[level.clamp(1, LEVEL_COLORS.len()) - 1]
}

/// `#rgb`, `#rrggbb`, `#rrggbbaa` and a handful of named colors.
pub(super) fn parse_color(value: &str) -> Option<Color32> {
    let value = value.trim();
    if let Some(hex) = value.strip_prefix('#') {
        return parse_hex(hex);
    }

    let named = match value.to_ascii_lowercase().as_str() {
        "black" => Color32::BLACK,
        "white" => Color32::WHITE,
        "red" => Color32::from_rgb(255, 0, 0),
        "green" => Color32::from_rgb(0, 128, 0),
        "blue" => Color32::from_rgb(0, 0, 255),
        "yellow" => Color32::from_rgb(255, 255, 0),
        "orange" => Color32::from_rgb(255, 165, 0),
        "purple" => Color32::from_rgb(128, 0, 128),
        "gray" | "grey" => Color32::from_rgb(128, 128, 128),
        "transparent" => Color32::TRANSPARENT,
        _ => return None,
    };
    Some(named)
}

fn parse_hex(hex: &str) -> Option<Color32> {
    let digit = |index: usize| {
        hex.get(index..=index)
            .and_then(|text| u8::from_str_radix(text, 16).ok())
    };
    let byte = |index: usize| {
        hex.get(index..index + 2)
            .and_then(|text| u8::from_str_radix(text, 16).ok())
    };

    match hex.len() {
        3 => Some(Color32::from_rgb(
            digit(0)? * 17,
            digit(1)? * 17,
            digit(2)? * 17,
        )),
        6 => Some(Color32::from_rgb(byte(0)?, byte(2)?, byte(4)?)),
        8 => Some(Color32::from_rgba_unmultiplied(
            byte(0)?,
            byte(2)?,
            byte(4)?,
            byte(6)?,
        )),
        _ => None,
    }
}

/// Explicit fill, else the root color, else the depth palette.
pub(super) fn accent_color(fill: Option<&str>, kind: NodeKind, depth: usize) -> Color32 {
    if let Some(color) = fill.and_then(parse_color) {
        return color;
    }
    match kind {
        NodeKind::Root => ROOT_COLOR,
        _ => level_color(depth.max(1)),
    }
}

fn shape_fill(node: &SceneNode) -> Color32 {
    if let Some(color) = node.fill.as_deref().and_then(parse_color) {
        return color;
    }
    match node.shape {
        NodeShape::Rect => level_color(2),
        NodeShape::Triangle => level_color(3),
        NodeShape::Circle if node.kind == NodeKind::Root => ROOT_COLOR,
        NodeShape::Circle => NODE_COLOR,
    }
}

pub(super) fn to_screen(rect: Rect, viewport: &Viewport, world: Vec2) -> Pos2 {
    viewport.world_to_screen(world) + rect.min.to_vec2()
}

pub(super) fn draw_background(painter: &Painter, rect: Rect, viewport: &Viewport) {
    painter.rect_filled(rect, 0.0, Color32::from_rgb(13, 18, 36));

    let step = (56.0 * viewport.scale()).max(20.0);
    let origin = rect.min + viewport.translate();
    let stroke = Stroke::new(1.0, Color32::from_rgba_unmultiplied(60, 70, 96, 60));

    let mut x = rect.left() + (origin.x - rect.left()).rem_euclid(step);
    while x < rect.right() {
        painter.line_segment([pos2(x, rect.top()), pos2(x, rect.bottom())], stroke);
        x += step;
    }

    let mut y = rect.top() + (origin.y - rect.top()).rem_euclid(step);
    while y < rect.bottom() {
        painter.line_segment([pos2(rect.left(), y), pos2(rect.right(), y)], stroke);
        y += step;
    }
}

/// Draws the node's shape at `center`, with world sizes multiplied by `scale`.
pub(super) fn draw_node_shape(painter: &Painter, node: &SceneNode, center: Pos2, scale: f32) {
    let fill = shape_fill(node);
    let stroke_color = parse_color(&node.stroke).unwrap_or(Color32::from_rgb(11, 18, 45));
    let stroke = Stroke::new((2.0 * scale).max(1.0), stroke_color);
    let size = node.size * scale;

    match node.shape {
        NodeShape::Circle => {
            painter.circle(center, node.radius * scale, fill, stroke);
        }
        NodeShape::Rect => {
            let rect = Rect::from_center_size(center, size);
            painter.rect(
                rect,
                6.0 * scale,
                fill,
                stroke,
                eframe::egui::StrokeKind::Middle,
            );
        }
        NodeShape::Triangle => {
            let half = size * 0.5;
            let points = vec![
                center + vec2(0.0, -half.y),
                center + vec2(-half.x, half.y),
                center + vec2(half.x, half.y),
            ];
            painter.add(Shape::convex_polygon(points, fill, stroke));
        }
    }
}
