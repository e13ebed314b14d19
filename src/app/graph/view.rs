use eframe::egui::{
    Align2, Color32, CornerRadius, CursorIcon, FontId, Painter, Pos2, Rect, Sense, Shape,
    Stroke, StrokeKind, Ui, Vec2, vec2,
};

use crate::backlinks::{ARROW_HEAD_LENGTH, BacklinkRoute};
use crate::gesture::GestureState;
use crate::graph::LinkStyle;
use crate::scene::{LABEL_OFFSET, SceneNode, TreeEdge};
use crate::viewer::HoverTarget;
use crate::viewport::Viewport;

use super::super::ViewModel;
use super::super::render_utils::{
    LINE_COLOR, SELECTED_COLOR, accent_color, blend_color, draw_background, draw_node_shape,
    parse_color, to_screen,
};

const BACKLINK_SEGMENTS: usize = 32;
const DEFAULT_BACKLINK_COLOR: Color32 = Color32::from_rgb(0x7c, 0xb8, 0xff);

impl ViewModel {
    pub(in crate::app) fn draw_map(&mut self, ui: &mut Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        self.viewer.set_canvas_size(rect.size());

        self.handle_wheel_zoom(ui, rect, &response);
        self.handle_contacts(ui, rect, &response);
        self.handle_node_click(rect, &response);
        self.update_hover(ui, rect, &response);

        if self.viewer.gesture_state() != GestureState::Idle {
            ui.ctx().set_cursor_icon(CursorIcon::Grabbing);
            ui.ctx().request_repaint();
        } else if matches!(self.viewer.hover(), Some(HoverTarget::Node(_))) {
            ui.ctx().set_cursor_icon(CursorIcon::PointingHand);
        }

        let painter = ui.painter_at(rect);
        let viewport = *self.viewer.viewport();
        draw_background(&painter, rect, &viewport);

        let hover = self.viewer.hover().cloned();
        let scene = self.viewer.scene();

        for route in &scene.backlinks {
            let hovered = hover.as_ref() == Some(&HoverTarget::Backlink(route.id.clone()));
            draw_backlink(&painter, rect, &viewport, route, hovered);
        }

        for edge in &scene.edges {
            let hovered = matches!(
                &hover,
                Some(HoverTarget::TreeEdge { parent, child })
                    if *parent == edge.parent && *child == edge.child
            );
            draw_tree_edge(&painter, rect, &viewport, edge, hovered);
        }

        for node in &scene.nodes {
            let hovered = hover.as_ref() == Some(&HoverTarget::Node(node.id.clone()));
            draw_node(&painter, rect, &viewport, node, hovered);
        }

        if let Some(tooltip) = self.viewer.tooltip() {
            draw_tooltip(&painter, tooltip.pos + rect.min.to_vec2(), &tooltip.text);
        }
    }
}

fn draw_backlink(
    painter: &Painter,
    rect: Rect,
    viewport: &Viewport,
    route: &BacklinkRoute,
    hovered: bool,
) {
    let scale = viewport.scale();
    let base = parse_color(&route.color).unwrap_or(DEFAULT_BACKLINK_COLOR);
    let color = if hovered {
        blend_color(base, Color32::WHITE, 0.35)
    } else {
        base
    };
    let width = if hovered { 2.6 } else { 1.6 } * scale.max(0.5);
    let stroke = Stroke::new(width, color);

    let points = route
        .sample(BACKLINK_SEGMENTS)
        .into_iter()
        .map(|point| to_screen(rect, viewport, point))
        .collect::<Vec<_>>();

    match route.style {
        LinkStyle::Solid => {
            painter.add(Shape::line(points, stroke));
        }
        LinkStyle::Dashed => {
            painter.extend(Shape::dashed_line(&points, stroke, 6.0 * scale, 6.0 * scale));
        }
        LinkStyle::Dotted => {
            painter.extend(Shape::dotted_line(&points, color, 7.0 * scale, width * 0.6));
        }
    }

    let tip_direction = (route.end - route.control).normalized();
    if tip_direction != Vec2::ZERO {
        let base_center = to_screen(rect, viewport, route.end);
        let tip = base_center + tip_direction * ARROW_HEAD_LENGTH * scale;
        let side = tip_direction.rot90() * ARROW_HEAD_LENGTH * 0.5 * scale;
        painter.add(Shape::convex_polygon(
            vec![tip, base_center + side, base_center - side],
            color,
            Stroke::NONE,
        ));
    }

    if let Some(label) = &route.label {
        let center = to_screen(rect, viewport, label.center);
        let bubble = Rect::from_center_size(center, label.size * scale);
        painter.rect(
            bubble,
            CornerRadius::same((6.0 * scale).clamp(0.0, 255.0) as u8),
            Color32::from_rgba_unmultiplied(13, 18, 36, 230),
            Stroke::new(1.0, color),
            StrokeKind::Inside,
        );
        painter.text(
            center,
            Align2::CENTER_CENTER,
            &label.text,
            FontId::proportional((12.0 * scale).clamp(6.0, 36.0)),
            Color32::from_gray(235),
        );
    }
}

fn draw_tree_edge(painter: &Painter, rect: Rect, viewport: &Viewport, edge: &TreeEdge, hovered: bool) {
    let scale = viewport.scale().max(0.5);
    let stroke = if hovered {
        Stroke::new(
            3.0 * scale,
            accent_color(edge.child_fill.as_deref(), edge.child_kind, edge.child_depth),
        )
    } else {
        Stroke::new(1.5 * scale, LINE_COLOR)
    };
    painter.line_segment(
        [
            to_screen(rect, viewport, edge.from),
            to_screen(rect, viewport, edge.to),
        ],
        stroke,
    );
}

fn draw_node(painter: &Painter, rect: Rect, viewport: &Viewport, node: &SceneNode, hovered: bool) {
    let scale = viewport.scale();
    let center = to_screen(rect, viewport, node.pos);

    if node.selected {
        painter.circle_stroke(
            center,
            (node.size.max_elem() * 0.5 + 5.0) * scale,
            Stroke::new(2.0, SELECTED_COLOR),
        );
    } else if hovered {
        painter.circle_stroke(
            center,
            (node.size.max_elem() * 0.5 + 4.0) * scale,
            Stroke::new(1.5, Color32::from_rgba_unmultiplied(255, 255, 255, 120)),
        );
    }

    draw_node_shape(painter, node, center, scale);

    let text_color = if node.collapsed {
        Color32::from_gray(170)
    } else {
        Color32::from_gray(235)
    };
    painter.text(
        to_screen(rect, viewport, node.pos + LABEL_OFFSET),
        Align2::LEFT_BOTTOM,
        node.display_label(),
        FontId::proportional((13.0 * scale).clamp(6.0, 40.0)),
        text_color,
    );
}

fn draw_tooltip(painter: &Painter, pos: Pos2, text: &str) {
    let galley = painter.layout_no_wrap(
        text.to_owned(),
        FontId::proportional(13.0),
        Color32::from_gray(240),
    );
    let bubble = Rect::from_min_size(pos, galley.size() + vec2(12.0, 8.0));
    painter.rect(
        bubble,
        CornerRadius::same(4),
        Color32::from_rgba_unmultiplied(20, 26, 48, 240),
        Stroke::new(1.0, Color32::from_gray(90)),
        StrokeKind::Inside,
    );
    painter.galley(pos + vec2(6.0, 4.0), galley, Color32::from_gray(240));
}
