use eframe::egui::{self, Event, PointerButton, Rect, TouchPhase, Ui};

use crate::gesture::ContactKind;

use super::super::ViewModel;

const WHEEL_ZOOM_STEP: f32 = 1.15;
/// Touch ids come from the platform; the mouse gets one id outside their usual range.
const MOUSE_CONTACT: u64 = u64::MAX;

impl ViewModel {
    pub(in crate::app) fn handle_wheel_zoom(
        &mut self,
        ui: &Ui,
        rect: Rect,
        response: &egui::Response,
    ) {
        if !response.hovered() {
            return;
        }

        let scroll = ui.input(|input| input.raw_scroll_delta.y);
        if scroll.abs() <= f32::EPSILON {
            return;
        }

        let pointer = ui
            .input(|input| input.pointer.hover_pos())
            .unwrap_or_else(|| rect.center());
        let factor = if scroll > 0.0 {
            WHEEL_ZOOM_STEP
        } else {
            1.0 / WHEEL_ZOOM_STEP
        };
        self.viewer.zoom_at(pointer - rect.min.to_vec2(), factor);
    }

    /// Feeds raw touch and mouse events to the gesture machine in canvas coordinates.
    ///
    /// Touch screens also emit simulated pointer events; those are skipped while
    /// any touch is down so a finger is never tracked twice.
    pub(in crate::app) fn handle_contacts(&mut self, ui: &Ui, rect: Rect, response: &egui::Response) {
        let events = ui.input(|input| input.events.clone());
        let touch_in_batch = events
            .iter()
            .any(|event| matches!(event, Event::Touch { .. }));
        let local = |pos: egui::Pos2| pos - rect.min.to_vec2();

        for event in events {
            match event {
                Event::Touch { id, phase, pos, .. } => match phase {
                    TouchPhase::Start => {
                        if rect.contains(pos) {
                            self.active_touches.insert(id.0);
                            self.viewer
                                .on_contact_down(id.0, ContactKind::Touch, local(pos));
                        }
                    }
                    TouchPhase::Move => self.viewer.on_contact_move(id.0, local(pos)),
                    TouchPhase::End => {
                        self.active_touches.remove(&id.0);
                        self.viewer.on_contact_up(id.0);
                    }
                    TouchPhase::Cancel => {
                        self.active_touches.remove(&id.0);
                        self.viewer.on_contact_cancel(id.0);
                    }
                },
                _ if touch_in_batch || !self.active_touches.is_empty() => {}
                Event::PointerButton {
                    pos,
                    button: PointerButton::Primary,
                    pressed,
                    ..
                } => {
                    if !pressed {
                        self.viewer.on_contact_up(MOUSE_CONTACT);
                    } else if response.hovered() && rect.contains(pos) {
                        self.viewer
                            .on_contact_down(MOUSE_CONTACT, ContactKind::Mouse, local(pos));
                    }
                }
                Event::PointerMoved(pos) => self.viewer.on_contact_move(MOUSE_CONTACT, local(pos)),
                Event::PointerGone => self.viewer.on_contact_cancel(MOUSE_CONTACT),
                _ => {}
            }
        }
    }

    pub(in crate::app) fn handle_node_click(&mut self, rect: Rect, response: &egui::Response) {
        if !response.clicked_by(PointerButton::Primary) {
            return;
        }
        let Some(pointer) = response.interact_pointer_pos() else {
            return;
        };

        let clicked = self
            .viewer
            .node_at(pointer - rect.min.to_vec2())
            .map(|node| node.id.clone());
        if let Some(id) = clicked {
            self.viewer.click_node(&id);
        }
    }

    pub(in crate::app) fn update_hover(&mut self, ui: &Ui, rect: Rect, response: &egui::Response) {
        let pointer = ui.input(|input| input.pointer.hover_pos());
        match pointer {
            Some(pointer) if response.hovered() && rect.contains(pointer) => {
                self.viewer.hover_at(pointer - rect.min.to_vec2());
            }
            _ => self.viewer.clear_hover(),
        }
    }
}
