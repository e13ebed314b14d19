use eframe::egui::{Pos2, Vec2};
use log::debug;

use crate::viewport::Viewport;

pub const PINCH_FACTOR_MIN: f32 = 0.7;
pub const PINCH_FACTOR_MAX: f32 = 1.4;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContactKind {
    Mouse,
    Touch,
}

/// What the contact landed on, as decided by the presentation layer's hit test.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContactTarget {
    Background,
    Node,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Contact {
    pub id: u64,
    pub kind: ContactKind,
    pub pos: Pos2,
    pub target: ContactTarget,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ContactEvent {
    Down(Contact),
    Move { id: u64, pos: Pos2 },
    Up { id: u64 },
    Cancel { id: u64 },
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum GestureState {
    #[default]
    Idle,
    Panning {
        contact: u64,
        origin: Pos2,
        translate_start: Vec2,
    },
    Pinching {
        last_distance: f32,
    },
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct TrackedContact {
    id: u64,
    pos: Pos2,
}

/// Turns raw contacts into pan and pinch-zoom updates on a [`Viewport`].
#[derive(Clone, Debug, Default)]
pub struct GestureMachine {
    state: GestureState,
    contacts: Vec<TrackedContact>,
}

impl GestureMachine {
    pub fn state(&self) -> GestureState {
        self.state
    }

    #[cfg(test)]
    pub fn is_panning(&self) -> bool {
        matches!(self.state, GestureState::Panning { .. })
    }

    #[cfg(test)]
    pub fn contact_count(&self) -> usize {
        self.contacts.len()
    }

    pub fn reset(&mut self) {
        self.state = GestureState::Idle;
        self.contacts.clear();
    }

    pub fn handle(&mut self, event: ContactEvent, viewport: &mut Viewport) {
        let before = self.state;
        match event {
            ContactEvent::Down(contact) => self.contact_down(contact, viewport),
            ContactEvent::Move { id, pos } => self.contact_move(id, pos, viewport),
            ContactEvent::Up { id } | ContactEvent::Cancel { id } => self.contact_end(id),
        }

        if std::mem::discriminant(&before) != std::mem::discriminant(&self.state) {
            debug!("gesture {before:?} -> {:?}", self.state);
        }
    }

    fn contact_down(&mut self, contact: Contact, viewport: &Viewport) {
        if contact.kind == ContactKind::Mouse && contact.target != ContactTarget::Background {
            return;
        }
        if self.contacts.iter().any(|tracked| tracked.id == contact.id) {
            return;
        }

        self.contacts.push(TrackedContact {
            id: contact.id,
            pos: contact.pos,
        });

        match self.contacts.len() {
            1 => {
                self.state = GestureState::Panning {
                    contact: contact.id,
                    origin: contact.pos,
                    translate_start: viewport.translate(),
                };
            }
            2 if contact.kind == ContactKind::Touch => {
                self.state = GestureState::Pinching {
                    last_distance: self.pinch_distance().unwrap_or(1.0),
                };
            }
            _ => {}
        }
    }

    fn contact_move(&mut self, id: u64, pos: Pos2, viewport: &mut Viewport) {
        let Some(tracked) = self.contacts.iter_mut().find(|tracked| tracked.id == id) else {
            return;
        };
        tracked.pos = pos;

        match self.state {
            GestureState::Pinching { last_distance } => {
                let Some((first, second)) = self.pinch_pair() else {
                    return;
                };
                if id != first.id && id != second.id {
                    return;
                }

                let distance = separation(first.pos, second.pos);
                let factor = (distance / last_distance).clamp(PINCH_FACTOR_MIN, PINCH_FACTOR_MAX);
                self.state = GestureState::Pinching {
                    last_distance: distance,
                };
                viewport.zoom_at(first.pos.lerp(second.pos, 0.5), factor);
            }
            GestureState::Panning {
                contact,
                origin,
                translate_start,
            } if contact == id => {
                viewport.set_translate(translate_start);
                viewport.pan(pos - origin);
            }
            _ => {}
        }
    }

    fn contact_end(&mut self, id: u64) {
        self.contacts.retain(|tracked| tracked.id != id);

        if self.contacts.is_empty() {
            self.state = GestureState::Idle;
            return;
        }

        match self.state {
            GestureState::Pinching { .. } if self.contacts.len() < 2 => {
                self.state = GestureState::Idle;
            }
            GestureState::Pinching { .. } => {
                self.state = GestureState::Pinching {
                    last_distance: self.pinch_distance().unwrap_or(1.0),
                };
            }
            GestureState::Panning { contact, .. } if contact == id => {
                self.state = GestureState::Idle;
            }
            _ => {}
        }
    }

    fn pinch_pair(&self) -> Option<(TrackedContact, TrackedContact)> {
        match self.contacts.as_slice() {
            [first, second, ..] => Some((*first, *second)),
            _ => None,
        }
    }

    fn pinch_distance(&self) -> Option<f32> {
        self.pinch_pair()
            .map(|(first, second)| separation(first.pos, second.pos))
    }
}

fn separation(a: Pos2, b: Pos2) -> f32 {
    let distance = a.distance(b);
    if distance > 0.0 { distance } else { 1.0 }
}
