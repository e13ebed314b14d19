use eframe::egui::{Pos2, Rect, Vec2, vec2};

pub const MIN_SCALE: f32 = 0.4;
pub const MAX_SCALE: f32 = 3.0;

pub fn clamp_scale(k: f32) -> f32 {
    k.clamp(MIN_SCALE, MAX_SCALE)
}

/// Scale and translation between world coordinates and canvas-local screen points.
///
/// `screen = world * k + translate`; the canvas origin is its top-left corner.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    k: f32,
    translate: Vec2,
    size: Vec2,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(vec2(800.0, 600.0))
    }
}

impl Viewport {
    pub fn new(size: Vec2) -> Self {
        Self {
            k: 1.0,
            translate: Vec2::ZERO,
            size,
        }
    }

    pub fn scale(&self) -> f32 {
        self.k
    }

    pub fn translate(&self) -> Vec2 {
        self.translate
    }

    pub fn size(&self) -> Vec2 {
        self.size
    }

    pub fn set_size(&mut self, size: Vec2) {
        self.size = size;
    }

    pub fn world_to_screen(&self, world: Vec2) -> Pos2 {
        (world * self.k + self.translate).to_pos2()
    }

    pub fn screen_to_world(&self, screen: Pos2) -> Vec2 {
        (screen.to_vec2() - self.translate) / self.k
    }

    /// Rescales by `factor` while keeping the world point under `screen` in place.
    pub fn zoom_at(&mut self, screen: Pos2, factor: f32) {
        if !factor.is_finite() || factor <= 0.0 {
            return;
        }

        let world = self.screen_to_world(screen);
        self.k = clamp_scale(self.k * factor);
        self.translate = screen.to_vec2() - world * self.k;
    }

    pub fn zoom_by(&mut self, factor: f32) {
        let center = (self.size * 0.5).to_pos2();
        self.zoom_at(center, factor);
    }

    pub fn reset_zoom(&mut self) {
        self.k = 1.0;
        self.translate = Vec2::ZERO;
    }

    pub fn pan(&mut self, delta: Vec2) {
        self.translate += delta;
    }

    pub fn set_translate(&mut self, translate: Vec2) {
        self.translate = translate;
    }

    /// Centers `bounds` in the canvas at the largest scale that still fits it.
    pub fn fit(&mut self, bounds: Rect) {
        if !bounds.is_finite() || bounds.width() <= 0.0 || bounds.height() <= 0.0 {
            return;
        }

        let fit_k = (self.size.x / bounds.width()).min(self.size.y / bounds.height());
        self.k = clamp_scale(fit_k);
        self.translate = self.size * 0.5 - bounds.center().to_vec2() * self.k;
    }
}
