use eframe::egui::{self, Ui};

use super::super::ViewModel;

const BUTTON_ZOOM_STEP: f32 = 1.2;

impl ViewModel {
    pub(in crate::app) fn draw_controls(
        &mut self,
        ui: &mut Ui,
        reload_requested: &mut bool,
        is_loading: bool,
    ) {
        if ui
            .button("−")
            .on_hover_text("Zoom out around the canvas center.")
            .clicked()
        {
            self.viewer.zoom_by(1.0 / BUTTON_ZOOM_STEP);
        }
        if ui
            .button("+")
            .on_hover_text("Zoom in around the canvas center.")
            .clicked()
        {
            self.viewer.zoom_by(BUTTON_ZOOM_STEP);
        }
        if ui
            .button("Reset")
            .on_hover_text("Return to 100% zoom with no pan.")
            .clicked()
        {
            self.viewer.reset_zoom();
        }
        if ui
            .button("Fit")
            .on_hover_text("Frame every visible node.")
            .clicked()
        {
            self.viewer.fit_view();
        }

        ui.separator();

        let toggle_label = if self.viewer.is_all_collapsed() {
            "Expand All"
        } else {
            "Collapse All"
        };
        if ui
            .button(toggle_label)
            .on_hover_text("Root and hub always stay open.")
            .clicked()
        {
            self.viewer.toggle_all();
        }

        let reload_button = ui
            .add_enabled(!is_loading, egui::Button::new("Reload"))
            .on_hover_text("Read the document again from disk.");
        if reload_button.clicked() {
            *reload_requested = true;
        }
        if is_loading {
            ui.spinner();
        }

        ui.separator();
        ui.label(format!("zoom {:.0}%", self.viewer.viewport().scale() * 100.0));
    }
}
