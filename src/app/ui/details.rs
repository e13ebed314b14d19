use eframe::egui::{self, RichText, Ui};

use crate::graph::NodeKind;
use crate::util::display_or_dash;

use super::super::ViewModel;

impl ViewModel {
    pub(in crate::app) fn draw_details(&self, ui: &mut Ui) {
        let graph = self.viewer.graph();

        let Some(node) = graph.selected() else {
            ui.heading("Node Details");
            ui.add_space(6.0);
            ui.label("–");
            self.draw_backlink_details(ui);
            return;
        };

        let heading = match node.kind {
            NodeKind::Root => "Structure Details",
            NodeKind::Hub => "Hub Node",
            NodeKind::Child => "Child Node",
        };
        ui.heading(heading);
        ui.add_space(6.0);

        let state = match (node.has_children(), node.collapsed) {
            (false, _) => "leaf",
            (true, true) => "collapsed",
            (true, false) => "expanded",
        };

        egui::Grid::new("node_details")
            .num_columns(2)
            .spacing([12.0, 6.0])
            .show(ui, |ui| {
                ui.label(RichText::new("Name").weak());
                ui.label(RichText::new(display_or_dash(&node.label)).strong());
                ui.end_row();

                ui.label(RichText::new("Type").weak());
                ui.label(format!("{} (depth {})", node.kind.label(), node.depth));
                ui.end_row();

                ui.label(RichText::new("Children").weak());
                ui.label(node.children.len().to_string());
                ui.end_row();

                ui.label(RichText::new("State").weak());
                ui.label(state);
                ui.end_row();
            });

        ui.add_space(6.0);
        ui.label(RichText::new("Content").weak());
        egui::ScrollArea::vertical()
            .id_salt("node_content_scroll")
            .max_height(260.0)
            .show(ui, |ui| {
                ui.label(display_or_dash(&node.content));
            });

        self.draw_backlink_details(ui);
    }

    /// Title and note of the hovered backlink, dimmed dashes otherwise.
    fn draw_backlink_details(&self, ui: &mut Ui) {
        ui.separator();
        ui.label(RichText::new("Backlink").strong());

        let (title, note) = self
            .viewer
            .hovered_backlink()
            .map(|route| (route.title.trim(), route.note.trim()))
            .unwrap_or_default();

        for (caption, value) in [("Title", title), ("Note", note)] {
            ui.label(RichText::new(caption).weak());
            if value.is_empty() {
                ui.label(RichText::new("—").weak());
            } else {
                ui.label(value);
            }
        }
    }
}
