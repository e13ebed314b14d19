use std::collections::HashSet;

use eframe::egui::{self, Align, Color32, Context, Layout, RichText, Vec2};

use crate::graph::Graph;
use crate::layout::LayoutConfig;
use crate::viewer::Viewer;

use super::super::ViewModel;

impl ViewModel {
    pub(in crate::app) fn new(graph: Graph, canvas_size: Vec2) -> Self {
        Self {
            viewer: Viewer::new(graph, canvas_size, LayoutConfig::default()),
            active_touches: HashSet::new(),
            load_error: None,
        }
    }

    /// Swaps in a freshly loaded graph, keeping panels and pending touches.
    pub(in crate::app) fn replace_graph(&mut self, graph: Graph) {
        self.viewer.load_graph(graph);
        self.active_touches.clear();
        self.load_error = None;
    }

    pub(in crate::app) fn show(
        &mut self,
        ctx: &Context,
        data_path: &str,
        reload_requested: &mut bool,
        is_loading: bool,
    ) {
        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("Structure Map");
                    ui.separator();
                    self.draw_controls(ui, reload_requested, is_loading);
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        ui.label(format!(
                            "{data_path}  |  nodes: {}  |  backlinks: {}",
                            self.viewer.graph().node_count(),
                            self.viewer.graph().backlinks.len()
                        ));
                    });
                });

                let mut dismissed = false;
                if let Some(error) = &self.load_error {
                    ui.horizontal(|ui| {
                        ui.label(
                            RichText::new(format!("Reload failed: {error}"))
                                .color(Color32::from_rgb(240, 120, 110)),
                        );
                        dismissed = ui.small_button("Dismiss").clicked();
                    });
                }
                if dismissed {
                    self.load_error = None;
                }
            });

        egui::SidePanel::right("details")
            .resizable(true)
            .default_width(320.0)
            .show(ctx, |ui| self.draw_details(ui));

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| self.draw_map(ui));
    }
}
