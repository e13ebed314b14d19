use std::collections::HashSet;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use eframe::egui::{self, Context, Vec2};
use log::{debug, info, warn};

use crate::document::load_document;
use crate::graph::Graph;
use crate::viewer::Viewer;

mod graph;
mod render_utils;
mod ui;

type LoadResult = Result<Graph, String>;

pub struct StructureMapApp {
    data_path: String,
    canvas_size: Vec2,
    state: AppState,
    reload_rx: Option<Receiver<LoadResult>>,
}

enum AppState {
    Loading { rx: Receiver<LoadResult> },
    Ready(Box<ViewModel>),
    Error(String),
}

struct ViewModel {
    viewer: Viewer,
    active_touches: HashSet<u64>,
    /// Failure of the last reload; the previous graph stays on screen.
    load_error: Option<String>,
}

impl StructureMapApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, data_path: String, canvas_size: Vec2) -> Self {
        let state = Self::start_load(data_path.clone());
        Self {
            data_path,
            canvas_size,
            state,
            reload_rx: None,
        }
    }

    fn spawn_load(data_path: String) -> Receiver<LoadResult> {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            info!("loading {data_path}");
            let result = load_document(&data_path).map_err(|error| format!("{error:#}"));
            let _ = tx.send(result);
        });

        rx
    }

    fn start_load(data_path: String) -> AppState {
        AppState::Loading {
            rx: Self::spawn_load(data_path),
        }
    }
}

/// Starts a background reload unless one is already in flight.
fn request_reload(reload_rx: &mut Option<Receiver<LoadResult>>, data_path: &str) -> bool {
    if reload_rx.is_some() {
        return false;
    }
    *reload_rx = Some(StructureMapApp::spawn_load(data_path.to_owned()));
    true
}

/// Applies a finished reload to `model`; returns true while it is still pending.
fn poll_reload(reload_rx: &mut Option<Receiver<LoadResult>>, model: &mut ViewModel) -> bool {
    let Some(rx) = reload_rx.take() else {
        return false;
    };

    match rx.try_recv() {
        Ok(Ok(graph)) => model.replace_graph(graph),
        Ok(Err(error)) => {
            warn!("reload failed: {error}");
            model.load_error = Some(error);
        }
        Err(TryRecvError::Empty) => {
            *reload_rx = Some(rx);
            return true;
        }
        Err(TryRecvError::Disconnected) => {
            warn!("reload worker disconnected");
            model.load_error = Some("Background load worker disconnected".to_owned());
        }
    }
    false
}

impl eframe::App for StructureMapApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;

        match &mut self.state {
            AppState::Loading { rx } => {
                match rx.try_recv() {
                    Ok(Ok(graph)) => {
                        transition = Some(AppState::Ready(Box::new(ViewModel::new(
                            graph,
                            self.canvas_size,
                        ))));
                    }
                    Ok(Err(error)) => {
                        warn!("initial load failed: {error}");
                        transition = Some(AppState::Error(error));
                    }
                    Err(TryRecvError::Empty) => ctx.request_repaint(),
                    Err(TryRecvError::Disconnected) => {
                        transition = Some(AppState::Error(
                            "Background load worker disconnected".to_owned(),
                        ));
                    }
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading(format!("Loading {}...", self.data_path));
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
            }
            AppState::Error(error) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Could not load the structure map");
                    ui.add_space(6.0);
                    ui.label(error.as_str());
                    ui.add_space(6.0);
                    ui.label("The document needs a rootId that matches one of its nodes.");
                    ui.add_space(10.0);
                    if ui.button("Retry").clicked() {
                        transition = Some(Self::start_load(self.data_path.clone()));
                    }
                });
            }
            AppState::Ready(model) => {
                let mut reload_requested = false;
                let is_reloading = self.reload_rx.is_some();
                model.show(ctx, &self.data_path, &mut reload_requested, is_reloading);

                if reload_requested && !request_reload(&mut self.reload_rx, &self.data_path) {
                    debug!("reload already in flight");
                }
                if poll_reload(&mut self.reload_rx, model) {
                    ctx.request_repaint();
                }
            }
        }

        if let Some(next_state) = transition {
            self.reload_rx = None;
            self.state = next_state;
        }
    }
}
