use eframe::egui::{Pos2, Vec2, vec2};
use log::{debug, info};

use crate::backlinks::BacklinkRoute;
use crate::gesture::{Contact, ContactEvent, ContactKind, ContactTarget, GestureMachine, GestureState};
use crate::graph::Graph;
use crate::layout::{LayoutConfig, layout};
use crate::scene::{Scene, SceneNode, TreeEdge};
use crate::viewport::Viewport;

/// World-space margin kept around the visible nodes by [`Viewer::fit_view`].
const FIT_PADDING: f32 = 40.0;
const TOOLTIP_OFFSET: Vec2 = vec2(12.0, 12.0);

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HoverTarget {
    Node(String),
    TreeEdge { parent: String, child: String },
    Backlink(String),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Tooltip {
    pub text: String,
    /// Canvas-local screen position.
    pub pos: Pos2,
}

/// Owns everything one map needs: the graph, its laid-out scene, the viewport,
/// the gesture machine and the hover state. Every interaction goes through here.
pub struct Viewer {
    graph: Graph,
    config: LayoutConfig,
    viewport: Viewport,
    gestures: GestureMachine,
    scene: Scene,
    hover: Option<HoverTarget>,
    pointer: Option<Pos2>,
}

impl Viewer {
    pub fn new(graph: Graph, canvas_size: Vec2, config: LayoutConfig) -> Self {
        let mut viewer = Self {
            graph,
            config,
            viewport: Viewport::new(canvas_size),
            gestures: GestureMachine::default(),
            scene: Scene::default(),
            hover: None,
            pointer: None,
        };
        viewer.relayout();
        viewer
    }

    /// Replaces the graph wholesale; the view returns to identity zoom.
    pub fn load_graph(&mut self, graph: Graph) {
        info!(
            "loaded graph with {} nodes and {} backlinks",
            graph.node_count(),
            graph.backlinks.len()
        );
        self.graph = graph;
        self.viewport.reset_zoom();
        self.gestures.reset();
        self.relayout();
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn gesture_state(&self) -> GestureState {
        self.gestures.state()
    }

    pub fn set_canvas_size(&mut self, size: Vec2) {
        let height_changed = self.viewport.size().y != size.y;
        self.viewport.set_size(size);
        if height_changed {
            self.relayout();
        }
    }

    pub fn relayout(&mut self) {
        layout(&mut self.graph, self.viewport.size().y, &self.config);
        self.scene = Scene::build(&self.graph);
        self.hover = None;
    }

    pub fn toggle_collapse(&mut self, id: &str) -> bool {
        let toggled = self.graph.toggle_collapse(id);
        if toggled {
            self.relayout();
        }
        toggled
    }

    pub fn expand_all(&mut self) {
        self.graph.expand_all();
        self.relayout();
    }

    pub fn collapse_all(&mut self) {
        self.graph.collapse_all();
        self.relayout();
    }

    pub fn is_all_collapsed(&self) -> bool {
        self.graph.is_all_collapsed()
    }

    pub fn toggle_all(&mut self) {
        if self.is_all_collapsed() {
            self.expand_all();
        } else {
            self.collapse_all();
        }
    }

    pub fn select(&mut self, id: &str) -> bool {
        let selected = self.graph.select(id);
        if selected {
            for node in &mut self.scene.nodes {
                node.selected = node.id == id;
            }
        }
        selected
    }

    /// Selects the node and flips it open or closed when it is a branch.
    pub fn click_node(&mut self, id: &str) {
        if !self.select(id) {
            return;
        }
        debug!("clicked node {id}");
        self.toggle_collapse(id);
    }

    pub fn zoom_by(&mut self, factor: f32) {
        self.viewport.zoom_by(factor);
    }

    pub fn zoom_at(&mut self, screen: Pos2, factor: f32) {
        self.viewport.zoom_at(screen, factor);
    }

    pub fn reset_zoom(&mut self) {
        self.viewport.reset_zoom();
    }

    pub fn fit_view(&mut self) {
        if let Some(bounds) = self.scene.bounds(FIT_PADDING) {
            self.viewport.fit(bounds);
        }
    }

    pub fn node_at(&self, screen: Pos2) -> Option<&SceneNode> {
        self.scene.node_at(self.viewport.screen_to_world(screen))
    }

    pub fn on_contact_down(&mut self, id: u64, kind: ContactKind, pos: Pos2) {
        let target = if self.node_at(pos).is_some() {
            ContactTarget::Node
        } else {
            ContactTarget::Background
        };
        let contact = Contact {
            id,
            kind,
            pos,
            target,
        };
        self.gestures
            .handle(ContactEvent::Down(contact), &mut self.viewport);
    }

    pub fn on_contact_move(&mut self, id: u64, pos: Pos2) {
        self.gestures
            .handle(ContactEvent::Move { id, pos }, &mut self.viewport);
    }

    pub fn on_contact_up(&mut self, id: u64) {
        self.gestures
            .handle(ContactEvent::Up { id }, &mut self.viewport);
    }

    pub fn on_contact_cancel(&mut self, id: u64) {
        self.gestures
            .handle(ContactEvent::Cancel { id }, &mut self.viewport);
    }

    /// Resolves what sits under the pointer: nodes first, then tree edges,
    /// then backlinks (topmost drawn wins within each layer).
    pub fn hover_at(&mut self, screen: Pos2) {
        let world = self.viewport.screen_to_world(screen);
        let target = if let Some(node) = self.scene.node_at(world) {
            Some(HoverTarget::Node(node.id.clone()))
        } else if let Some(edge) = self.scene.edge_at(world) {
            Some(HoverTarget::TreeEdge {
                parent: edge.parent.clone(),
                child: edge.child.clone(),
            })
        } else {
            self.scene
                .backlink_at(world)
                .map(|route| HoverTarget::Backlink(route.id.clone()))
        };

        if target != self.hover {
            debug!("hover {:?} -> {target:?}", self.hover);
        }
        self.hover = target;
        self.pointer = Some(screen);
    }

    pub fn clear_hover(&mut self) {
        self.hover = None;
        self.pointer = None;
    }

    pub fn hover(&self) -> Option<&HoverTarget> {
        self.hover.as_ref()
    }

    pub fn hovered_backlink(&self) -> Option<&BacklinkRoute> {
        match &self.hover {
            Some(HoverTarget::Backlink(id)) => {
                self.scene.backlinks.iter().find(|route| &route.id == id)
            }
            _ => None,
        }
    }

    pub fn hovered_edge(&self) -> Option<&TreeEdge> {
        match &self.hover {
            Some(HoverTarget::TreeEdge { parent, child }) => self
                .scene
                .edges
                .iter()
                .find(|edge| &edge.parent == parent && &edge.child == child),
            _ => None,
        }
    }

    /// Pointer-following text for the hovered edge or backlink.
    pub fn tooltip(&self) -> Option<Tooltip> {
        let pointer = self.pointer?;
        let text = if let Some(route) = self.hovered_backlink() {
            route.tooltip()?
        } else {
            let label = self.hovered_edge()?.child_label.trim();
            if label.is_empty() {
                return None;
            }
            label.to_owned()
        };
        Some(Tooltip {
            text,
            pos: pointer + TOOLTIP_OFFSET,
        })
    }
}
