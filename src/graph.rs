use std::collections::HashSet;

use eframe::egui::Vec2;
use indexmap::IndexMap;
use log::debug;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StructureError {
    #[error("document is missing a rootId")]
    MissingRoot,
    #[error("rootId {0:?} does not match any node")]
    UnknownRoot(String),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NodeKind {
    Root,
    Hub,
    #[default]
    Child,
}

impl NodeKind {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "root" => Some(Self::Root),
            "hub" => Some(Self::Hub),
            "child" => Some(Self::Child),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Root => "root",
            Self::Hub => "hub",
            Self::Child => "child",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NodeShape {
    #[default]
    Circle,
    Rect,
    Triangle,
}

impl NodeShape {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "circle" => Some(Self::Circle),
            "rect" => Some(Self::Rect),
            "triangle" => Some(Self::Triangle),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LinkStyle {
    Solid,
    Dotted,
    #[default]
    Dashed,
}

impl LinkStyle {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "solid" => Some(Self::Solid),
            "dotted" => Some(Self::Dotted),
            "dashed" => Some(Self::Dashed),
            _ => None,
        }
    }
}

pub const DEFAULT_NODE_STROKE: &str = "#0b122d";

#[derive(Clone, Debug)]
pub struct Node {
    pub id: String,
    pub label: String,
    pub content: String,
    pub kind: NodeKind,
    pub parent_id: Option<String>,
    pub children: Vec<String>,
    pub collapsed: bool,
    /// Written by the layout pass; stale for nodes hidden below a collapsed ancestor.
    pub depth: usize,
    pub pos: Vec2,
    pub shape: NodeShape,
    pub w: Option<f32>,
    pub h: Option<f32>,
    pub fill: Option<String>,
    pub stroke: String,
}

impl Node {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: "node".to_owned(),
            content: String::new(),
            kind: NodeKind::Child,
            parent_id: None,
            children: Vec::new(),
            collapsed: false,
            depth: 0,
            pos: Vec2::ZERO,
            shape: NodeShape::Circle,
            w: None,
            h: None,
            fill: None,
            stroke: DEFAULT_NODE_STROKE.to_owned(),
        }
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Bounding radius used for backlink clearance and circle drawing.
    pub fn radius(&self) -> f32 {
        if self.shape == NodeShape::Circle
            && let (Some(w), Some(h)) = (self.w, self.h)
        {
            return (w.min(h) / 2.0).max(7.5);
        }

        match self.kind {
            NodeKind::Root => 10.0,
            NodeKind::Hub => 9.0,
            NodeKind::Child => 7.5,
        }
    }

    pub fn size(&self) -> Vec2 {
        match self.shape {
            NodeShape::Circle => Vec2::splat(self.radius() * 2.0),
            NodeShape::Rect => Vec2::new(self.w.unwrap_or(24.0), self.h.unwrap_or(18.0)),
            NodeShape::Triangle => Vec2::new(self.w.unwrap_or(22.0), self.h.unwrap_or(22.0)),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Backlink {
    pub id: String,
    pub from: String,
    pub to: String,
    pub style: LinkStyle,
    pub color: String,
    pub bend: f32,
    pub pad: f32,
    pub title: String,
    pub note: String,
}

pub const DEFAULT_BACKLINK_COLOR: &str = "#7cb8ff";
pub const DEFAULT_BACKLINK_BEND: f32 = 40.0;
pub const DEFAULT_BACKLINK_PAD: f32 = 10.0;

impl Backlink {
    #[cfg(test)]
    pub fn new(id: impl Into<String>, from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            from: from.into(),
            to: to.into(),
            style: LinkStyle::Dashed,
            color: DEFAULT_BACKLINK_COLOR.to_owned(),
            bend: DEFAULT_BACKLINK_BEND,
            pad: DEFAULT_BACKLINK_PAD,
            title: String::new(),
            note: String::new(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Graph {
    pub root_id: String,
    pub hub_id: Option<String>,
    pub selected_id: Option<String>,
    pub nodes: IndexMap<String, Node>,
    pub backlinks: Vec<Backlink>,
}

impl Graph {
    /// Builds a store from loosely consistent parts, repairing the hierarchy.
    ///
    /// `children` lists are authoritative: dangling entries are dropped, each
    /// node keeps at most one parent (first claim in depth-first order from the
    /// root wins), cycles are cut, and every `parent_id` is recomputed.
    pub fn new(
        root_id: &str,
        hub_id: Option<&str>,
        selected_id: Option<&str>,
        mut nodes: IndexMap<String, Node>,
        mut backlinks: Vec<Backlink>,
    ) -> Result<Self, StructureError> {
        if root_id.is_empty() {
            return Err(StructureError::MissingRoot);
        }
        if !nodes.contains_key(root_id) {
            return Err(StructureError::UnknownRoot(root_id.to_owned()));
        }

        let known_ids = nodes.keys().cloned().collect::<HashSet<_>>();
        for node in nodes.values_mut() {
            let before = node.children.len();
            node.children.retain(|child| known_ids.contains(child));
            if node.children.len() != before {
                debug!(
                    "dropped {} dangling child reference(s) from {}",
                    before - node.children.len(),
                    node.id
                );
            }
        }

        cut_repeated_children(root_id, &mut nodes);

        for node in nodes.values_mut() {
            node.parent_id = None;
        }
        let links = nodes
            .values()
            .flat_map(|node| {
                node.children
                    .iter()
                    .map(|child| (child.clone(), node.id.clone()))
            })
            .collect::<Vec<_>>();
        for (child, parent) in links {
            if let Some(node) = nodes.get_mut(&child) {
                node.parent_id = Some(parent);
            }
        }

        let before = backlinks.len();
        backlinks.retain(|link| {
            link.from != link.to && nodes.contains_key(&link.from) && nodes.contains_key(&link.to)
        });
        if backlinks.len() != before {
            debug!("dropped {} malformed backlink(s)", before - backlinks.len());
        }

        let hub_id = hub_id
            .filter(|id| nodes.contains_key(*id))
            .map(str::to_owned);
        let selected_id = selected_id
            .filter(|id| nodes.contains_key(*id))
            .unwrap_or(root_id)
            .to_owned();

        Ok(Self {
            root_id: root_id.to_owned(),
            hub_id,
            selected_id: Some(selected_id),
            nodes,
            backlinks,
        })
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    #[cfg(test)]
    pub fn root(&self) -> Option<&Node> {
        self.nodes.get(&self.root_id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn visible_children<'a>(&'a self, node: &'a Node) -> impl Iterator<Item = &'a Node> + 'a {
        let children: &[String] = if node.collapsed { &[] } else { &node.children };
        children.iter().filter_map(|id| self.nodes.get(id))
    }

    /// Visible nodes in pre-order with their depth below the root.
    pub fn walk_visible(&self) -> Vec<(String, usize)> {
        let mut order = Vec::new();
        let mut seen = HashSet::new();
        let mut stack = vec![(self.root_id.as_str(), 0usize)];

        while let Some((id, depth)) = stack.pop() {
            let Some(node) = self.nodes.get(id) else {
                continue;
            };
            if !seen.insert(id) {
                continue;
            }

            order.push((id.to_owned(), depth));
            if !node.collapsed {
                for child in node.children.iter().rev() {
                    stack.push((child.as_str(), depth + 1));
                }
            }
        }

        order
    }

    pub fn visible_ids(&self) -> Vec<String> {
        self.walk_visible().into_iter().map(|(id, _)| id).collect()
    }

    pub fn is_special(&self, id: &str) -> bool {
        id == self.root_id || self.hub_id.as_deref() == Some(id)
    }

    /// Flips `collapsed` on a node with children; leaves are left alone.
    pub fn toggle_collapse(&mut self, id: &str) -> bool {
        match self.nodes.get_mut(id) {
            Some(node) if node.has_children() => {
                node.collapsed = !node.collapsed;
                true
            }
            _ => false,
        }
    }

    pub fn expand_all(&mut self) {
        for node in self.nodes.values_mut() {
            node.collapsed = false;
        }
    }

    /// Collapses every branch except root and hub, which stay open for orientation.
    pub fn collapse_all(&mut self) {
        let root_id = self.root_id.clone();
        let hub_id = self.hub_id.clone();
        for node in self.nodes.values_mut() {
            let special = node.id == root_id || hub_id.as_deref() == Some(node.id.as_str());
            if special {
                node.collapsed = false;
            } else if node.has_children() {
                node.collapsed = true;
            }
        }
    }

    pub fn is_all_collapsed(&self) -> bool {
        self.nodes
            .values()
            .all(|node| self.is_special(&node.id) || !node.has_children() || node.collapsed)
    }

    pub fn select(&mut self, id: &str) -> bool {
        if !self.nodes.contains_key(id) {
            return false;
        }
        self.selected_id = Some(id.to_owned());
        true
    }

    pub fn selected(&self) -> Option<&Node> {
        self.selected_id.as_ref().and_then(|id| self.nodes.get(id))
    }
}

/// Keeps the first claim on every node and drops later child entries that
/// point at an already claimed node (second parents, duplicates, cycles).
fn cut_repeated_children(root_id: &str, nodes: &mut IndexMap<String, Node>) {
    let starts = std::iter::once(root_id.to_owned())
        .chain(nodes.keys().filter(|id| id.as_str() != root_id).cloned())
        .collect::<Vec<_>>();

    let mut claimed = HashSet::new();
    let mut dropped = HashSet::new();

    for start in starts {
        if !claimed.insert(start.clone()) {
            continue;
        }

        let mut stack = child_entries(nodes, &start);
        while let Some((parent, slot, child)) = stack.pop() {
            if !claimed.insert(child.clone()) {
                debug!("dropped repeated child edge {parent} -> {child}");
                dropped.insert((parent, slot));
                continue;
            }
            stack.extend(child_entries(nodes, &child));
        }
    }

    if dropped.is_empty() {
        return;
    }

    for node in nodes.values_mut() {
        let id = node.id.clone();
        let mut slot = 0usize;
        node.children.retain(|_| {
            let keep = !dropped.contains(&(id.clone(), slot));
            slot += 1;
            keep
        });
    }
}

fn child_entries(nodes: &IndexMap<String, Node>, id: &str) -> Vec<(String, usize, String)> {
    nodes
        .get(id)
        .map(|node| {
            node.children
                .iter()
                .enumerate()
                .rev()
                .map(|(slot, child)| (id.to_owned(), slot, child.clone()))
                .collect()
        })
        .unwrap_or_default()
}
