//! [`GraphEngine`] over an `egui_graphs` view, backed by a keyed [`MemoryGraph`] model.
//!
//! The model owns keys, edges and edge joints. The view is the `egui_graphs::Graph`
//! the layout animates; it is rebuilt from the model after structural edits, with
//! live positions pulled back first so nothing jumps.

use std::collections::HashMap;

use egui::Pos2;
use egui_graphs::{Graph, MetadataFrame};
use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use tracing::debug;

use graph_marquee_core::{
    EdgeKey, GraphEngine, JointRemoval, JointSplit, MemoryGraph, NodeKey, Point,
};

/// Keyed graph engine driving an `egui_graphs` view.
pub struct EguiGraphEngine {
    model: MemoryGraph,
    view: Graph<(), ()>,
    key_to_index: HashMap<NodeKey, NodeIndex>,
    index_to_key: HashMap<NodeIndex, NodeKey>,
    /// Pan/zoom of the last rendered frame.
    meta: Option<MetadataFrame>,
    redraw_requested: bool,
}

impl EguiGraphEngine {
    pub fn new(model: MemoryGraph) -> Self {
        let mut engine = Self {
            model,
            view: Graph::from(&StableDiGraph::<(), ()>::new()),
            key_to_index: HashMap::new(),
            index_to_key: HashMap::new(),
            meta: None,
            redraw_requested: false,
        };
        engine.rebuild_view();
        engine
    }

    pub fn model(&self) -> &MemoryGraph {
        &self.model
    }

    pub fn view(&self) -> &Graph<(), ()> {
        &self.view
    }

    /// Mutable view for `GraphView` rendering.
    pub fn view_mut(&mut self) -> &mut Graph<(), ()> {
        &mut self.view
    }

    /// Store the pan/zoom `egui_graphs` used for the frame just drawn.
    pub fn update_frame(&mut self, meta: MetadataFrame) {
        self.meta = Some(meta);
    }

    pub fn frame(&self) -> Option<&MetadataFrame> {
        self.meta.as_ref()
    }

    /// Returns and clears the pending redraw request.
    pub fn take_redraw_request(&mut self) -> bool {
        std::mem::take(&mut self.redraw_requested)
    }

    pub fn key_of(&self, idx: NodeIndex) -> Option<&NodeKey> {
        self.index_to_key.get(&idx)
    }

    pub fn index_of(&self, key: &NodeKey) -> Option<NodeIndex> {
        self.key_to_index.get(key).copied()
    }

    pub fn label(&self, key: &NodeKey) -> Option<&str> {
        self.model.label(key)
    }

    /// Canvas position to widget-relative screen position.
    pub fn canvas_to_screen(&self, point: Point) -> Point {
        match &self.meta {
            Some(meta) => from_pos(meta.canvas_to_screen_pos(to_pos(point))),
            None => point,
        }
    }

    /// Nearest node within `radius` canvas units of `canvas`.
    pub fn node_at(&self, canvas: Point, radius: f32) -> Option<NodeKey> {
        let target = to_pos(canvas);
        self.view
            .nodes_iter()
            .map(|(idx, node)| (idx, node.location().distance(target)))
            .filter(|&(_, d)| d <= radius)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .and_then(|(idx, _)| self.index_to_key.get(&idx).cloned())
    }

    /// Keys of nodes flagged selected in the view, in model order.
    pub fn selected_keys(&self) -> Vec<NodeKey> {
        self.model
            .node_keys()
            .into_iter()
            .filter(|key| {
                self.index_of(key)
                    .and_then(|idx| self.view.node(idx))
                    .is_some_and(|node| node.selected())
            })
            .collect()
    }

    /// `(key, from, to)` for every edge in the model.
    pub fn edges(&self) -> Vec<(EdgeKey, NodeKey, NodeKey)> {
        self.model.edges()
    }

    /// Split `edge` with a new joint at the midpoint of its endpoints.
    pub fn split_edge(&mut self, edge: &EdgeKey) -> Option<JointSplit> {
        self.pull_positions();
        let (_, from, to) = self.model.edges().into_iter().find(|(k, _, _)| k == edge)?;
        let a = self.model.node_position(&from)?;
        let b = self.model.node_position(&to)?;
        let mid = Point::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0);
        let split = self.model.split_edge(edge, mid)?;
        self.rebuild_view();
        debug!(edge = %edge, joint = %split.joint, "edge split");
        Some(split)
    }

    /// Remove an edge joint and reconnect its neighbours.
    pub fn remove_edge_joint(&mut self, joint: &NodeKey) -> Option<JointRemoval> {
        self.pull_positions();
        let removal = self.model.remove_edge_joint(joint)?;
        self.rebuild_view();
        self.redraw_requested = true;
        Some(removal)
    }

    /// Copy the view's current node locations into the model.
    fn pull_positions(&mut self) {
        for (idx, node) in self.view.nodes_iter() {
            if let Some(key) = self.index_to_key.get(&idx) {
                self.model.set_position(key, from_pos(node.location()));
            }
        }
    }

    fn rebuild_view(&mut self) {
        let mut structure = StableDiGraph::<(), ()>::new();
        self.key_to_index.clear();
        self.index_to_key.clear();

        for key in self.model.node_keys() {
            let idx = structure.add_node(());
            self.key_to_index.insert(key.clone(), idx);
            self.index_to_key.insert(idx, key);
        }
        for (_, from, to) in self.model.edges() {
            if let (Some(&a), Some(&b)) = (self.key_to_index.get(&from), self.key_to_index.get(&to))
            {
                structure.add_edge(a, b, ());
            }
        }

        let mut view = Graph::from(&structure);
        for (key, &idx) in &self.key_to_index {
            let position = self.model.node_position(key).unwrap_or_default();
            let label = self.model.label(key).unwrap_or_default().to_string();
            let selected = self.model.selection().contains(key);
            if let Some(node) = view.node_mut(idx) {
                node.set_location(to_pos(position));
                node.set_label(label);
                node.set_selected(selected);
            }
        }
        self.view = view;
    }
}

impl GraphEngine for EguiGraphEngine {
    fn screen_to_canvas(&self, point: Point) -> Point {
        match &self.meta {
            Some(meta) => from_pos(meta.screen_to_canvas_pos(to_pos(point))),
            None => point,
        }
    }

    fn node_position(&self, key: &NodeKey) -> Option<Point> {
        let idx = self.index_of(key)?;
        self.view.node(idx).map(|node| from_pos(node.location()))
    }

    fn node_keys(&self) -> Vec<NodeKey> {
        self.model.node_keys()
    }

    fn select_nodes(&mut self, keys: &[NodeKey]) {
        self.model.select_nodes(keys);
        let indices: Vec<NodeIndex> = self.view.nodes_iter().map(|(idx, _)| idx).collect();
        for idx in indices {
            let selected = self
                .index_to_key
                .get(&idx)
                .is_some_and(|key| keys.contains(key));
            if let Some(node) = self.view.node_mut(idx) {
                node.set_selected(selected);
            }
        }
    }

    fn request_redraw(&mut self) {
        self.redraw_requested = true;
    }
}

pub(crate) fn to_pos(p: Point) -> Pos2 {
    Pos2::new(p.x, p.y)
}

pub(crate) fn from_pos(p: Pos2) -> Point {
    Point::new(p.x, p.y)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> EguiGraphEngine {
        let mut g = MemoryGraph::new();
        g.add_node("a", Point::new(0.0, 0.0)).unwrap();
        g.add_node("b", Point::new(100.0, 0.0)).unwrap();
        g.add_node("c", Point::new(50.0, 80.0)).unwrap();
        g.add_edge("ab", &"a".into(), &"b".into()).unwrap();
        g.add_edge("bc", &"b".into(), &"c".into()).unwrap();
        EguiGraphEngine::new(g)
    }

    #[test]
    fn view_mirrors_model_keys_and_positions() {
        let e = engine();
        assert_eq!(e.view().node_count(), 3);
        assert_eq!(e.view().edge_count(), 2);
        assert_eq!(e.node_position(&"b".into()), Some(Point::new(100.0, 0.0)));
        let idx = e.index_of(&"c".into()).unwrap();
        assert_eq!(e.key_of(idx), Some(&NodeKey::from("c")));
    }

    #[test]
    fn screen_to_canvas_is_identity_before_first_frame() {
        let e = engine();
        let p = Point::new(12.0, 34.0);
        assert_eq!(e.screen_to_canvas(p), p);
        assert_eq!(e.canvas_to_screen(p), p);
    }

    #[test]
    fn select_nodes_replaces_view_selection() {
        let mut e = engine();
        e.select_nodes(&["a".into(), "c".into()]);
        assert_eq!(e.selected_keys(), vec![NodeKey::from("a"), NodeKey::from("c")]);
        e.select_nodes(&["b".into()]);
        assert_eq!(e.selected_keys(), vec![NodeKey::from("b")]);
        e.select_nodes(&[]);
        assert!(e.selected_keys().is_empty());
    }

    #[test]
    fn node_at_picks_nearest_within_radius() {
        let e = engine();
        assert_eq!(e.node_at(Point::new(3.0, 4.0), 8.0), Some("a".into()));
        assert_eq!(e.node_at(Point::new(97.0, 1.0), 8.0), Some("b".into()));
        assert_eq!(e.node_at(Point::new(50.0, 30.0), 8.0), None);
    }

    #[test]
    fn split_then_remove_joint_rebuilds_view() {
        let mut e = engine();
        let split = e.split_edge(&"ab".into()).unwrap();
        assert_eq!(e.view().node_count(), 4);
        assert_eq!(e.view().edge_count(), 3);
        assert_eq!(e.node_position(&split.joint), Some(Point::new(50.0, 0.0)));

        e.take_redraw_request();
        let removal = e.remove_edge_joint(&split.joint).unwrap();
        assert_eq!(removal.restored_edge, EdgeKey::from("ab"));
        assert_eq!(e.view().node_count(), 3);
        assert_eq!(e.view().edge_count(), 2);
        assert!(e.index_of(&split.joint).is_none());
        assert!(e.take_redraw_request());
        assert!(!e.take_redraw_request());
    }

    #[test]
    fn removing_a_plain_node_key_is_refused() {
        let mut e = engine();
        assert!(e.remove_edge_joint(&"a".into()).is_none());
        assert_eq!(e.view().node_count(), 3);
    }
}
