//! In-memory graph engine backed by petgraph, for headless hosts and tests.

use std::collections::HashMap;

use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableDiGraph};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::engine::GraphEngine;
use crate::error::{OverlayError, OverlayResult};
use crate::geometry::Point;
use crate::joint::{EdgeJointRegistry, JointRemoval, JointSplit};
use crate::keys::{EdgeKey, NodeKey};
use crate::network::{NetworkEdge, NetworkGraph, NetworkNode};

/// Pan/zoom of the canvas relative to the container.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub pan: Point,
    pub zoom: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            pan: Point::ZERO,
            zoom: 1.0,
        }
    }
}

impl Viewport {
    pub fn screen_to_canvas(&self, p: Point) -> Point {
        Point::new((p.x - self.pan.x) / self.zoom, (p.y - self.pan.y) / self.zoom)
    }

    pub fn canvas_to_screen(&self, p: Point) -> Point {
        Point::new(p.x * self.zoom + self.pan.x, p.y * self.zoom + self.pan.y)
    }
}

/// Keyed network with positions, selection and edge-joint bookkeeping.
#[derive(Debug, Clone, Default)]
pub struct MemoryGraph {
    graph: StableDiGraph<NetworkNode, EdgeKey>,
    index: HashMap<NodeKey, NodeIndex>,
    joints: EdgeJointRegistry,
    viewport: Viewport,
    selection: Vec<NodeKey>,
    redraws: u64,
}

impl MemoryGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a custom edge-joint marker for minted joint keys.
    pub fn with_joint_marker(marker: impl Into<String>) -> Self {
        Self {
            joints: EdgeJointRegistry::new(marker),
            ..Self::default()
        }
    }

    pub fn from_network(network: &NetworkGraph) -> OverlayResult<Self> {
        Self::from_network_with_marker(network, crate::keys::EDGE_JOINT_MARKER)
    }

    /// Like [`MemoryGraph::from_network`], minting joints with `marker`.
    pub fn from_network_with_marker(
        network: &NetworkGraph,
        marker: impl Into<String>,
    ) -> OverlayResult<Self> {
        network.validate()?;
        let (graph, index) = network.to_petgraph();
        Ok(Self {
            graph,
            index,
            joints: EdgeJointRegistry::new(marker),
            ..Self::default()
        })
    }

    /// Export the current nodes and edges.
    pub fn to_network(&self) -> NetworkGraph {
        NetworkGraph {
            nodes: self.graph.node_weights().cloned().collect(),
            edges: self
                .edges()
                .into_iter()
                .map(|(key, from, to)| NetworkEdge {
                    key,
                    from,
                    to,
                    label: String::new(),
                })
                .collect(),
            metadata: HashMap::new(),
        }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn joints(&self) -> &EdgeJointRegistry {
        &self.joints
    }

    pub fn selection(&self) -> &[NodeKey] {
        &self.selection
    }

    pub fn redraw_count(&self) -> u64 {
        self.redraws
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn label(&self, key: &NodeKey) -> Option<&str> {
        self.index.get(key).map(|&i| self.graph[i].label.as_str())
    }

    pub fn contains_node(&self, key: &NodeKey) -> bool {
        self.index.contains_key(key)
    }

    /// Add a node. Fails if the key is already taken.
    pub fn add_node(&mut self, key: impl Into<NodeKey>, position: Point) -> OverlayResult<()> {
        let key = key.into();
        if self.index.contains_key(&key) {
            return Err(OverlayError::DuplicateNode(key.to_string()));
        }
        let idx = self.graph.add_node(NetworkNode {
            key: key.clone(),
            label: key.to_string(),
            position,
        });
        self.index.insert(key, idx);
        Ok(())
    }

    /// Add a directed edge between existing nodes.
    pub fn add_edge(
        &mut self,
        key: impl Into<EdgeKey>,
        from: &NodeKey,
        to: &NodeKey,
    ) -> OverlayResult<()> {
        let key = key.into();
        let lookup = |node: &NodeKey| {
            self.index
                .get(node)
                .copied()
                .ok_or_else(|| OverlayError::DanglingEdge {
                    edge: key.to_string(),
                    node: node.to_string(),
                })
        };
        let (a, b) = (lookup(from)?, lookup(to)?);
        self.graph.add_edge(a, b, key);
        Ok(())
    }

    /// Remove a node and its incident edges. Returns false if it did not exist.
    pub fn remove_node(&mut self, key: &NodeKey) -> bool {
        let Some(idx) = self.index.remove(key) else {
            return false;
        };
        self.graph.remove_node(idx);
        self.selection.retain(|k| k != key);
        true
    }

    pub fn set_position(&mut self, key: &NodeKey, position: Point) -> bool {
        match self.index.get(key).and_then(|&i| self.graph.node_weight_mut(i)) {
            Some(node) => {
                node.position = position;
                true
            }
            None => false,
        }
    }

    /// `(key, from, to)` for every edge.
    pub fn edges(&self) -> Vec<(EdgeKey, NodeKey, NodeKey)> {
        self.graph
            .edge_indices()
            .filter_map(|e| {
                let (a, b) = self.graph.edge_endpoints(e)?;
                Some((
                    self.graph[e].clone(),
                    self.graph[a].key.clone(),
                    self.graph[b].key.clone(),
                ))
            })
            .collect()
    }

    fn find_edge(&self, key: &EdgeKey) -> Option<EdgeIndex> {
        self.graph.edge_indices().find(|&e| self.graph[e] == *key)
    }

    pub fn has_edge(&self, key: &EdgeKey) -> bool {
        self.find_edge(key).is_some()
    }

    /// Insert an edge joint at `position`, splitting `edge` in two.
    pub fn split_edge(&mut self, edge: &EdgeKey, position: Point) -> Option<JointSplit> {
        let e = self.find_edge(edge)?;
        let (a, b) = self.graph.edge_endpoints(e)?;
        let (from, to) = (self.graph[a].key.clone(), self.graph[b].key.clone());

        let index = &self.index;
        let split = self
            .joints
            .split_edge_avoiding(edge, &from, &to, |k| index.contains_key(k));
        self.graph.remove_edge(e);
        let j = self.graph.add_node(NetworkNode {
            key: split.joint.clone(),
            label: String::new(),
            position,
        });
        self.index.insert(split.joint.clone(), j);
        self.graph.add_edge(a, j, split.sub_edge_in.clone());
        self.graph.add_edge(j, b, split.sub_edge_out.clone());
        Some(split)
    }

    /// Remove an edge joint and reconnect its neighbours with a single edge.
    pub fn remove_edge_joint(&mut self, joint: &NodeKey) -> Option<JointRemoval> {
        if !self.contains_node(joint) {
            return None;
        }
        let removal = self.joints.remove_joint(joint)?;
        self.remove_node(joint);
        if let (Some(&a), Some(&b)) = (self.index.get(&removal.from), self.index.get(&removal.to))
        {
            self.graph.add_edge(a, b, removal.restored_edge.clone());
        }
        debug!(joint = %joint, "edge joint removed from graph");
        Some(removal)
    }
}

impl GraphEngine for MemoryGraph {
    fn screen_to_canvas(&self, point: Point) -> Point {
        self.viewport.screen_to_canvas(point)
    }

    fn node_position(&self, key: &NodeKey) -> Option<Point> {
        self.index.get(key).map(|&i| self.graph[i].position)
    }

    fn node_keys(&self) -> Vec<NodeKey> {
        self.graph
            .node_indices()
            .map(|i| self.graph[i].key.clone())
            .collect()
    }

    fn select_nodes(&mut self, keys: &[NodeKey]) {
        self.selection = keys
            .iter()
            .filter(|k| self.index.contains_key(*k))
            .cloned()
            .collect();
    }

    fn request_redraw(&mut self) {
        self.redraws += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> MemoryGraph {
        let mut g = MemoryGraph::new();
        g.add_node("a", Point::new(0.0, 0.0)).unwrap();
        g.add_node("b", Point::new(100.0, 0.0)).unwrap();
        g.add_node("c", Point::new(50.0, 80.0)).unwrap();
        g.add_edge("ab", &"a".into(), &"b".into()).unwrap();
        g.add_edge("bc", &"b".into(), &"c".into()).unwrap();
        g
    }

    #[test]
    fn viewport_transforms_are_inverse() {
        let vp = Viewport {
            pan: Point::new(30.0, -10.0),
            zoom: 2.0,
        };
        let p = Point::new(7.0, 9.0);
        assert_eq!(vp.screen_to_canvas(vp.canvas_to_screen(p)), p);
        assert_eq!(vp.screen_to_canvas(Point::new(30.0, -10.0)), Point::ZERO);
    }

    #[test]
    fn duplicate_and_dangling_inserts_fail() {
        let mut g = triangle();
        assert!(g.add_node("a", Point::ZERO).is_err());
        assert!(g.add_edge("x", &"a".into(), &"zzz".into()).is_err());
    }

    #[test]
    fn split_then_remove_restores_the_edge() {
        let mut g = triangle();
        let split = g.split_edge(&EdgeKey::from("ab"), Point::new(50.0, -20.0)).unwrap();
        assert_eq!(g.node_count(), 4);
        assert!(!g.has_edge(&EdgeKey::from("ab")));
        assert!(g.has_edge(&split.sub_edge_in));

        let removal = g.remove_edge_joint(&split.joint).unwrap();
        assert_eq!(removal.restored_edge, EdgeKey::from("ab"));
        assert_eq!(g.node_count(), 3);
        assert_eq!(g.edge_count(), 2);
        assert!(g
            .edges()
            .contains(&(EdgeKey::from("ab"), NodeKey::from("a"), NodeKey::from("b"))));
    }

    #[test]
    fn selection_drops_unknown_and_removed_nodes() {
        let mut g = triangle();
        g.select_nodes(&["a".into(), "ghost".into(), "c".into()]);
        assert_eq!(g.selection(), &[NodeKey::from("a"), NodeKey::from("c")]);

        g.remove_node(&"a".into());
        assert_eq!(g.selection(), &[NodeKey::from("c")]);
    }

    #[test]
    fn round_trips_through_network_snapshot() {
        let g = triangle();
        let copy = MemoryGraph::from_network(&g.to_network()).unwrap();
        assert_eq!(copy.node_count(), 3);
        assert_eq!(copy.edge_count(), 2);
        assert_eq!(copy.node_position(&"c".into()), Some(Point::new(50.0, 80.0)));
    }

    #[test]
    fn network_labels_and_custom_marker_survive_loading() {
        let mut network = triangle().to_network();
        network.nodes[0].label = "Pump".to_string();
        let mut g = MemoryGraph::from_network_with_marker(&network, "bend").unwrap();
        assert_eq!(g.label(&"a".into()), Some("Pump"));
        assert_eq!(g.label(&"ghost".into()), None);

        let split = g.split_edge(&"ab".into(), Point::new(50.0, 0.0)).unwrap();
        assert!(split.joint.is_edge_joint("bend"));
        assert_eq!(g.label(&split.joint), Some(""));
    }

    #[test]
    fn split_skips_joint_keys_already_loaded_as_nodes() {
        let mut g = triangle();
        g.add_node("edgeJoint_1", Point::new(10.0, 10.0)).unwrap();

        let split = g.split_edge(&"ab".into(), Point::new(50.0, 0.0)).unwrap();
        assert_eq!(split.joint, NodeKey::from("edgeJoint_2"));
        assert_eq!(g.node_count(), 5);

        let keys = g.node_keys();
        let loaded = keys.iter().filter(|k| k.as_str() == "edgeJoint_1").count();
        assert_eq!(loaded, 1);
        assert_eq!(g.node_position(&"edgeJoint_1".into()), Some(Point::new(10.0, 10.0)));
        assert_eq!(g.node_position(&split.joint), Some(Point::new(50.0, 0.0)));
    }
}
