//! Serialisable snapshot of a node-link network: keyed nodes with positions and keyed edges.

use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{OverlayError, OverlayResult};
use crate::geometry::Point;
use crate::keys::{EdgeKey, NodeKey};

/// A node as exported by the host.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct NetworkNode {
    pub key: NodeKey,
    /// Human readable name.
    #[serde(default)]
    pub label: String,
    /// Canvas position.
    #[serde(default)]
    pub position: Point,
}

/// A directed edge between two nodes.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct NetworkEdge {
    pub key: EdgeKey,
    pub from: NodeKey,
    pub to: NodeKey,
    #[serde(default)]
    pub label: String,
}

/// Whole-network snapshot.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct NetworkGraph {
    pub nodes: Vec<NetworkNode>,
    pub edges: Vec<NetworkEdge>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl NetworkGraph {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn from_json(json: &str) -> OverlayResult<Self> {
        let graph: Self = serde_json::from_str(json)?;
        graph.validate()?;
        Ok(graph)
    }

    /// Reject duplicate node keys and edges with missing endpoints.
    pub fn validate(&self) -> OverlayResult<()> {
        let mut seen = std::collections::HashSet::new();
        for node in &self.nodes {
            if !seen.insert(&node.key) {
                return Err(OverlayError::DuplicateNode(node.key.to_string()));
            }
        }
        for edge in &self.edges {
            for end in [&edge.from, &edge.to] {
                if !seen.contains(end) {
                    return Err(OverlayError::DanglingEdge {
                        edge: edge.key.to_string(),
                        node: end.to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Convert to a petgraph StableDiGraph.
    /// Returns the graph and a mapping from node key to index.
    pub fn to_petgraph(
        &self,
    ) -> (
        StableDiGraph<NetworkNode, EdgeKey>,
        HashMap<NodeKey, NodeIndex>,
    ) {
        let mut graph = StableDiGraph::new();
        let mut key_to_index = HashMap::new();

        for node in &self.nodes {
            let idx = graph.add_node(node.clone());
            key_to_index.insert(node.key.clone(), idx);
        }

        for edge in &self.edges {
            if let (Some(&from), Some(&to)) =
                (key_to_index.get(&edge.from), key_to_index.get(&edge.to))
            {
                graph.add_edge(from, to, edge.key.clone());
            }
        }

        (graph, key_to_index)
    }
}
