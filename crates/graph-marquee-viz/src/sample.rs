//! Sample network for demonstration purposes.

use std::collections::HashMap;

use graph_marquee_core::{
    EdgeKey, MemoryGraph, NetworkEdge, NetworkGraph, NetworkNode, NodeKey, OverlayResult, Point,
};

const ASSETS: [(&str, &str); 8] = [
    ("cabinet-1", "Cabinet"),
    ("pump-1", "Pump 1"),
    ("pump-2", "Pump 2"),
    ("sensor-1", "Level sensor"),
    ("valve-1", "Valve"),
    ("pipe-1", "Pipe"),
    ("meter-1", "Flow meter"),
    ("panel-1", "Control panel"),
];

const RELATIONS: [(&str, &str, &str, &str); 9] = [
    ("rel-feeds-1", "cabinet-1", "pump-1", "feeds"),
    ("rel-feeds-2", "cabinet-1", "pump-2", "feeds"),
    ("rel-controls-1", "panel-1", "cabinet-1", "controls"),
    ("rel-measures-1", "sensor-1", "pump-1", "measures"),
    ("rel-connects-1", "pump-1", "pipe-1", "connects"),
    ("rel-connects-2", "pump-2", "pipe-1", "connects"),
    ("rel-connects-3", "pipe-1", "valve-1", "connects"),
    ("rel-measures-2", "meter-1", "pipe-1", "measures"),
    ("rel-controls-2", "panel-1", "valve-1", "controls"),
];

/// Create a small asset network laid out on a jittered ring.
pub fn create_sample_network() -> NetworkGraph {
    let radius = 220.0;
    let step = std::f32::consts::TAU / ASSETS.len() as f32;

    let nodes = ASSETS
        .iter()
        .enumerate()
        .map(|(i, (key, label))| {
            let angle = step * i as f32;
            let jitter = (rand_simple() - 0.5) * 40.0;
            NetworkNode {
                key: NodeKey::from(*key),
                label: label.to_string(),
                position: Point::new(
                    (radius + jitter) * angle.cos(),
                    (radius + jitter) * angle.sin(),
                ),
            }
        })
        .collect();

    let edges = RELATIONS
        .iter()
        .map(|(key, from, to, label)| NetworkEdge {
            key: EdgeKey::from(*key),
            from: NodeKey::from(*from),
            to: NodeKey::from(*to),
            label: label.to_string(),
        })
        .collect();

    let mut metadata = HashMap::new();
    metadata.insert("name".to_string(), "Sample asset network".to_string());
    metadata.insert("generated".to_string(), "demo".to_string());

    NetworkGraph {
        nodes,
        edges,
        metadata,
    }
}

/// Load `network` into a model and bend a few relations with edge joints.
///
/// `rel-connects-3` gets two chained joints so removing them in either order can be tried.
pub fn create_sample_model(network: &NetworkGraph, marker: &str) -> OverlayResult<MemoryGraph> {
    let mut model = MemoryGraph::from_network_with_marker(network, marker)?;

    let bends = [("rel-feeds-1", 0.5), ("rel-connects-3", 0.33)];
    for (relation, t) in bends {
        bend(&mut model, &EdgeKey::from(relation), t);
    }
    // The second joint lands on the outgoing half of the first split.
    let tail = model
        .joints()
        .relation_joints(&EdgeKey::from("rel-connects-3"))
        .first()
        .and_then(|joint| model.joints().connection(joint))
        .map(|connection| connection.sub_edge_out.clone());
    if let Some(tail) = tail {
        bend(&mut model, &tail, 0.5);
    }

    Ok(model)
}

fn bend(model: &mut MemoryGraph, edge: &EdgeKey, t: f32) {
    use graph_marquee_core::GraphEngine;

    let Some((_, from, to)) = model.edges().into_iter().find(|(k, _, _)| k == edge) else {
        return;
    };
    let (Some(a), Some(b)) = (model.node_position(&from), model.node_position(&to)) else {
        return;
    };
    // Offset perpendicular to the edge so the bend is visible.
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let position = Point::new(a.x + dx * t - dy * 0.15, a.y + dy * t + dx * 0.15);
    model.split_edge(edge, position);
}

/// Simple pseudo-random number generator for WASM compatibility.
pub fn rand_simple() -> f32 {
    use std::cell::Cell;
    thread_local! {
        static SEED: Cell<u64> = const { Cell::new(12345) };
    }
    SEED.with(|seed| {
        let mut s = seed.get();
        s ^= s << 13;
        s ^= s >> 7;
        s ^= s << 17;
        seed.set(s);
        (s as f32) / (u64::MAX as f32)
    })
}
