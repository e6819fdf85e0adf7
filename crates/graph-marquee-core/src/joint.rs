//! Edge joints: synthetic nodes that split a relation edge so it can be bent.
//!
//! Splitting edge `A -> B` inserts joint `J` and replaces the edge with `A -> J -> B`.
//! Removing `J` deletes both sub-edges and restores a single edge between its neighbours.
//! Neighbouring joints are rewired so their bookkeeping keeps pointing at live edges.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::keys::{EdgeKey, NodeKey, EDGE_JOINT_MARKER};

/// What a joint replaced and what it is connected to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JointConnection {
    /// Relation edge this joint belongs to.
    pub relation: EdgeKey,
    /// Edge that was split to create the joint.
    pub previous_edge: EdgeKey,
    /// Sub-edge `from -> joint`.
    pub sub_edge_in: EdgeKey,
    /// Sub-edge `joint -> to`.
    pub sub_edge_out: EdgeKey,
    pub from: NodeKey,
    pub to: NodeKey,
}

/// Result of [`EdgeJointRegistry::split_edge`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JointSplit {
    pub joint: NodeKey,
    pub sub_edge_in: EdgeKey,
    pub sub_edge_out: EdgeKey,
}

/// Graph edits needed to remove a joint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JointRemoval {
    pub joint: NodeKey,
    pub removed_edges: [EdgeKey; 2],
    pub restored_edge: EdgeKey,
    pub from: NodeKey,
    pub to: NodeKey,
}

/// Bookkeeping for every edge joint in a graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeJointRegistry {
    marker: String,
    next_id: u64,
    joints: BTreeMap<NodeKey, JointConnection>,
}

impl Default for EdgeJointRegistry {
    fn default() -> Self {
        Self::new(EDGE_JOINT_MARKER)
    }
}

impl EdgeJointRegistry {
    pub fn new(marker: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
            next_id: 0,
            joints: BTreeMap::new(),
        }
    }

    pub fn marker(&self) -> &str {
        &self.marker
    }

    pub fn len(&self) -> usize {
        self.joints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }

    pub fn contains(&self, joint: &NodeKey) -> bool {
        self.joints.contains_key(joint)
    }

    pub fn connection(&self, joint: &NodeKey) -> Option<&JointConnection> {
        self.joints.get(joint)
    }

    /// Relation an edge belongs to: itself unless it is a joint sub-edge.
    pub fn relation_of(&self, edge: &EdgeKey) -> EdgeKey {
        self.joints
            .values()
            .find(|c| c.sub_edge_in == *edge || c.sub_edge_out == *edge)
            .map(|c| c.relation.clone())
            .unwrap_or_else(|| edge.clone())
    }

    /// All joints currently splitting `relation`.
    pub fn relation_joints(&self, relation: &EdgeKey) -> Vec<NodeKey> {
        self.joints
            .iter()
            .filter(|(_, c)| c.relation == *relation)
            .map(|(k, _)| k.clone())
            .collect()
    }

    /// Register a joint splitting `edge` (`from -> to`).
    pub fn split_edge(&mut self, edge: &EdgeKey, from: &NodeKey, to: &NodeKey) -> JointSplit {
        self.split_edge_avoiding(edge, from, to, |_| false)
    }

    /// Like [`EdgeJointRegistry::split_edge`], never minting a key for which `taken` holds.
    pub fn split_edge_avoiding(
        &mut self,
        edge: &EdgeKey,
        from: &NodeKey,
        to: &NodeKey,
        taken: impl Fn(&NodeKey) -> bool,
    ) -> JointSplit {
        let relation = self.relation_of(edge);
        let joint = self.mint_joint_key(&taken);
        let n = self.next_id;
        let sub_edge_in = EdgeKey(format!("{}~{}a", relation, n));
        let sub_edge_out = EdgeKey(format!("{}~{}b", relation, n));

        // Neighbouring joints that referenced the split edge now see the new sub-edges.
        if let Some(left) = self.joints.get_mut(from) {
            if left.sub_edge_out == *edge {
                left.sub_edge_out = sub_edge_in.clone();
                left.to = joint.clone();
            }
        }
        if let Some(right) = self.joints.get_mut(to) {
            if right.sub_edge_in == *edge {
                right.sub_edge_in = sub_edge_out.clone();
                right.from = joint.clone();
            }
        }

        self.joints.insert(
            joint.clone(),
            JointConnection {
                relation,
                previous_edge: edge.clone(),
                sub_edge_in: sub_edge_in.clone(),
                sub_edge_out: sub_edge_out.clone(),
                from: from.clone(),
                to: to.clone(),
            },
        );
        debug!(joint = %joint, edge = %edge, "edge split");

        JointSplit {
            joint,
            sub_edge_in,
            sub_edge_out,
        }
    }

    /// Forget a joint and describe the edits that rejoin its neighbours.
    ///
    /// The restored edge takes the relation's own key once no joint remains on either
    /// side, and the split edge's key otherwise.
    pub fn remove_joint(&mut self, joint: &NodeKey) -> Option<JointRemoval> {
        let Some(conn) = self.joints.remove(joint) else {
            warn!(joint = %joint, "not a registered edge joint");
            return None;
        };

        let joined_to_joint =
            self.joints.contains_key(&conn.from) || self.joints.contains_key(&conn.to);
        let restored_edge = if joined_to_joint {
            conn.previous_edge.clone()
        } else {
            conn.relation.clone()
        };

        if let Some(left) = self.joints.get_mut(&conn.from) {
            if left.sub_edge_out == conn.sub_edge_in {
                left.sub_edge_out = restored_edge.clone();
                left.to = conn.to.clone();
            }
        }
        if let Some(right) = self.joints.get_mut(&conn.to) {
            if right.sub_edge_in == conn.sub_edge_out {
                right.sub_edge_in = restored_edge.clone();
                right.from = conn.from.clone();
            }
        }
        debug!(joint = %joint, restored = %restored_edge, "edge joint removed");

        Some(JointRemoval {
            joint: joint.clone(),
            removed_edges: [conn.sub_edge_in, conn.sub_edge_out],
            restored_edge,
            from: conn.from,
            to: conn.to,
        })
    }

    fn mint_joint_key(&mut self, taken: &impl Fn(&NodeKey) -> bool) -> NodeKey {
        loop {
            self.next_id += 1;
            let key = NodeKey(format!("{}_{}", self.marker, self.next_id));
            if !self.joints.contains_key(&key) && !taken(&key) {
                return key;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(s: &str) -> NodeKey {
        NodeKey::from(s)
    }

    #[test]
    fn split_mints_marked_keys() {
        let mut joints = EdgeJointRegistry::default();
        let split = joints.split_edge(&EdgeKey::from("rel"), &key("a"), &key("b"));

        assert!(split.joint.is_edge_joint(EDGE_JOINT_MARKER));
        assert_ne!(split.sub_edge_in, split.sub_edge_out);
        assert_eq!(joints.relation_of(&split.sub_edge_out), EdgeKey::from("rel"));
        assert_eq!(joints.relation_joints(&EdgeKey::from("rel")), vec![split.joint]);
    }

    #[test]
    fn removing_a_lone_joint_restores_the_relation() {
        let mut joints = EdgeJointRegistry::default();
        let rel = EdgeKey::from("rel");
        let split = joints.split_edge(&rel, &key("a"), &key("b"));

        let removal = joints.remove_joint(&split.joint).unwrap();
        assert_eq!(removal.restored_edge, rel);
        assert_eq!(removal.removed_edges, [split.sub_edge_in, split.sub_edge_out]);
        assert_eq!((removal.from, removal.to), (key("a"), key("b")));
        assert!(joints.is_empty());
    }

    #[test]
    fn chained_joints_stay_consistent_in_any_removal_order() {
        let rel = EdgeKey::from("rel");
        for first_left in [true, false] {
            let mut joints = EdgeJointRegistry::default();
            let j1 = joints.split_edge(&rel, &key("a"), &key("b"));
            let j2 = joints.split_edge(&j1.sub_edge_out, &j1.joint, &key("b"));

            // a -> j1 -> j2 -> b
            let c1 = joints.connection(&j1.joint).unwrap().clone();
            assert_eq!(c1.to, j2.joint);
            assert_eq!(c1.sub_edge_out, j2.sub_edge_in);

            let (first, second) = if first_left {
                (&j1.joint, &j2.joint)
            } else {
                (&j2.joint, &j1.joint)
            };
            let r1 = joints.remove_joint(first).unwrap();
            let survivor = joints.connection(second).unwrap().clone();
            // The survivor's bookkeeping points at the edge that was just restored.
            assert!(
                survivor.sub_edge_in == r1.restored_edge
                    || survivor.sub_edge_out == r1.restored_edge
            );

            let r2 = joints.remove_joint(second).unwrap();
            assert_eq!(r2.restored_edge, rel);
            assert_eq!((r2.from, r2.to), (key("a"), key("b")));
            assert!(joints.is_empty());
        }
    }

    #[test]
    fn unknown_joint_is_a_no_op() {
        let mut joints = EdgeJointRegistry::default();
        assert_eq!(joints.remove_joint(&key("edgeJoint_99")), None);
    }
}
