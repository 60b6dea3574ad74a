//! Colour-coded picking and the selection set.
//!
//! Each geometry node is drawn in the picking pass with its id packed into
//! the colour channels. Reading back one pixel and unpacking it gives the id
//! of the nearest node under the cursor.

use std::collections::BTreeSet;

use crate::graph::SceneGraph;
use crate::node::{NodeHandle, NodeId, NodeKind};

/// Id decoded from the white background of the picking pass.
pub const NO_HIT_ID: u32 = 0x00FF_FFFF;

/// Clear colour of the picking pass; decodes to [`NO_HIT_ID`].
pub const NO_HIT_COLOR: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

/// Packs an id into 8-bit RGB channels.
///
/// R carries bits 0-7, G bits 8-15 and B bits 16-23. Bits above 23 are
/// dropped.
#[must_use]
pub fn encode_id_bytes(id: NodeId) -> [u8; 3] {
    let [r, g, b, _] = id.0.to_le_bytes();
    [r, g, b]
}

/// Packs an id into RGB channels normalized to `[0, 1]`.
#[must_use]
pub fn encode_id(id: NodeId) -> [f32; 3] {
    encode_id_bytes(id).map(|c| f32::from(c) / 255.0)
}

/// Unpacks 8-bit RGB channels back into an id.
#[must_use]
pub fn decode_color(r: u8, g: u8, b: u8) -> NodeId {
    NodeId(u32::from(r) | (u32::from(g) << 8) | (u32::from(b) << 16))
}

/// Outcome of resolving a picked pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickOutcome {
    /// Background, an unknown id, or a node that is not geometry.
    Miss,
    /// A geometry node had its selection flag toggled.
    Toggled {
        /// The geometry node that was hit.
        node: NodeHandle,
        /// Its new selection flag.
        selected: bool,
        /// The joint parent whose flag was mirrored, if any.
        joint: Option<NodeHandle>,
    },
}

/// The active selection set.
///
/// Membership tracks joints, not geometry leaves: picking a geometry node
/// under a joint adds or removes the joint.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    nodes: BTreeSet<NodeHandle>,
}

impl Selection {
    /// Creates an empty selection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns whether `handle` is in the set.
    #[must_use]
    pub fn contains(&self, handle: NodeHandle) -> bool {
        self.nodes.contains(&handle)
    }

    /// Iterates the selected handles in handle order.
    pub fn iter(&self) -> impl Iterator<Item = NodeHandle> + '_ {
        self.nodes.iter().copied()
    }

    /// Number of selected nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if nothing is selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Sets set membership of `handle`.
    pub fn set(&mut self, handle: NodeHandle, selected: bool) {
        if selected {
            self.nodes.insert(handle);
        } else {
            self.nodes.remove(&handle);
        }
    }

    /// Empties the set and clears the flags of every member.
    pub fn clear(&mut self, graph: &mut SceneGraph) {
        for handle in std::mem::take(&mut self.nodes) {
            if let Some(node) = graph.node_mut(handle) {
                node.set_selected(false);
            }
        }
    }

    /// Re-reads the selection flags of `handles` into set membership.
    pub fn sync_from_flags(&mut self, graph: &SceneGraph, handles: impl IntoIterator<Item = NodeHandle>) {
        for handle in handles {
            let selected = graph.node(handle).is_some_and(|n| n.is_selected());
            self.set(handle, selected);
        }
    }

    /// Resolves a read-back pixel under `root` and toggles the hit node.
    ///
    /// Only geometry nodes respond. When the geometry's parent is a joint,
    /// the joint's flag mirrors the geometry's new flag and the joint joins
    /// or leaves the set.
    pub fn pick(&mut self, graph: &mut SceneGraph, root: NodeHandle, pixel: [u8; 4]) -> PickOutcome {
        let id = decode_color(pixel[0], pixel[1], pixel[2]);
        if id.0 == NO_HIT_ID {
            return PickOutcome::Miss;
        }
        let Some(handle) = graph.find_by_id(root, id) else {
            log::debug!("picked unknown id {id:?}");
            return PickOutcome::Miss;
        };
        let Some(node) = graph.node_mut(handle) else {
            return PickOutcome::Miss;
        };
        if !node.kind().is_drawable() {
            return PickOutcome::Miss;
        }

        let selected = !node.is_selected();
        node.set_selected(selected);
        let parent = node.parent();

        let joint = parent.filter(|&p| {
            graph
                .node(p)
                .is_some_and(|n| matches!(n.kind(), NodeKind::Joint(_)))
        });
        if let Some(joint) = joint {
            if let Some(joint_node) = graph.node_mut(joint) {
                joint_node.set_selected(selected);
            }
            self.set(joint, selected);
        }

        log::debug!("picked {id:?}: selected = {selected}");
        PickOutcome::Toggled {
            node: handle,
            selected,
            joint,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{Geometry, JointLimits, Material};
    use proptest::prelude::*;

    fn geometry() -> NodeKind {
        NodeKind::Geometry(Geometry {
            mesh_id: "cube".into(),
            material: Material::default(),
        })
    }

    fn pixel(id: u32) -> [u8; 4] {
        let [r, g, b] = encode_id_bytes(NodeId(id));
        [r, g, b, 255]
    }

    #[test]
    fn test_encode_channel_layout() {
        assert_eq!(encode_id_bytes(NodeId(0x0012_3456)), [0x56, 0x34, 0x12]);
        let [r, g, b] = encode_id(NodeId(0x00FF_00FF));
        assert_eq!((r, g, b), (1.0, 0.0, 1.0));
    }

    #[test]
    fn test_background_is_no_hit() {
        let [r, g, b, _] = NO_HIT_COLOR.map(|c| (c * 255.0) as u8);
        assert_eq!(decode_color(r, g, b), NodeId(NO_HIT_ID));
    }

    #[test]
    fn test_pick_toggles_geometry_and_joint_together() {
        let mut graph = SceneGraph::new();
        let root = graph.create_node("root", NodeKind::Group).unwrap();
        let joint = graph
            .create_node("shoulder", NodeKind::Joint(JointLimits::default()))
            .unwrap();
        let arm = graph.create_node("arm", geometry()).unwrap();
        graph.add_child(root, joint).unwrap();
        graph.add_child(joint, arm).unwrap();
        let arm_id = graph.node(arm).unwrap().id().0;

        let mut selection = Selection::new();
        let outcome = selection.pick(&mut graph, root, pixel(arm_id));
        assert_eq!(
            outcome,
            PickOutcome::Toggled {
                node: arm,
                selected: true,
                joint: Some(joint)
            }
        );
        assert!(graph.node(arm).unwrap().is_selected());
        assert!(graph.node(joint).unwrap().is_selected());
        assert!(selection.contains(joint));
        assert!(!selection.contains(arm));

        selection.pick(&mut graph, root, pixel(arm_id));
        assert!(!graph.node(arm).unwrap().is_selected());
        assert!(!graph.node(joint).unwrap().is_selected());
        assert!(selection.is_empty());
    }

    #[test]
    fn test_pick_misses() {
        let mut graph = SceneGraph::new();
        let root = graph.create_node("root", NodeKind::Group).unwrap();
        let joint = graph
            .create_node("hip", NodeKind::Joint(JointLimits::default()))
            .unwrap();
        graph.add_child(root, joint).unwrap();

        let mut selection = Selection::new();
        assert_eq!(selection.pick(&mut graph, root, [255, 255, 255, 255]), PickOutcome::Miss);
        assert_eq!(selection.pick(&mut graph, root, pixel(4242)), PickOutcome::Miss);
        // Joints are not drawable and never respond to a pick directly.
        assert_eq!(selection.pick(&mut graph, root, pixel(1)), PickOutcome::Miss);
        assert!(!graph.node(joint).unwrap().is_selected());
        assert!(selection.is_empty());
    }

    #[test]
    fn test_pick_geometry_under_group_is_not_added_to_set() {
        let mut graph = SceneGraph::new();
        let root = graph.create_node("root", NodeKind::Group).unwrap();
        let torso = graph.create_node("torso", geometry()).unwrap();
        graph.add_child(root, torso).unwrap();

        let mut selection = Selection::new();
        let outcome = selection.pick(&mut graph, root, pixel(1));
        assert!(matches!(outcome, PickOutcome::Toggled { joint: None, selected: true, .. }));
        assert!(graph.node(torso).unwrap().is_selected());
        assert!(selection.is_empty());
    }

    proptest! {
        #[test]
        fn prop_decode_inverts_encode(id in 0u32..(1 << 24)) {
            let [r, g, b] = encode_id_bytes(NodeId(id));
            prop_assert_eq!(decode_color(r, g, b), NodeId(id));
        }

        #[test]
        fn prop_normalized_color_round_trips(id in 0u32..(1 << 24)) {
            let [r, g, b] = encode_id(NodeId(id)).map(|c| (c * 255.0).round() as u8);
            prop_assert_eq!(decode_color(r, g, b), NodeId(id));
        }
    }
}
