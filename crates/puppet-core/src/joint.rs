//! Limit-checked joint rotation.
//!
//! A request that would push a joint's accumulated angle outside its range
//! is dropped whole; there is no clamping to the boundary.

use crate::graph::SceneGraph;
use crate::node::{Axis, NodeHandle, NodeId, SceneNode};
use crate::pick::Selection;

/// Rotates `node` by `delta` degrees about `axis` if it is a joint and the
/// resulting angle stays within that axis' range.
///
/// Returns whether the rotation was applied.
pub fn try_rotate_joint(node: &mut SceneNode, axis: Axis, delta: f32) -> bool {
    let Some(range) = node.joint_limits().and_then(|limits| limits.range(axis)) else {
        return false;
    };
    if !delta.is_finite() || !range.contains(node.angle(axis) + delta) {
        return false;
    }
    node.rotate(axis, delta)
}

/// Generic joint drag: rotates every selected joint about z.
///
/// Each joint is checked on its own, so a multi-selection may be applied
/// partially. Returns how many joints moved.
pub fn drag_selected_joints(graph: &mut SceneGraph, selection: &Selection, delta: f32) -> usize {
    selection
        .iter()
        .filter(|&handle| {
            graph
                .node_mut(handle)
                .is_some_and(|node| try_rotate_joint(node, Axis::Z, delta))
        })
        .count()
}

/// Head gesture: rotates the parent joint of the node `head_id` about y.
///
/// Applies only while the head node itself is selected and its parent is a
/// joint. The selection set is not consulted.
pub fn drag_head_joint(graph: &mut SceneGraph, root: NodeHandle, head_id: NodeId, delta: f32) -> bool {
    let Some(head) = graph.find_by_id(root, head_id) else {
        return false;
    };
    let Some((parent, selected)) = graph.node(head).and_then(|n| Some((n.parent()?, n.is_selected()))) else {
        return false;
    };
    if !selected {
        return false;
    }
    graph
        .node_mut(parent)
        .is_some_and(|joint| try_rotate_joint(joint, Axis::Y, delta))
}
