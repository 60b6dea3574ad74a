//! Linear undo/redo over the pose of selected nodes.
//!
//! Each history entry is the set of [`NodeSnapshot`]s taken of whatever was
//! selected at the time. Snapshots are keyed by [`NodeId`] and resolved
//! through the graph when applied; ids that no longer resolve are skipped.

use glam::Mat4;

use crate::graph::SceneGraph;
use crate::node::{NodeHandle, NodeId, SceneNode};
use crate::pick::Selection;

/// Point-in-time copy of one node's pose and selection flag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeSnapshot {
    /// The node this snapshot belongs to.
    pub id: NodeId,
    /// Accumulated y angle.
    pub angle_y: f32,
    /// Accumulated z angle.
    pub angle_z: f32,
    /// Selection flag.
    pub selected: bool,
    /// Local transform.
    pub transform: Mat4,
}

impl NodeSnapshot {
    /// Captures the current state of `node`.
    #[must_use]
    pub fn capture(node: &SceneNode) -> Self {
        Self {
            id: node.id(),
            angle_y: node.angle_y(),
            angle_z: node.angle_z(),
            selected: node.is_selected(),
            transform: node.transform(),
        }
    }

    /// Writes this snapshot back onto `node`.
    pub fn apply(&self, node: &mut SceneNode) {
        node.set_angles(self.angle_y, self.angle_z);
        node.set_selected(self.selected);
        node.set_transform(self.transform);
    }
}

/// One history entry.
pub type SnapshotSet = Vec<NodeSnapshot>;

/// Undo and redo stacks plus the buffer captured at gesture start.
#[derive(Debug, Clone, Default)]
pub struct History {
    current: SnapshotSet,
    pending: bool,
    undo_stack: Vec<SnapshotSet>,
    redo_stack: Vec<SnapshotSet>,
}

impl History {
    /// Creates empty history.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn capture_selection(graph: &SceneGraph, selection: &Selection) -> SnapshotSet {
        selection
            .iter()
            .filter_map(|handle| graph.node(handle).map(NodeSnapshot::capture))
            .collect()
    }

    /// Captures every selected node into the current buffer.
    ///
    /// Called when a gesture starts, before anything is mutated.
    pub fn save_state(&mut self, graph: &SceneGraph, selection: &Selection) {
        self.current = Self::capture_selection(graph, selection);
        self.pending = true;
    }

    /// Ends the gesture started by [`Self::save_state`].
    ///
    /// Ends the pending gesture. Any gesture drops all redo history; the
    /// saved buffer is pushed onto the undo stack only if something was
    /// selected when it started.
    ///
    /// Returns whether an undo entry was pushed.
    pub fn commit(&mut self) -> bool {
        if !std::mem::take(&mut self.pending) {
            return false;
        }
        self.redo_stack.clear();
        let entry = std::mem::take(&mut self.current);
        if entry.is_empty() {
            return false;
        }
        log::debug!("history: pushed {} snapshots", entry.len());
        self.undo_stack.push(entry);
        true
    }

    /// Restores the most recent undo entry. The live state of the current
    /// selection is pushed onto the redo stack first.
    ///
    /// Returns the handles that were restored; empty if there was nothing to
    /// undo.
    pub fn undo(&mut self, graph: &mut SceneGraph, root: NodeHandle, selection: &mut Selection) -> Vec<NodeHandle> {
        let Some(entry) = self.undo_stack.pop() else {
            return Vec::new();
        };
        self.redo_stack.push(Self::capture_selection(graph, selection));
        Self::restore(&entry, graph, root, selection)
    }

    /// Restores the most recent redo entry. The live state of the current
    /// selection is pushed onto the undo stack first.
    pub fn redo(&mut self, graph: &mut SceneGraph, root: NodeHandle, selection: &mut Selection) -> Vec<NodeHandle> {
        let Some(entry) = self.redo_stack.pop() else {
            return Vec::new();
        };
        self.undo_stack.push(Self::capture_selection(graph, selection));
        Self::restore(&entry, graph, root, selection)
    }

    fn restore(
        entry: &[NodeSnapshot],
        graph: &mut SceneGraph,
        root: NodeHandle,
        selection: &mut Selection,
    ) -> Vec<NodeHandle> {
        let mut restored = Vec::with_capacity(entry.len());
        for snapshot in entry {
            let Some(handle) = graph.find_by_id(root, snapshot.id) else {
                log::debug!("history: {:?} no longer in the scene", snapshot.id);
                continue;
            };
            if let Some(node) = graph.node_mut(handle) {
                snapshot.apply(node);
                restored.push(handle);
            }
        }
        selection.sync_from_flags(graph, restored.iter().copied());
        restored
    }

    /// Drops both stacks and any pending gesture.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// The undo stack, oldest entry first.
    #[must_use]
    pub fn undo_entries(&self) -> &[SnapshotSet] {
        &self.undo_stack
    }

    /// The redo stack, oldest entry first.
    #[must_use]
    pub fn redo_entries(&self) -> &[SnapshotSet] {
        &self.redo_stack
    }

    /// Returns true if [`Self::undo`] would do something.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Returns true if [`Self::redo`] would do something.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::joint::try_rotate_joint;
    use crate::node::{AngleRange, Axis, JointLimits, NodeKind};

    fn setup() -> (SceneGraph, NodeHandle, NodeHandle, Selection) {
        let mut graph = SceneGraph::new();
        let root = graph.create_node("root", NodeKind::Group).unwrap();
        let limits = JointLimits {
            y: AngleRange::new(-90.0, 0.0, 90.0),
            z: AngleRange::new(-90.0, 0.0, 90.0),
        };
        let joint = graph.create_node("a", NodeKind::Joint(limits)).unwrap();
        graph.add_child(root, joint).unwrap();
        graph.node_mut(joint).unwrap().set_selected(true);
        let mut selection = Selection::new();
        selection.set(joint, true);
        (graph, root, joint, selection)
    }

    #[test]
    fn test_undo_redo_round_trip() {
        let (mut graph, root, a, mut selection) = setup();
        let mut history = History::new();

        history.save_state(&graph, &selection);
        assert!(try_rotate_joint(graph.node_mut(a).unwrap(), Axis::Z, 30.0));
        assert!(history.commit());
        assert_eq!(history.undo_entries().len(), 1);
        assert_eq!(history.undo_entries()[0][0].angle_z, 0.0);
        assert_eq!(history.undo_entries()[0][0].transform, Mat4::IDENTITY);

        assert_eq!(history.undo(&mut graph, root, &mut selection), vec![a]);
        assert_eq!(graph.node(a).unwrap().angle_z(), 0.0);
        assert_eq!(graph.node(a).unwrap().transform(), Mat4::IDENTITY);
        assert_eq!(history.redo_entries().len(), 1);
        assert_eq!(history.redo_entries()[0][0].angle_z, 30.0);

        history.redo(&mut graph, root, &mut selection);
        assert_eq!(graph.node(a).unwrap().angle_z(), 30.0);
        assert!(history.can_undo());
        assert!(!history.can_redo());
    }

    #[test]
    fn test_empty_stacks_are_no_ops() {
        let (mut graph, root, a, mut selection) = setup();
        let mut history = History::new();
        assert!(history.undo(&mut graph, root, &mut selection).is_empty());
        assert!(history.redo(&mut graph, root, &mut selection).is_empty());
        assert!(!history.can_redo());
        assert_eq!(graph.node(a).unwrap().angle_z(), 0.0);
    }

    #[test]
    fn test_commit_without_gesture_or_selection() {
        let (graph, _, _, selection) = setup();
        let mut history = History::new();
        assert!(!history.commit());

        history.save_state(&graph, &Selection::new());
        assert!(!history.commit());

        history.save_state(&graph, &selection);
        assert!(history.commit());
        assert!(!history.commit());
    }

    #[test]
    fn test_new_gesture_clears_redo() {
        let (mut graph, root, a, mut selection) = setup();
        let mut history = History::new();
        history.save_state(&graph, &selection);
        graph.node_mut(a).unwrap().rotate(Axis::Z, 10.0);
        history.commit();
        history.undo(&mut graph, root, &mut selection);
        assert!(history.can_redo());

        history.save_state(&graph, &selection);
        graph.node_mut(a).unwrap().rotate(Axis::Z, 5.0);
        history.commit();
        assert!(!history.can_redo());
    }

    #[test]
    fn test_empty_gesture_clears_redo() {
        let (mut graph, root, a, mut selection) = setup();
        let mut history = History::new();
        history.save_state(&graph, &selection);
        graph.node_mut(a).unwrap().rotate(Axis::Z, 10.0);
        history.commit();
        history.undo(&mut graph, root, &mut selection);
        assert!(history.can_redo());

        history.save_state(&graph, &Selection::new());
        assert!(!history.commit());
        assert!(!history.can_redo());
        assert!(!history.can_undo());

        history.commit();
        assert!(!history.can_undo());
    }

    #[test]
    fn test_restore_resyncs_selection() {
        let (mut graph, root, a, mut selection) = setup();
        let mut history = History::new();
        history.save_state(&graph, &selection);
        history.commit();

        graph.node_mut(a).unwrap().set_selected(false);
        selection.set(a, false);
        history.undo(&mut graph, root, &mut selection);
        assert!(graph.node(a).unwrap().is_selected());
        assert!(selection.contains(a));
    }

    #[test]
    fn test_detached_nodes_are_skipped() {
        let (mut graph, root, a, mut selection) = setup();
        let mut history = History::new();
        history.save_state(&graph, &selection);
        graph.node_mut(a).unwrap().rotate(Axis::Z, 10.0);
        history.commit();

        graph.remove_child(root, a).unwrap();
        assert!(history.undo(&mut graph, root, &mut selection).is_empty());
        assert_eq!(graph.node(a).unwrap().angle_z(), 10.0);
    }
}
