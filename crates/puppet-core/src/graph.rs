//! Arena-backed scene graph.
//!
//! Nodes live in slots addressed by [`NodeHandle`]. Parent links are plain
//! handles, so detaching a subtree never leaves a dangling reference. Ids are
//! handed out by an [`IdAllocator`] owned by the graph.

use std::collections::HashMap;

use glam::Mat4;

use crate::error::{PuppetError, Result};
use crate::node::{is_invertible, NodeHandle, NodeId, NodeKind, SceneNode};
use crate::pick::NO_HIT_ID;

/// Monotonic id allocator.
///
/// Ids stay strictly below [`NO_HIT_ID`] so that every node remains
/// addressable by the picking pass.
#[derive(Debug, Clone, Default)]
pub struct IdAllocator {
    next: u32,
}

impl IdAllocator {
    /// Creates an allocator whose first id is zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the next id, or an error once the picking id space is used up.
    pub fn allocate(&mut self) -> Result<NodeId> {
        if self.next >= NO_HIT_ID {
            return Err(PuppetError::IdSpaceExhausted);
        }
        let id = NodeId(self.next);
        self.next += 1;
        Ok(id)
    }
}

/// The node arena plus the id lookup index.
#[derive(Debug, Default)]
pub struct SceneGraph {
    slots: Vec<Option<SceneNode>>,
    ids: IdAllocator,
    /// Memo of id -> handle for nodes already visited by [`Self::find_by_id`].
    id_index: HashMap<NodeId, NodeHandle>,
}

impl SceneGraph {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a detached node with a freshly allocated id.
    pub fn create_node(&mut self, name: impl Into<String>, kind: NodeKind) -> Result<NodeHandle> {
        let id = self.ids.allocate()?;
        let slot = u32::try_from(self.slots.len()).map_err(|_| PuppetError::IdSpaceExhausted)?;
        let handle = NodeHandle(slot);
        self.slots.push(Some(SceneNode::new(id, name.into(), kind)));
        Ok(handle)
    }

    /// Returns the node behind `handle`.
    #[must_use]
    pub fn node(&self, handle: NodeHandle) -> Option<&SceneNode> {
        self.slots.get(handle.0 as usize)?.as_ref()
    }

    /// Returns the node behind `handle` mutably.
    #[must_use]
    pub fn node_mut(&mut self, handle: NodeHandle) -> Option<&mut SceneNode> {
        self.slots.get_mut(handle.0 as usize)?.as_mut()
    }

    fn get(&self, handle: NodeHandle) -> Result<&SceneNode> {
        self.node(handle).ok_or(PuppetError::NodeNotFound(handle))
    }

    fn get_mut(&mut self, handle: NodeHandle) -> Result<&mut SceneNode> {
        self.node_mut(handle).ok_or(PuppetError::NodeNotFound(handle))
    }

    /// Number of live nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    /// Returns true if the graph holds no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the local transform of `handle`.
    #[must_use]
    pub fn transform(&self, handle: NodeHandle) -> Option<Mat4> {
        self.node(handle).map(SceneNode::transform)
    }

    /// Returns the cached inverse of the local transform of `handle`.
    #[must_use]
    pub fn inverse_transform(&self, handle: NodeHandle) -> Option<Mat4> {
        self.node(handle).map(SceneNode::inverse_transform)
    }

    /// Replaces the local transform of `handle`.
    ///
    /// The matrix must be finite and invertible, since the cached inverse is
    /// kept alongside it.
    pub fn set_transform(&mut self, handle: NodeHandle, transform: Mat4) -> Result<()> {
        if !transform.is_finite() {
            return Err(PuppetError::NonFiniteTransform(handle));
        }
        let node = self.get_mut(handle)?;
        if !is_invertible(&transform) {
            return Err(PuppetError::SingularTransform(node.name().to_string()));
        }
        node.set_transform(transform);
        Ok(())
    }

    /// Appends `child` to the children of `parent`.
    pub fn add_child(&mut self, parent: NodeHandle, child: NodeHandle) -> Result<()> {
        self.get(parent)?;
        if self.get(child)?.parent.is_some() {
            return Err(PuppetError::AlreadyParented(child));
        }
        if self.is_ancestor_or_self(child, parent) {
            return Err(PuppetError::WouldCreateCycle { parent, child });
        }
        self.get_mut(child)?.parent = Some(parent);
        self.get_mut(parent)?.children.push(child);
        Ok(())
    }

    /// Detaches `child` from `parent`; the child becomes the root of its own
    /// subtree. Returns false if it was not a child of `parent`.
    pub fn remove_child(&mut self, parent: NodeHandle, child: NodeHandle) -> Result<bool> {
        let children = &mut self.get_mut(parent)?.children;
        let Some(pos) = children.iter().position(|&c| c == child) else {
            return Ok(false);
        };
        children.remove(pos);
        self.get_mut(child)?.parent = None;
        Ok(true)
    }

    /// Returns whether `ancestor` is `node` or one of its ancestors.
    #[must_use]
    pub fn is_ancestor_or_self(&self, ancestor: NodeHandle, node: NodeHandle) -> bool {
        let mut current = Some(node);
        while let Some(handle) = current {
            if handle == ancestor {
                return true;
            }
            current = self.node(handle).and_then(SceneNode::parent);
        }
        false
    }

    /// Finds the node with `id` in the subtree rooted at `root`.
    ///
    /// Every node visited on the way is memoized. A memo hit is only trusted
    /// after confirming the node is still live, carries that id and still
    /// sits under `root`; a miss always falls through to the tree search.
    pub fn find_by_id(&mut self, root: NodeHandle, id: NodeId) -> Option<NodeHandle> {
        if let Some(&handle) = self.id_index.get(&id) {
            let confirmed = self.node(handle).is_some_and(|n| n.id() == id)
                && self.is_ancestor_or_self(root, handle);
            if confirmed {
                return Some(handle);
            }
        }

        let mut stack = vec![root];
        while let Some(handle) = stack.pop() {
            let Some(node) = self.node(handle) else {
                continue;
            };
            let node_id = node.id();
            stack.extend(node.children.iter().rev());
            self.id_index.insert(node_id, handle);
            if node_id == id {
                return Some(handle);
            }
        }
        None
    }

    /// Returns the subtree of `root` in pre-order.
    #[must_use]
    pub fn pre_order(&self, root: NodeHandle) -> Vec<NodeHandle> {
        let mut order = Vec::new();
        let mut stack = vec![root];
        while let Some(handle) = stack.pop() {
            if let Some(node) = self.node(handle) {
                order.push(handle);
                stack.extend(node.children.iter().rev());
            }
        }
        order
    }

    /// Visits the subtree of `root` depth-first in pre-order, passing each
    /// node's accumulated transform (`parent_global * local`).
    pub fn traverse<F>(&self, root: NodeHandle, base: Mat4, mut visit: F)
    where
        F: FnMut(NodeHandle, &SceneNode, Mat4),
    {
        let mut stack = vec![(root, base)];
        while let Some((handle, parent_global)) = stack.pop() {
            let Some(node) = self.node(handle) else {
                continue;
            };
            let global = parent_global * node.transform();
            visit(handle, node, global);
            for &child in node.children.iter().rev() {
                stack.push((child, global));
            }
        }
    }

    /// Product of local transforms from the top of the hierarchy down to
    /// `handle`.
    #[must_use]
    pub fn global_transform(&self, handle: NodeHandle) -> Option<Mat4> {
        let mut node = self.node(handle)?;
        let mut global = node.transform();
        while let Some(parent) = node.parent() {
            node = self.node(parent)?;
            global = node.transform() * global;
        }
        Some(global)
    }
}
