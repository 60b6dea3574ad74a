//! Scene nodes and their identity types.
//!
//! A [`SceneNode`] owns its local transform together with the cached inverse.
//! Every mutator recomputes the inverse before returning, so the pair never
//! drifts apart.

use std::fmt;

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

/// A process-unique node identifier, also used as the picking id.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

/// A stable handle to a node slot in a [`SceneGraph`](crate::graph::SceneGraph).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeHandle(pub(crate) u32);

impl fmt::Debug for NodeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeHandle({})", self.0)
    }
}

/// A principal rotation axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    /// X axis.
    X,
    /// Y axis.
    Y,
    /// Z axis.
    Z,
}

impl Axis {
    /// Returns the unit direction vector for this axis.
    #[must_use]
    pub fn direction(self) -> Vec3 {
        match self {
            Axis::X => Vec3::X,
            Axis::Y => Vec3::Y,
            Axis::Z => Vec3::Z,
        }
    }
}

/// Surface material parameters, consumed only by rendering.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Material {
    /// Diffuse colour.
    pub kd: Vec3,
    /// Specular colour.
    pub ks: Vec3,
    /// Phong exponent.
    pub shininess: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            kd: Vec3::splat(0.8),
            ks: Vec3::splat(0.1),
            shininess: 10.0,
        }
    }
}

/// Allowed rotation range on one joint axis, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AngleRange {
    /// Smallest allowed accumulated angle.
    pub min: f32,
    /// Angle applied when the figure is loaded.
    pub init: f32,
    /// Largest allowed accumulated angle.
    pub max: f32,
}

impl AngleRange {
    /// Creates a range.
    #[must_use]
    pub fn new(min: f32, init: f32, max: f32) -> Self {
        Self { min, init, max }
    }

    /// Returns whether `angle` lies in `[min, max]`.
    #[must_use]
    pub fn contains(&self, angle: f32) -> bool {
        (self.min..=self.max).contains(&angle)
    }

    /// Returns whether `min <= init <= max` holds.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.min <= self.max && self.contains(self.init)
    }
}

impl Default for AngleRange {
    fn default() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }
}

/// Per-axis limits of a joint node.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct JointLimits {
    /// Range for rotations about y.
    pub y: AngleRange,
    /// Range for rotations about z.
    pub z: AngleRange,
}

impl JointLimits {
    /// Returns the range for `axis`, if that axis is constrained.
    #[must_use]
    pub fn range(&self, axis: Axis) -> Option<&AngleRange> {
        match axis {
            Axis::Y => Some(&self.y),
            Axis::Z => Some(&self.z),
            Axis::X => None,
        }
    }
}

/// Drawable payload of a geometry node.
#[derive(Debug, Clone, PartialEq)]
pub struct Geometry {
    /// Opaque mesh handle resolved by the renderer.
    pub mesh_id: String,
    /// Surface material.
    pub material: Material,
}

/// The closed set of node kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Pure transform node.
    Group,
    /// Drawable leaf.
    Geometry(Geometry),
    /// Constrained, rotatable node.
    Joint(JointLimits),
}

impl NodeKind {
    /// Returns true for joint nodes.
    #[must_use]
    pub fn is_constrained(&self) -> bool {
        matches!(self, NodeKind::Joint(_))
    }

    /// Returns true for geometry nodes.
    #[must_use]
    pub fn is_drawable(&self) -> bool {
        matches!(self, NodeKind::Geometry(_))
    }
}

/// Whether `m` is finite and far enough from singular to keep a finite
/// inverse.
#[must_use]
pub fn is_invertible(m: &Mat4) -> bool {
    m.is_finite() && m.determinant().abs() > f32::EPSILON && m.inverse().is_finite()
}

/// A node of the scene graph.
#[derive(Debug, Clone)]
pub struct SceneNode {
    id: NodeId,
    name: String,
    kind: NodeKind,
    transform: Mat4,
    inverse: Mat4,
    pub(crate) parent: Option<NodeHandle>,
    pub(crate) children: Vec<NodeHandle>,
    selected: bool,
    angle_y: f32,
    angle_z: f32,
}

impl SceneNode {
    pub(crate) fn new(id: NodeId, name: String, kind: NodeKind) -> Self {
        Self {
            id,
            name,
            kind,
            transform: Mat4::IDENTITY,
            inverse: Mat4::IDENTITY,
            parent: None,
            children: Vec::new(),
            selected: false,
            angle_y: 0.0,
            angle_z: 0.0,
        }
    }

    /// Returns the node id.
    #[must_use]
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Returns the node name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the node kind.
    #[must_use]
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// Returns the joint limits if this is a joint node.
    #[must_use]
    pub fn joint_limits(&self) -> Option<&JointLimits> {
        match &self.kind {
            NodeKind::Joint(limits) => Some(limits),
            _ => None,
        }
    }

    /// Returns the geometry payload if this is a geometry node.
    #[must_use]
    pub fn geometry(&self) -> Option<&Geometry> {
        match &self.kind {
            NodeKind::Geometry(geometry) => Some(geometry),
            _ => None,
        }
    }

    /// Returns the parent handle, `None` for a root.
    #[must_use]
    pub fn parent(&self) -> Option<NodeHandle> {
        self.parent
    }

    /// Returns the ordered child handles.
    #[must_use]
    pub fn children(&self) -> &[NodeHandle] {
        &self.children
    }

    /// Returns the local transform.
    #[must_use]
    pub fn transform(&self) -> Mat4 {
        self.transform
    }

    /// Returns the cached inverse of the local transform.
    #[must_use]
    pub fn inverse_transform(&self) -> Mat4 {
        self.inverse
    }

    /// Replaces the local transform and recomputes the inverse.
    ///
    /// Callers must pass an invertible matrix; see [`is_invertible`].
    pub(crate) fn set_transform(&mut self, transform: Mat4) {
        self.transform = transform;
        self.inverse = transform.inverse();
    }

    /// Composes `elementary` on the left, unless the result would have no
    /// usable inverse. Returns whether it was applied.
    fn compose(&mut self, elementary: Mat4) -> bool {
        let transform = elementary * self.transform;
        if !is_invertible(&transform) {
            return false;
        }
        self.set_transform(transform);
        true
    }

    /// Rotates by `degrees` about `axis`, composed on the left.
    ///
    /// Rotations about y or z also advance the matching angle accumulator.
    /// Returns false, leaving the node untouched, for a non-finite angle.
    pub fn rotate(&mut self, axis: Axis, degrees: f32) -> bool {
        let rotation = Mat4::from_axis_angle(axis.direction(), degrees.to_radians());
        if !self.compose(rotation) {
            return false;
        }
        match axis {
            Axis::Y => self.angle_y += degrees,
            Axis::Z => self.angle_z += degrees,
            Axis::X => {}
        }
        true
    }

    /// Translates by `amount`, composed on the left.
    pub fn translate(&mut self, amount: Vec3) -> bool {
        self.compose(Mat4::from_translation(amount))
    }

    /// Scales by `amount`, composed on the left. A zero component would
    /// collapse the node and is rejected.
    pub fn scale(&mut self, amount: Vec3) -> bool {
        self.compose(Mat4::from_scale(amount))
    }

    /// Returns whether the node is selected.
    #[must_use]
    pub fn is_selected(&self) -> bool {
        self.selected
    }

    /// Sets the selection flag.
    pub fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }

    /// Accumulated rotation about y since the last reset, in degrees.
    #[must_use]
    pub fn angle_y(&self) -> f32 {
        self.angle_y
    }

    /// Accumulated rotation about z since the last reset, in degrees.
    #[must_use]
    pub fn angle_z(&self) -> f32 {
        self.angle_z
    }

    /// Returns the accumulator for `axis`; x has none and reads as zero.
    #[must_use]
    pub fn angle(&self, axis: Axis) -> f32 {
        match axis {
            Axis::Y => self.angle_y,
            Axis::Z => self.angle_z,
            Axis::X => 0.0,
        }
    }

    /// Overwrites both angle accumulators without touching the transform.
    pub fn set_angles(&mut self, angle_y: f32, angle_z: f32) {
        self.angle_y = angle_y;
        self.angle_z = angle_z;
    }
}
