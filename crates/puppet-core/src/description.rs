//! Declarative scene description and the graph builder.
//!
//! A figure is described as a JSON tree of nodes. Building it allocates ids
//! in pre-order, so the n-th node in document order receives id n.

use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::{PuppetError, Result};
use crate::graph::SceneGraph;
use crate::node::{AngleRange, Axis, Geometry, JointLimits, Material, NodeHandle, NodeKind};

/// An elementary transform applied to a node at load time, in order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransformOp {
    /// Rotation in degrees about a principal axis.
    Rotate {
        /// Axis to rotate about.
        axis: Axis,
        /// Angle in degrees.
        degrees: f32,
    },
    /// Translation.
    Translate(Vec3),
    /// Non-uniform scale.
    Scale(Vec3),
}

/// Kind-specific part of a node description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum KindDescription {
    /// Transform-only node.
    Group,
    /// Drawable node.
    Geometry {
        /// Mesh handle for the renderer.
        mesh: String,
        /// Surface material.
        #[serde(default)]
        material: Material,
    },
    /// Constrained node.
    Joint {
        /// Range about y.
        y: AngleRange,
        /// Range about z.
        z: AngleRange,
    },
}

/// One node of a scene description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDescription {
    /// Human-readable name.
    pub name: String,
    /// Node kind and its payload.
    #[serde(flatten)]
    pub kind: KindDescription,
    /// Load-time transforms, applied first to last.
    #[serde(default)]
    pub transforms: Vec<TransformOp>,
    /// Ordered children.
    #[serde(default)]
    pub children: Vec<NodeDescription>,
}

impl NodeDescription {
    /// Parses a description from JSON.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

fn check_range(name: &str, axis: Axis, range: &AngleRange) -> Result<()> {
    if range.is_valid() {
        return Ok(());
    }
    Err(PuppetError::InvalidJointRange {
        name: name.to_string(),
        axis,
        min: range.min,
        init: range.init,
        max: range.max,
    })
}

impl SceneGraph {
    /// Builds a fresh graph from `description` and returns it with its root.
    ///
    /// Joints start at their `init` angles. Any invalid range fails the whole
    /// build; no partial graph is returned.
    pub fn from_description(description: &NodeDescription) -> Result<(Self, NodeHandle)> {
        let mut graph = Self::new();
        let root = graph.build_node(description)?;
        Ok((graph, root))
    }

    fn build_node(&mut self, description: &NodeDescription) -> Result<NodeHandle> {
        let name = description.name.as_str();
        let kind = match &description.kind {
            KindDescription::Group => NodeKind::Group,
            KindDescription::Geometry { mesh, material } => NodeKind::Geometry(Geometry {
                mesh_id: mesh.clone(),
                material: *material,
            }),
            KindDescription::Joint { y, z } => {
                check_range(name, Axis::Y, y)?;
                check_range(name, Axis::Z, z)?;
                NodeKind::Joint(JointLimits { y: *y, z: *z })
            }
        };
        let handle = self.create_node(name, kind)?;

        let node = self.node_mut(handle).ok_or(PuppetError::NodeNotFound(handle))?;
        for op in &description.transforms {
            let applied = match *op {
                TransformOp::Rotate { axis, degrees } => node.rotate(axis, degrees),
                TransformOp::Translate(amount) => node.translate(amount),
                TransformOp::Scale(amount) => node.scale(amount),
            };
            if !applied {
                return Err(PuppetError::SingularTransform(name.to_string()));
            }
        }
        // Layout rotations above must not count towards the joint angles.
        node.set_angles(0.0, 0.0);
        if let Some(limits) = node.joint_limits().copied() {
            node.rotate(Axis::Y, limits.y.init);
            node.rotate(Axis::Z, limits.z.init);
        }

        for child in &description.children {
            let child_handle = self.build_node(child)?;
            self.add_child(handle, child_handle)?;
        }
        Ok(handle)
    }
}

/// Reads a JSON scene description from `path` and builds it.
pub fn load_scene_file(path: impl AsRef<Path>) -> Result<(SceneGraph, NodeHandle)> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|e| {
        log::error!("could not open scene {}: {e}", path.display());
        e
    })?;
    let description = NodeDescription::from_json_str(&text).map_err(|e| {
        log::error!("could not parse scene {}: {e}", path.display());
        e
    })?;
    SceneGraph::from_description(&description).map_err(|e| {
        log::error!("invalid scene {}: {e}", path.display());
        e
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeId;

    const FIGURE: &str = r#"{
        "name": "root", "kind": "group",
        "children": [
            { "name": "torso", "kind": "geometry", "mesh": "cube",
              "transforms": [ { "scale": [1.0, 2.0, 0.5] } ] },
            { "name": "neck", "kind": "joint",
              "y": { "min": -60.0, "init": 0.0, "max": 60.0 },
              "z": { "min": -20.0, "init": 10.0, "max": 20.0 },
              "transforms": [ { "translate": [0.0, 1.2, 0.0] } ],
              "children": [
                  { "name": "head", "kind": "geometry", "mesh": "sphere",
                    "material": { "kd": [0.9, 0.7, 0.6], "ks": [0.2, 0.2, 0.2], "shininess": 20.0 } }
              ] }
        ]
    }"#;

    #[test]
    fn test_build_from_json() {
        let description = NodeDescription::from_json_str(FIGURE).unwrap();
        let (mut graph, root) = SceneGraph::from_description(&description).unwrap();
        assert_eq!(graph.len(), 4);

        let root_node = graph.node(root).unwrap();
        assert_eq!(root_node.children().len(), 2);
        let neck = root_node.children()[1];
        let neck_node = graph.node(neck).unwrap();
        assert_eq!(neck_node.id(), NodeId(2));
        assert_eq!(neck_node.angle_z(), 10.0);
        assert_eq!(neck_node.angle_y(), 0.0);

        let head = graph.find_by_id(root, NodeId(3)).unwrap();
        let head_node = graph.node(head).unwrap();
        assert_eq!(head_node.name(), "head");
        assert_eq!(head_node.parent(), Some(neck));
        assert_eq!(head_node.geometry().unwrap().material.shininess, 20.0);
    }

    #[test]
    fn test_layout_rotation_does_not_count_as_joint_angle() {
        let json = r#"{ "name": "j", "kind": "joint",
            "y": { "min": 0.0, "init": 0.0, "max": 0.0 },
            "z": { "min": -5.0, "init": 0.0, "max": 5.0 },
            "transforms": [ { "rotate": { "axis": "z", "degrees": 90.0 } } ] }"#;
        let description = NodeDescription::from_json_str(json).unwrap();
        let (graph, root) = SceneGraph::from_description(&description).unwrap();
        assert_eq!(graph.node(root).unwrap().angle_z(), 0.0);
    }

    #[test]
    fn test_invalid_range_fails_build() {
        let json = r#"{ "name": "elbow", "kind": "joint",
            "y": { "min": 0.0, "init": 0.0, "max": 0.0 },
            "z": { "min": 0.0, "init": 50.0, "max": 10.0 } }"#;
        let description = NodeDescription::from_json_str(json).unwrap();
        let err = SceneGraph::from_description(&description).unwrap_err();
        assert!(matches!(err, PuppetError::InvalidJointRange { axis: Axis::Z, .. }));
    }

    #[test]
    fn test_missing_file() {
        let err = load_scene_file("/nonexistent/puppet.json").unwrap_err();
        assert!(matches!(err, PuppetError::IoError(_)));
    }

    #[test]
    fn test_zero_scale_fails_build() {
        let json = r#"{ "name": "flat", "kind": "geometry", "mesh": "cube",
            "transforms": [ { "scale": [0.0, 1.0, 1.0] } ] }"#;
        let description = NodeDescription::from_json_str(json).unwrap();
        let err = SceneGraph::from_description(&description).unwrap_err();
        assert!(matches!(err, PuppetError::SingularTransform(ref name) if name == "flat"));
    }

    #[test]
    fn test_load_invalid_figure_reports_range() {
        let json = r#"{ "name": "elbow", "kind": "joint",
            "y": { "min": 0.0, "init": 0.0, "max": 0.0 },
            "z": { "min": 0.0, "init": 50.0, "max": 10.0 } }"#;
        let path = std::env::temp_dir()
            .join(format!("puppet-invalid-range-{}.json", std::process::id()));
        std::fs::write(&path, json).unwrap();
        let result = load_scene_file(&path);
        std::fs::remove_file(&path).unwrap();
        assert!(matches!(
            result,
            Err(PuppetError::InvalidJointRange { ref name, .. }) if name == "elbow"
        ));
    }
}
