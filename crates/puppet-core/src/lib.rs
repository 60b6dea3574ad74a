//! Core scene-graph manipulation engine for puppet-rs.
//!
//! This crate holds everything about posing a figure that does not depend on
//! how it is drawn:
//! - [`SceneGraph`] arena of [`SceneNode`]s with cached inverse transforms
//! - Trackball mapping for whole-figure rotation
//! - Limit-checked joint rotation
//! - Colour-coded picking and the [`Selection`] set
//! - Linear undo/redo [`History`] of node snapshots

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
// Options structs legitimately have many boolean flags
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::must_use_candidate)]
// Angle and transform assertions compare exact values in tests
#![cfg_attr(test, allow(clippy::float_cmp))]

pub mod description;
pub mod error;
pub mod graph;
pub mod history;
pub mod joint;
pub mod node;
pub mod options;
pub mod pick;
pub mod trackball;

pub use description::{load_scene_file, KindDescription, NodeDescription, TransformOp};
pub use error::{PuppetError, Result};
pub use graph::{IdAllocator, SceneGraph};
pub use history::{History, NodeSnapshot, SnapshotSet};
pub use joint::{drag_head_joint, drag_selected_joints, try_rotate_joint};
pub use node::{
    AngleRange, Axis, Geometry, JointLimits, Material, NodeHandle, NodeId, NodeKind, SceneNode,
};
pub use options::{CullMode, DisplayOptions, InteractionMode, Options};
pub use pick::{decode_color, encode_id, encode_id_bytes, PickOutcome, Selection, NO_HIT_COLOR, NO_HIT_ID};
pub use trackball::{map_to_sphere, FigurePose};

// Re-export glam types for convenience
pub use glam::{Mat4, Vec2, Vec3, Vec4};
