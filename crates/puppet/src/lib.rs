//! puppet-rs: interactive posing of articulated figures.
//!
//! A figure is a hierarchy of groups, joints and geometry loaded from a JSON
//! description. The [`PoseEngine`] turns mouse and keyboard events into edits
//! of that hierarchy: whole-figure translation and trackball rotation,
//! colour-coded picking of parts, limit-checked joint rotation and undo/redo.
//! Drawing is delegated to a [`RenderBackend`] supplied by the host.
//!
//! # Quick Start
//!
//! ```no_run
//! use puppet::*;
//!
//! fn main() -> Result<()> {
//!     let mut engine = init("puppet.json", Options::default())?;
//!
//!     // Bend the picked joints in joint mode.
//!     engine.key_input('j');
//!     engine.mouse_move(400.0, 300.0);
//!     engine.undo();
//!
//!     Ok(())
//! }
//! ```
//!
//! # Interaction modes
//!
//! - [`InteractionMode::Position`]: left drag moves the figure in x/y,
//!   middle drag in z, right drag turns it with the trackball.
//! - [`InteractionMode::Joint`]: left click toggles parts, middle drag bends
//!   the selected joints about z, right drag turns the head about y.

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![cfg_attr(test, allow(clippy::float_cmp))]

mod engine;
mod init;
pub mod render;

pub use engine::{ButtonAction, Command, MouseButton, MouseState, PoseEngine, Viewport};
pub use init::{init, init_logging};
pub use render::{FrameContext, LightSource, NodeUniforms, RenderBackend};

// Re-export core types
pub use puppet_core::{
    encode_id_bytes, AngleRange, Axis, CullMode, DisplayOptions, FigurePose, Geometry, History,
    InteractionMode, JointLimits, Material, NodeDescription, NodeHandle, NodeId, NodeKind,
    NodeSnapshot, Options, PickOutcome, PuppetError, Result, SceneGraph, SceneNode, Selection,
    NO_HIT_ID,
};
pub use puppet_core::{Mat4, Vec2, Vec3, Vec4};
