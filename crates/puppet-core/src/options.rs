//! Configuration options for puppet-rs.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::node::NodeId;

/// Engine tuning knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Figure translation per pixel of drag.
    pub translation_scale: f32,

    /// Joint rotation in degrees per pixel of vertical drag.
    pub joint_sensitivity: f32,

    /// Id of the head geometry whose parent joint takes the y-axis gesture.
    pub head_node_id: NodeId,

    /// Trackball diameter as a fraction of the shorter framebuffer side.
    pub trackball_diameter_fraction: f32,

    /// Rotation axes shorter than this are ignored by the trackball.
    pub min_rotation_axis_length: f32,

    /// Vertical field of view in degrees.
    pub field_of_view_deg: f32,

    /// Near clip plane.
    pub near: f32,

    /// Far clip plane.
    pub far: f32,

    /// Number of points in the trackball circle outline.
    pub circle_points: usize,

    /// Where the figure stands relative to the camera. Resets keep it.
    pub figure_offset: Vec3,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            translation_scale: 0.01,
            joint_sensitivity: 0.2,
            head_node_id: NodeId(4),
            trackball_diameter_fraction: 0.5,
            min_rotation_axis_length: crate::trackball::MIN_AXIS_LENGTH,
            field_of_view_deg: 60.0,
            near: 0.1,
            far: 100.0,
            circle_points: 48,
            figure_offset: Vec3::ZERO,
        }
    }
}

impl Options {
    /// Parses options from JSON; missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// What mouse drags act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum InteractionMode {
    /// Drags move and turn the whole figure.
    #[default]
    Position,
    /// Clicks pick parts, drags bend selected joints.
    Joint,
}

/// Face culling derived from the two culling toggles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CullMode {
    /// No culling.
    #[default]
    None,
    /// Cull back faces.
    Back,
    /// Cull front faces.
    Front,
    /// Cull everything.
    FrontAndBack,
}

/// Display toggles exposed on the overlay and keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayOptions {
    /// Draw the trackball circle.
    pub circle: bool,
    /// Depth testing.
    pub zbuffer: bool,
    /// Back-face culling.
    pub backface: bool,
    /// Front-face culling.
    pub frontface: bool,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            circle: false,
            zbuffer: true,
            backface: false,
            frontface: false,
        }
    }
}

impl DisplayOptions {
    /// The culling mode implied by the two culling toggles.
    #[must_use]
    pub fn cull_mode(&self) -> CullMode {
        match (self.backface, self.frontface) {
            (false, false) => CullMode::None,
            (true, false) => CullMode::Back,
            (false, true) => CullMode::Front,
            (true, true) => CullMode::FrontAndBack,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_defaults() {
        let display = DisplayOptions::default();
        assert!(!display.circle);
        assert!(display.zbuffer);
        assert_eq!(display.cull_mode(), CullMode::None);
    }

    #[test]
    fn test_cull_mode() {
        let mut display = DisplayOptions {
            backface: true,
            ..Default::default()
        };
        assert_eq!(display.cull_mode(), CullMode::Back);
        display.frontface = true;
        assert_eq!(display.cull_mode(), CullMode::FrontAndBack);
        display.backface = false;
        assert_eq!(display.cull_mode(), CullMode::Front);
    }

    #[test]
    fn test_options_from_partial_json() {
        let options = Options::from_json_str(r#"{ "joint_sensitivity": 0.5, "head_node_id": 7 }"#).unwrap();
        assert_eq!(options.joint_sensitivity, 0.5);
        assert_eq!(options.head_node_id, NodeId(7));
        assert_eq!(options.translation_scale, 0.01);
        assert!(Options::from_json_str("not json").is_err());
    }

    #[test]
    fn test_figure_offset_from_json() {
        assert_eq!(Options::default().figure_offset, Vec3::ZERO);
        let options = Options::from_json_str(r#"{ "figure_offset": [0.0, -1.0, -5.0] }"#).unwrap();
        assert_eq!(options.figure_offset, Vec3::new(0.0, -1.0, -5.0));
    }
}
