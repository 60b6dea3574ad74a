//! Interface to the rendering subsystem.
//!
//! The engine never touches GPU state. Each frame it fills a [`FrameContext`],
//! walks the scene graph and hands every geometry node to a
//! [`RenderBackend`] together with its [`NodeUniforms`].

use glam::{Mat3, Mat4, Vec2, Vec3};

use puppet_core::{CullMode, DisplayOptions, Geometry, NodeId, NO_HIT_COLOR};

/// Diffuse colour of a selected geometry node.
pub const SELECTED_COLOR: Vec3 = Vec3::new(1.0, 1.0, 0.0);

/// Clear colour of the regular pass.
pub const BACKGROUND_COLOR: [f32; 4] = [0.35, 0.35, 0.35, 1.0];

/// Ambient light intensity of the regular pass.
pub const AMBIENT_INTENSITY: Vec3 = Vec3::splat(0.25);

/// A point light in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightSource {
    /// World-space position.
    pub position: Vec3,
    /// RGB intensity.
    pub intensity: Vec3,
}

impl Default for LightSource {
    fn default() -> Self {
        Self {
            position: Vec3::splat(10.0),
            intensity: Vec3::ONE,
        }
    }
}

/// Everything a backend needs to set up one pass.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameContext {
    /// Whether this is the id-encoded picking pass.
    pub picking: bool,
    /// Display toggles in effect.
    pub display: DisplayOptions,
    /// Culling derived from the display toggles.
    pub cull_mode: CullMode,
    /// Depth testing. Always on while picking so the nearest id wins.
    pub depth_test: bool,
    /// Projection matrix.
    pub projection: Mat4,
    /// Colour to clear to.
    pub clear_color: [f32; 4],
    /// Scene light; `None` while picking.
    pub light: Option<LightSource>,
    /// Ambient intensity; `None` while picking.
    pub ambient: Option<Vec3>,
    /// Whether the overlay should be drawn.
    pub show_overlay: bool,
}

/// Per-node shader uniforms.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct NodeUniforms {
    /// Accumulated model-view matrix.
    pub model_view: [[f32; 4]; 4],
    /// Inverse-transpose of the upper 3x3 of `model_view`, padded to 4x4.
    pub normal_matrix: [[f32; 4]; 4],
    /// Diffuse colour, or the encoded id while picking.
    pub kd: [f32; 3],
    /// Phong exponent.
    pub shininess: f32,
    /// Specular colour.
    pub ks: [f32; 3],
    /// Non-zero while picking.
    pub picking: u32,
}

impl NodeUniforms {
    /// Uniforms for the regular shaded pass.
    #[must_use]
    pub fn shaded(model_view: Mat4, geometry: &Geometry, selected: bool) -> Self {
        let normal = Mat3::from_mat4(model_view).inverse().transpose();
        let kd = if selected {
            SELECTED_COLOR
        } else {
            geometry.material.kd
        };
        Self {
            model_view: model_view.to_cols_array_2d(),
            normal_matrix: Mat4::from_mat3(normal).to_cols_array_2d(),
            kd: kd.to_array(),
            shininess: geometry.material.shininess,
            ks: geometry.material.ks.to_array(),
            picking: 0,
        }
    }

    /// Uniforms for the picking pass: flat colour carrying the node id.
    #[must_use]
    pub fn picking(model_view: Mat4, id: NodeId) -> Self {
        Self {
            model_view: model_view.to_cols_array_2d(),
            normal_matrix: Mat4::IDENTITY.to_cols_array_2d(),
            kd: puppet_core::encode_id(id),
            shininess: 0.0,
            ks: [0.0; 3],
            picking: 1,
        }
    }
}

impl FrameContext {
    pub(crate) fn new(
        picking: bool,
        display: DisplayOptions,
        projection: Mat4,
        show_overlay: bool,
    ) -> Self {
        Self {
            picking,
            display,
            cull_mode: display.cull_mode(),
            depth_test: picking || display.zbuffer,
            projection,
            clear_color: if picking { NO_HIT_COLOR } else { BACKGROUND_COLOR },
            light: (!picking).then(LightSource::default),
            ambient: (!picking).then_some(AMBIENT_INTENSITY),
            show_overlay: show_overlay && !picking,
        }
    }
}

/// The rendering subsystem as seen by the engine.
pub trait RenderBackend {
    /// Clears and configures a pass.
    fn begin_frame(&mut self, frame: &FrameContext);

    /// Draws one geometry node.
    fn draw_geometry(&mut self, mesh_id: &str, uniforms: &NodeUniforms);

    /// Draws the trackball circle outline, already scaled to NDC.
    fn draw_circle(&mut self, _transform: Mat4, _points: &[Vec2]) {}

    /// Finishes a pass.
    fn end_frame(&mut self, _frame: &FrameContext) {}

    /// Reads back one RGBA pixel of the pass just drawn, in framebuffer
    /// coordinates with the origin at the bottom left.
    fn read_pixel(&mut self, x: u32, y: u32) -> [u8; 4];
}

#[cfg(test)]
mod tests {
    use super::*;
    use puppet_core::Material;

    fn geometry() -> Geometry {
        Geometry {
            mesh_id: "cube".into(),
            material: Material {
                kd: Vec3::new(0.1, 0.2, 0.3),
                ks: Vec3::splat(0.5),
                shininess: 8.0,
            },
        }
    }

    #[test]
    fn test_uniform_layout_has_no_padding() {
        assert_eq!(std::mem::size_of::<NodeUniforms>(), 160);
        let uniforms = NodeUniforms::shaded(Mat4::IDENTITY, &geometry(), false);
        assert_eq!(bytemuck::bytes_of(&uniforms).len(), 160);
    }

    #[test]
    fn test_selected_geometry_is_highlighted() {
        let plain = NodeUniforms::shaded(Mat4::IDENTITY, &geometry(), false);
        let selected = NodeUniforms::shaded(Mat4::IDENTITY, &geometry(), true);
        assert_eq!(plain.kd, [0.1, 0.2, 0.3]);
        assert_eq!(selected.kd, [1.0, 1.0, 0.0]);
        assert_eq!(selected.picking, 0);
    }

    #[test]
    fn test_picking_uniforms_carry_id() {
        let uniforms = NodeUniforms::picking(Mat4::IDENTITY, NodeId(0x0001_0203));
        assert_eq!(uniforms.picking, 1);
        assert_eq!(uniforms.kd, puppet_core::encode_id(NodeId(0x0001_0203)));
    }

    #[test]
    fn test_picking_frame() {
        let display = DisplayOptions {
            zbuffer: false,
            ..Default::default()
        };
        let frame = FrameContext::new(true, display, Mat4::IDENTITY, true);
        assert!(frame.depth_test);
        assert_eq!(frame.clear_color, NO_HIT_COLOR);
        assert!(frame.light.is_none());
        assert!(!frame.show_overlay);

        let frame = FrameContext::new(false, display, Mat4::IDENTITY, true);
        assert!(!frame.depth_test);
        assert_eq!(frame.clear_color, BACKGROUND_COLOR);
        assert!(frame.ambient.is_some());
    }
}
