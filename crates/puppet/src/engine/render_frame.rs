use glam::{Mat4, Vec3};

use puppet_core::{trackball, NodeKind};

use super::PoseEngine;
use crate::render::{FrameContext, NodeUniforms, RenderBackend};

/// The camera sits at the origin looking down -z; figures are placed in
/// front of it by their own transforms.
const EYE: Vec3 = Vec3::ZERO;

impl PoseEngine {
    /// Camera view matrix.
    #[must_use]
    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(EYE, Vec3::NEG_Z, Vec3::Y)
    }

    /// Setup for one pass.
    #[must_use]
    pub fn frame_context(&self, picking: bool) -> FrameContext {
        FrameContext::new(picking, self.display, self.projection(), self.show_overlay)
    }

    /// Draws one regular frame: the scene, then the trackball circle if enabled.
    pub fn render(&self, renderer: &mut dyn RenderBackend) {
        let frame = self.frame_context(false);
        renderer.begin_frame(&frame);
        self.draw_scene(renderer, false);
        if self.display.circle {
            let transform = trackball::circle_transform(self.viewport.aspect());
            renderer.draw_circle(transform, &self.circle);
        }
        renderer.end_frame(&frame);
    }

    /// Walks the graph in pre-order and emits every geometry node.
    pub(crate) fn draw_scene(&self, renderer: &mut dyn RenderBackend, picking: bool) {
        let base = self.view() * self.figure.model();
        self.graph.traverse(self.root, base, |_, node, model_view| {
            let NodeKind::Geometry(geometry) = node.kind() else {
                return;
            };
            let uniforms = if picking {
                NodeUniforms::picking(model_view, node.id())
            } else {
                NodeUniforms::shaded(model_view, geometry, node.is_selected())
            };
            renderer.draw_geometry(&geometry.mesh_id, &uniforms);
        });
    }
}
