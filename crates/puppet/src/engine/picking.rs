use glam::Vec2;

use puppet_core::PickOutcome;

use super::PoseEngine;
use crate::render::RenderBackend;

impl PoseEngine {
    /// Renders the id-encoded pass, reads the pixel under `cursor` and
    /// toggles whatever geometry it belongs to.
    pub fn pick_at(&mut self, renderer: &mut dyn RenderBackend, cursor: Vec2) -> PickOutcome {
        if !cursor.is_finite() {
            return PickOutcome::Miss;
        }
        let frame = self.frame_context(true);
        renderer.begin_frame(&frame);
        self.draw_scene(renderer, true);
        let (x, y) = self.viewport.to_framebuffer(cursor);
        let pixel = renderer.read_pixel(x, y);
        renderer.end_frame(&frame);

        let outcome = self.selection.pick(&mut self.graph, self.root, pixel);
        log::debug!("pick at ({x}, {y}) read {pixel:?}: {outcome:?}");
        outcome
    }
}
