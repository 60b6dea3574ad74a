use glam::{Vec2, Vec3};

use puppet_core::{drag_head_joint, drag_selected_joints, trackball, InteractionMode};

use super::{Command, PoseEngine, Viewport};
use crate::render::RenderBackend;

/// Mouse buttons the engine reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    /// Primary button.
    Left,
    /// Wheel button.
    Middle,
    /// Secondary button.
    Right,
}

/// Button transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonAction {
    /// Button went down.
    Press,
    /// Button went up.
    Release,
}

impl PoseEngine {
    /// Handles a cursor move to window position (`x`, `y`).
    ///
    /// Returns whether anything in the scene changed.
    pub fn mouse_move(&mut self, x: f32, y: f32) -> bool {
        if !x.is_finite() || !y.is_finite() {
            log::trace!("ignoring non-finite cursor ({x}, {y})");
            return false;
        }
        let curr = Vec2::new(x, y);
        let delta = curr - self.mouse.prev;
        let changed = match self.mode {
            InteractionMode::Position => self.drag_figure(curr, delta),
            InteractionMode::Joint => self.drag_joints(delta),
        };
        self.mouse.prev = curr;
        changed
    }

    /// One button drives the figure at a time: left, then middle, then right.
    fn drag_figure(&mut self, curr: Vec2, delta: Vec2) -> bool {
        let scale = self.options.translation_scale;
        if self.mouse.left {
            self.figure.translate(Vec3::new(scale * delta.x, -scale * delta.y, 0.0));
            return true;
        }
        if self.mouse.middle {
            self.figure.translate(Vec3::new(0.0, 0.0, scale * delta.y));
            return true;
        }
        if !self.mouse.right {
            return false;
        }

        let center = self.viewport.center();
        let diameter = self
            .viewport
            .trackball_diameter(self.options.trackball_diameter_fraction);
        let Some((axis, angle)) = trackball::drag_rotation(
            self.mouse.prev - center,
            curr - center,
            diameter,
            self.options.min_rotation_axis_length,
        ) else {
            return false;
        };
        let pivot = trackball::pivot_point(self.figure.base, self.pivot_local());
        self.figure.rotate_about(axis, angle, pivot);
        true
    }

    fn drag_joints(&mut self, delta: Vec2) -> bool {
        let amount = delta.y * self.options.joint_sensitivity;
        let mut changed = false;
        if self.mouse.middle {
            changed |= drag_selected_joints(&mut self.graph, &self.selection, amount) > 0;
        }
        if self.mouse.right {
            changed |= drag_head_joint(&mut self.graph, self.root, self.options.head_node_id, amount);
        }
        changed
    }

    /// Handles a button transition at window position `cursor`.
    ///
    /// Held-button state is always tracked. Presses over the overlay start
    /// nothing. A joint-mode left press picks, so it needs the renderer.
    /// Returns whether the selection or history changed.
    pub fn mouse_button(
        &mut self,
        renderer: &mut dyn RenderBackend,
        button: MouseButton,
        action: ButtonAction,
        cursor: Vec2,
        over_overlay: bool,
    ) -> bool {
        let pressed = action == ButtonAction::Press;
        match button {
            MouseButton::Left => self.mouse.left = pressed,
            MouseButton::Middle => self.mouse.middle = pressed,
            MouseButton::Right => self.mouse.right = pressed,
        }

        match action {
            ButtonAction::Press => {
                if cursor.is_finite() {
                    self.mouse.prev = cursor;
                }
                if over_overlay {
                    log::trace!("{button:?} press consumed by overlay");
                    return false;
                }
                if self.mode != InteractionMode::Joint {
                    return false;
                }
                match button {
                    MouseButton::Left => {
                        self.pick_at(renderer, cursor) != puppet_core::PickOutcome::Miss
                    }
                    MouseButton::Middle | MouseButton::Right => {
                        self.history.save_state(&self.graph, &self.selection);
                        false
                    }
                }
            }
            ButtonAction::Release => match button {
                MouseButton::Left => false,
                MouseButton::Middle | MouseButton::Right => self.history.commit(),
            },
        }
    }

    /// Handles a key press. Unbound keys are ignored.
    ///
    /// Returns whether the key was bound.
    pub fn key_input(&mut self, key: char) -> bool {
        match Command::from_key(key) {
            Some(command) => {
                self.execute(command);
                true
            }
            None => false,
        }
    }

    /// Records a new window or framebuffer size.
    pub fn resize(&mut self, viewport: Viewport) {
        log::debug!(
            "resize to {}x{} (framebuffer {}x{})",
            viewport.width,
            viewport.height,
            viewport.framebuffer_width,
            viewport.framebuffer_height
        );
        self.viewport = viewport;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{FrameContext, NodeUniforms};
    use puppet_core::{AngleRange, Geometry, JointLimits, Material, NodeKind, Options, SceneGraph};

    struct NullBackend;

    impl RenderBackend for NullBackend {
        fn begin_frame(&mut self, _frame: &FrameContext) {}
        fn draw_geometry(&mut self, _mesh_id: &str, _uniforms: &NodeUniforms) {}
        fn read_pixel(&mut self, _x: u32, _y: u32) -> [u8; 4] {
            [255; 4]
        }
    }

    fn engine() -> PoseEngine {
        let mut graph = SceneGraph::new();
        let root = graph.create_node("root", NodeKind::Group).unwrap();
        let joint = graph
            .create_node(
                "elbow",
                NodeKind::Joint(JointLimits {
                    y: AngleRange::new(-10.0, 0.0, 10.0),
                    z: AngleRange::new(-10.0, 0.0, 10.0),
                }),
            )
            .unwrap();
        let arm = graph
            .create_node(
                "arm",
                NodeKind::Geometry(Geometry {
                    mesh_id: "cube".into(),
                    material: Material::default(),
                }),
            )
            .unwrap();
        graph.add_child(root, joint).unwrap();
        graph.add_child(joint, arm).unwrap();
        PoseEngine::new(graph, Some(root), Options::default()).unwrap()
    }

    #[test]
    fn test_left_drag_translates_figure() {
        let mut engine = engine();
        let mut backend = NullBackend;
        engine.mouse_button(&mut backend, MouseButton::Left, ButtonAction::Press, Vec2::ZERO, false);
        assert!(engine.mouse_move(100.0, 50.0));
        let offset = engine.figure().translation.w_axis.truncate();
        assert!(offset.abs_diff_eq(Vec3::new(1.0, -0.5, 0.0), 1e-5));
    }

    #[test]
    fn test_middle_drag_moves_along_z() {
        let mut engine = engine();
        let mut backend = NullBackend;
        engine.mouse_button(&mut backend, MouseButton::Middle, ButtonAction::Press, Vec2::ZERO, false);
        engine.mouse_move(0.0, 30.0);
        let offset = engine.figure().translation.w_axis.truncate();
        assert!(offset.abs_diff_eq(Vec3::new(0.0, 0.0, 0.3), 1e-5));
    }

    #[test]
    fn test_move_without_buttons_only_tracks_cursor() {
        let mut engine = engine();
        assert!(!engine.mouse_move(12.0, 34.0));
        assert_eq!(engine.mouse().prev, Vec2::new(12.0, 34.0));
        assert!(!engine.mouse_move(f32::NAN, 1.0));
        assert_eq!(engine.mouse().prev, Vec2::new(12.0, 34.0));
    }

    #[test]
    fn test_release_tracked_over_overlay() {
        let mut engine = engine();
        let mut backend = NullBackend;
        engine.mouse_button(&mut backend, MouseButton::Right, ButtonAction::Press, Vec2::ZERO, true);
        assert!(engine.mouse().right);
        engine.mouse_button(&mut backend, MouseButton::Right, ButtonAction::Release, Vec2::ZERO, true);
        assert!(!engine.mouse().right);
    }

    #[test]
    fn test_key_input() {
        let mut engine = engine();
        assert!(engine.key_input('j'));
        assert_eq!(engine.mode(), InteractionMode::Joint);
        assert!(!engine.key_input('x'));
    }
}
