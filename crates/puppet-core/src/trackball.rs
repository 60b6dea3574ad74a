//! Virtual trackball for whole-figure rotation.
//!
//! A drag is projected onto a sphere inscribed in the viewport; the rotation
//! carrying the previous projected point onto the current one is applied to
//! the figure about a pivot, so the figure turns in place.

use std::f32::consts::TAU;

use glam::{Mat4, Vec2, Vec3};

/// Cross products shorter than this are treated as "no rotation".
pub const MIN_AXIS_LENGTH: f32 = 1e-6;

/// Maps a point relative to the trackball centre onto the unit sphere.
///
/// Points outside the sphere are normalized onto its equator (z = 0). A
/// non-positive diameter maps everything to the front pole.
#[must_use]
pub fn map_to_sphere(point: Vec2, diameter: f32) -> Vec3 {
    if diameter <= 0.0 || !diameter.is_finite() {
        return Vec3::Z;
    }
    let n = point * 2.0 / diameter;
    let sq = 1.0 - n.length_squared();
    if sq >= 0.0 {
        n.extend(sq.sqrt())
    } else {
        n.normalize_or_zero().extend(0.0)
    }
}

/// Axis and angle (radians) of the rotation for one drag step.
///
/// `prev` and `curr` are cursor positions relative to the trackball centre.
/// Returns `None` when the step is too small to define an axis.
#[must_use]
pub fn drag_rotation(prev: Vec2, curr: Vec2, diameter: f32, min_axis_length: f32) -> Option<(Vec3, f32)> {
    let from = map_to_sphere(prev, diameter);
    let to = map_to_sphere(curr, diameter);
    let axis = from.cross(to);
    let length = axis.length();
    if length.is_nan() || length <= min_axis_length {
        return None;
    }
    let angle = from.dot(to).clamp(-1.0, 1.0).acos();
    Some((axis / length, angle))
}

/// Returns `T2 * rotation * T1`, rotating about `pivot` instead of the origin.
#[must_use]
pub fn rotation_about_pivot(rotation: Mat4, pivot: Vec3) -> Mat4 {
    Mat4::from_translation(pivot) * rotation * Mat4::from_translation(-pivot)
}

/// Whole-figure pose, kept as separate accumulators so that resetting one
/// does not disturb the other.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FigurePose {
    /// Accumulated translation.
    pub translation: Mat4,
    /// Accumulated trackball rotation (pivot translations included).
    pub rotation: Mat4,
    /// Fixed placement of the figure itself.
    pub base: Mat4,
}

impl Default for FigurePose {
    fn default() -> Self {
        Self {
            translation: Mat4::IDENTITY,
            rotation: Mat4::IDENTITY,
            base: Mat4::IDENTITY,
        }
    }
}

impl FigurePose {
    /// A pose with empty accumulators standing at `base`.
    #[must_use]
    pub fn placed(base: Mat4) -> Self {
        Self {
            base,
            ..Self::default()
        }
    }

    /// The transform applied above the scene root.
    ///
    /// The rotation acts on the placed figure, matching [`pivot_point`].
    #[must_use]
    pub fn model(&self) -> Mat4 {
        self.translation * self.rotation * self.base
    }

    /// Composes a translation on the left of the translation accumulator.
    pub fn translate(&mut self, delta: Vec3) {
        self.translation = Mat4::from_translation(delta) * self.translation;
    }

    /// Composes a pivoted rotation on the left of the rotation accumulator.
    pub fn rotate_about(&mut self, axis: Vec3, angle: f32, pivot: Vec3) {
        let rotation = Mat4::from_axis_angle(axis, angle);
        self.rotation = rotation_about_pivot(rotation, pivot) * self.rotation;
    }

    /// Clears the translation accumulator.
    pub fn reset_translation(&mut self) {
        self.translation = Mat4::IDENTITY;
    }

    /// Clears the rotation accumulator.
    pub fn reset_rotation(&mut self) {
        self.rotation = Mat4::IDENTITY;
    }
}

/// Pivot for a trackball step: the origin of `pivot_local` placed by the
/// figure's base transform, or the base origin if there is no such node.
#[must_use]
pub fn pivot_point(base: Mat4, pivot_local: Option<Mat4>) -> Vec3 {
    match pivot_local {
        Some(local) => (base * local).w_axis.truncate(),
        None => base.w_axis.truncate(),
    }
}

/// Unit circle outline with `count` points, for drawing the trackball.
#[must_use]
pub fn circle_points(count: usize) -> Vec<Vec2> {
    (0..count)
        .map(|i| {
            #[allow(clippy::cast_precision_loss)]
            let angle = TAU * i as f32 / count as f32;
            Vec2::new(angle.cos(), angle.sin())
        })
        .collect()
}

/// Scale placing the unit circle at half the shorter viewport side in NDC.
#[must_use]
pub fn circle_transform(aspect: f32) -> Mat4 {
    if aspect > 1.0 {
        Mat4::from_scale(Vec3::new(0.5 / aspect, 0.5, 1.0))
    } else {
        Mat4::from_scale(Vec3::new(0.5, 0.5 * aspect, 1.0))
    }
}
