//! Just enough 3D math for projecting boxes and picking them with the pointer.

mod camera;
mod hit_testing;

pub use camera::Camera;
pub use hit_testing::{Aabb, Ray};

use glam::Vec2;

/// Maps a pointer position inside a viewport to normalised device
/// coordinates: `[-1, 1]` on both axes, y pointing up.
pub fn ndc_from_screen(pos: Vec2, viewport_min: Vec2, viewport_size: Vec2) -> Vec2 {
    let relative = (pos - viewport_min) / viewport_size.max(Vec2::ONE);
    Vec2::new(relative.x * 2.0 - 1.0, 1.0 - relative.y * 2.0)
}

/// Inverse of [`ndc_from_screen`]
pub fn screen_from_ndc(ndc: Vec2, viewport_min: Vec2, viewport_size: Vec2) -> Vec2 {
    viewport_min + Vec2::new(ndc.x + 1.0, 1.0 - ndc.y) * 0.5 * viewport_size
}
