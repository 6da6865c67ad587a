use glam::{Mat4, Vec2, Vec3};

use super::Ray;

const MAX_PITCH: f32 = 1.5;

/// Perspective camera orbiting a target point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub target: Vec3,
    /// Rotation around the world y axis, radians
    pub yaw: f32,
    /// Elevation above the xz plane, radians
    pub pitch: f32,
    pub distance: f32,
    /// Vertical field of view, radians
    pub fov_y: f32,
    /// Width over height
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub min_distance: f32,
    pub max_distance: f32,
}

impl Default for Camera {
    /// Looks at the chassis from `[40, 25, 60]`
    fn default() -> Self {
        let mut camera = Self {
            target: Vec3::ZERO,
            yaw: 0.0,
            pitch: 0.0,
            distance: 1.0,
            fov_y: 45f32.to_radians(),
            aspect: 1.0,
            near: 0.1,
            far: 1000.0,
            min_distance: 20.0,
            max_distance: 150.0,
        };
        camera.look_from(Vec3::new(40.0, 25.0, 60.0));
        camera
    }
}

impl Camera {
    /// Places the eye at `eye`, keeping the current target
    pub fn look_from(&mut self, eye: Vec3) {
        let offset = eye - self.target;
        let distance = offset.length().max(f32::EPSILON);
        self.distance = distance;
        self.yaw = offset.x.atan2(offset.z);
        self.pitch = (offset.y / distance).clamp(-1.0, 1.0).asin();
    }

    pub fn eye(&self) -> Vec3 {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        let (sin_pitch, cos_pitch) = self.pitch.sin_cos();
        self.target + self.distance * Vec3::new(cos_pitch * sin_yaw, sin_pitch, cos_pitch * cos_yaw)
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye(), self.target, Vec3::Y)
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect.max(f32::EPSILON), self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection() * self.view()
    }

    /// Ray through a point given in normalised device coordinates.
    pub fn ray_from_ndc(&self, ndc: Vec2) -> Ray {
        let eye = self.eye();
        let far_point = self.view_projection().inverse().project_point3(ndc.extend(1.0));
        Ray::new(eye, far_point - eye)
    }

    /// Projects a world point to normalised device coordinates plus its depth
    /// along the view direction. `None` for points at or behind the near plane.
    pub fn project(&self, point: Vec3) -> Option<(Vec2, f32)> {
        let depth = -self.view().transform_point3(point).z;
        if depth <= self.near || depth > self.far {
            return None;
        }
        let ndc = self.view_projection().project_point3(point);
        Some((ndc.truncate(), depth))
    }

    pub fn orbit(&mut self, delta_yaw: f32, delta_pitch: f32) {
        self.yaw += delta_yaw;
        self.pitch = (self.pitch + delta_pitch).clamp(-MAX_PITCH, MAX_PITCH);
    }

    /// Multiplies the distance by `factor`, within the zoom limits
    pub fn zoom(&mut self, factor: f32) {
        self.distance = (self.distance * factor).clamp(self.min_distance, self.max_distance);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_eye_matches_start_position() {
        let eye = Camera::default().eye();
        assert!(eye.abs_diff_eq(Vec3::new(40.0, 25.0, 60.0), 1e-3));
    }

    #[test]
    fn target_projects_to_center() {
        let camera = Camera::default();
        let (ndc, depth) = camera.project(Vec3::ZERO).unwrap();
        assert!(ndc.abs_diff_eq(Vec2::ZERO, 1e-3));
        assert!((depth - camera.distance).abs() < 1e-3);
    }

    #[test]
    fn points_behind_the_eye_are_not_projected() {
        let camera = Camera::default();
        let behind = camera.eye() * 2.0;
        assert_eq!(camera.project(behind), None);
    }

    #[test]
    fn center_ray_points_at_target() {
        let camera = Camera::default();
        let ray = camera.ray_from_ndc(Vec2::ZERO);
        assert!(ray.point_at(camera.distance).abs_diff_eq(Vec3::ZERO, 1e-2));
    }

    #[test]
    fn projection_and_ray_agree() {
        let camera = Camera { aspect: 1.5, ..Camera::default() };
        let point = Vec3::new(3.0, -2.0, 5.0);
        let (ndc, _) = camera.project(point).unwrap();
        let ray = camera.ray_from_ndc(ndc);
        let to_point = (point - ray.origin).normalize();
        assert!((to_point.dot(ray.direction) - 1.0).abs() < 1e-3);
    }

    #[test]
    fn zoom_is_clamped() {
        let mut camera = Camera::default();
        camera.zoom(100.0);
        assert_eq!(camera.distance, camera.max_distance);
        camera.zoom(0.0);
        assert_eq!(camera.distance, camera.min_distance);
    }
}
