//! Orbit camera for the 3D viewport (Z-up)

use glam::{Mat4, Vec3, Vec4};

use crate::config::CameraConfig;
use crate::constants::camera::{DEFAULT_DISTANCE, MAX_DISTANCE, MIN_DISTANCE, PITCH_LIMIT_DEGREES};
use crate::scene::Ray;

/// Orbit camera
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    /// Eye position
    pub position: Vec3,
    /// Orbit target / look-at point
    pub target: Vec3,
    /// World up vector
    pub up: Vec3,
    /// Vertical field of view in radians
    pub fov: f32,
    /// Width / height
    pub aspect: f32,
    /// Near clipping plane
    pub near: f32,
    /// Far clipping plane
    pub far: f32,
    /// Orbit yaw around +Z (radians)
    pub yaw: f32,
    /// Orbit pitch above the XY plane (radians)
    pub pitch: f32,
    /// Distance from target
    pub distance: f32,
}

fn pitch_limit() -> f32 {
    PITCH_LIMIT_DEGREES.to_radians()
}

impl Camera {
    /// Create a new camera with default parameters
    pub fn new(aspect: f32) -> Self {
        Self::from_config(&CameraConfig::default(), aspect)
    }

    /// Create a camera using configured lens parameters
    pub fn from_config(config: &CameraConfig, aspect: f32) -> Self {
        let mut camera = Self {
            position: Vec3::ZERO,
            target: Vec3::ZERO,
            up: Vec3::Z,
            fov: config.fov_degrees.clamp(10.0, 120.0).to_radians(),
            aspect,
            near: config.near_plane.max(0.001),
            far: config.far_plane.max(config.near_plane + 1.0),
            yaw: 45.0_f32.to_radians(),
            pitch: 30.0_f32.to_radians(),
            distance: DEFAULT_DISTANCE,
        };
        camera.update_position_from_orbit();
        camera
    }

    /// Update aspect ratio
    pub fn update_aspect(&mut self, aspect: f32) {
        if aspect.is_finite() && aspect > 0.0 {
            self.aspect = aspect;
        }
    }

    /// Orbit the camera around the target
    pub fn orbit(&mut self, delta_yaw: f32, delta_pitch: f32) {
        self.yaw += delta_yaw;
        self.pitch = (self.pitch + delta_pitch).clamp(-pitch_limit(), pitch_limit());
        self.update_position_from_orbit();
    }

    /// Pan the camera (move target), `scale` is world units per pixel at unit distance
    pub fn pan(&mut self, delta_x: f32, delta_y: f32, scale: f32) {
        let forward = (self.target - self.position).normalize_or_zero();
        let right = forward.cross(self.up).normalize_or_zero();
        let up = right.cross(forward).normalize_or_zero();

        let scale = self.distance * scale;
        self.target += right * (-delta_x * scale) + up * (delta_y * scale);
        self.update_position_from_orbit();
    }

    /// Zoom the camera by a scroll delta
    pub fn zoom(&mut self, delta: f32, sensitivity: f32) {
        self.dolly(1.0 - delta * sensitivity);
    }

    /// Multiply the orbit distance by `factor` (< 1 moves closer)
    pub fn dolly(&mut self, factor: f32) {
        if !factor.is_finite() || factor <= 0.0 {
            return;
        }
        self.distance = (self.distance * factor).clamp(MIN_DISTANCE, MAX_DISTANCE);
        self.update_position_from_orbit();
    }

    /// Set field of view in degrees
    pub fn set_fov_degrees(&mut self, fov_degrees: f32) {
        self.fov = fov_degrees.clamp(10.0, 120.0).to_radians();
    }

    /// Get field of view in degrees
    pub fn fov_degrees(&self) -> f32 {
        self.fov.to_degrees()
    }

    /// Place the eye and target directly; orbit state follows
    ///
    /// A position on top of the target keeps the previous orbit direction.
    pub fn set_view(&mut self, position: Vec3, target: Vec3) {
        if !position.is_finite() || !target.is_finite() {
            tracing::warn!("Ignoring non-finite camera view");
            return;
        }
        self.target = target;
        let offset = position - target;
        let distance = offset.length();
        if distance < f32::EPSILON {
            self.update_position_from_orbit();
            return;
        }
        self.distance = distance.clamp(MIN_DISTANCE, MAX_DISTANCE);
        self.yaw = offset.y.atan2(offset.x);
        self.pitch = (offset.z / distance)
            .clamp(-1.0, 1.0)
            .asin()
            .clamp(-pitch_limit(), pitch_limit());
        self.update_position_from_orbit();
    }

    fn update_position_from_orbit(&mut self) {
        let x = self.distance * self.pitch.cos() * self.yaw.cos();
        let y = self.distance * self.pitch.cos() * self.yaw.sin();
        let z = self.distance * self.pitch.sin();
        self.position = self.target + Vec3::new(x, y, z);
    }

    /// Get view matrix
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    /// Get projection matrix
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect, self.near, self.far)
    }

    /// Projection * view
    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Project a world point to clip space (before the perspective divide)
    pub fn world_to_clip(&self, point: Vec3) -> Vec4 {
        self.view_projection() * point.extend(1.0)
    }

    /// Convert pixel coordinates to normalized device coordinates
    pub fn screen_to_ndc(screen_x: f32, screen_y: f32, width: f32, height: f32) -> (f32, f32) {
        let ndc_x = (2.0 * screen_x / width.max(1.0)) - 1.0;
        let ndc_y = 1.0 - (2.0 * screen_y / height.max(1.0));
        (ndc_x, ndc_y)
    }

    /// Build a world-space ray through a point in normalized device coordinates
    pub fn ndc_to_ray(&self, ndc_x: f32, ndc_y: f32) -> Ray {
        let inv_view_proj = self.view_projection().inverse();

        // wgpu depth range is 0..1
        let near = inv_view_proj * Vec4::new(ndc_x, ndc_y, 0.0, 1.0);
        let far = inv_view_proj * Vec4::new(ndc_x, ndc_y, 1.0, 1.0);
        let near = near.truncate() / near.w;
        let far = far.truncate() / far.w;

        Ray::new(near, far - near)
    }

    /// Convert screen coordinates to a world ray
    pub fn screen_to_ray(
        &self,
        screen_x: f32,
        screen_y: f32,
        screen_width: f32,
        screen_height: f32,
    ) -> Ray {
        let (ndc_x, ndc_y) = Self::screen_to_ndc(screen_x, screen_y, screen_width, screen_height);
        self.ndc_to_ray(ndc_x, ndc_y)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn test_set_view_roundtrip() {
        let mut camera = Camera::new(1.0);
        let position = Vec3::new(10.0, 10.0, 10.0);
        camera.set_view(position, Vec3::ZERO);
        assert_relative_eq!(camera.position.x, position.x, epsilon = 1e-3);
        assert_relative_eq!(camera.position.y, position.y, epsilon = 1e-3);
        assert_relative_eq!(camera.position.z, position.z, epsilon = 1e-3);
        assert_relative_eq!(camera.distance, position.length(), epsilon = 1e-4);
    }

    #[test]
    fn test_set_view_ignores_nan() {
        let mut camera = Camera::new(1.0);
        let before = camera.clone();
        camera.set_view(Vec3::NAN, Vec3::ZERO);
        assert_eq!(camera, before);
    }

    #[test]
    fn test_dolly_clamps() {
        let mut camera = Camera::new(1.0);
        camera.dolly(1.0e9);
        assert_eq!(camera.distance, MAX_DISTANCE);
        camera.dolly(0.0);
        assert_eq!(camera.distance, MAX_DISTANCE);
    }

    #[test]
    fn test_center_ray_points_at_target() {
        let mut camera = Camera::new(1.5);
        camera.set_view(Vec3::new(0.0, -10.0, 5.0), Vec3::new(0.0, 0.0, 1.0));
        let ray = camera.screen_to_ray(400.0, 300.0, 800.0, 600.0);
        let expected = (camera.target - camera.position).normalize();
        assert_relative_eq!(ray.direction.dot(expected), 1.0, epsilon = 1e-4);
    }
}
