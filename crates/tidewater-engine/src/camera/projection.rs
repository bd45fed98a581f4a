use std::f32::consts::FRAC_PI_4;

use glam::{Mat4, Vec3};

/// Perspective parameters shared by the water and skybox passes.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Projection {
    /// Vertical field of view in radians.
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
}

impl Projection {
    /// Right-handed perspective with wgpu's `[0, 1]` depth range.
    pub fn matrix(&self, aspect: f32) -> Mat4 {
        let aspect = if aspect.is_finite() && aspect > 0.0 { aspect } else { 1.0 };
        Mat4::perspective_rh(self.fov_y, aspect, self.near, self.far)
    }
}

impl Default for Projection {
    fn default() -> Self {
        Self {
            fov_y: FRAC_PI_4,
            near: 0.1,
            far: 10.0,
        }
    }
}

/// View matrix that only carries orientation: looks from the origin along
/// `forward` with `+Y` up, translation column zeroed.
pub fn direction_view(forward: Vec3) -> Mat4 {
    let mut view = Mat4::look_at_rh(Vec3::ZERO, forward, Vec3::Y);
    view.w_axis.x = 0.0;
    view.w_axis.y = 0.0;
    view.w_axis.z = 0.0;
    view
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::CameraController;

    #[test]
    fn direction_view_has_no_translation() {
        for i in 0..32 {
            let yaw = i as f32 * 0.7;
            let pitch = (i as f32 * 0.31).sin() * 1.4;
            let forward = CameraController::new(yaw, pitch, 0.002).forward();
            let v = direction_view(forward);
            assert_eq!(v.w_axis.x, 0.0);
            assert_eq!(v.w_axis.y, 0.0);
            assert_eq!(v.w_axis.z, 0.0);
            assert_eq!(v.w_axis.w, 1.0);
        }
    }

    #[test]
    fn direction_view_is_stable_without_input() {
        let forward = CameraController::new(0.4, -0.2, 0.002).forward();
        assert_eq!(direction_view(forward), direction_view(forward));
    }

    #[test]
    fn direction_view_maps_forward_to_negative_z() {
        let forward = Vec3::new(1.0, 0.0, 0.0);
        let v = direction_view(forward);
        let p = v.transform_vector3(forward);
        assert!((p - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-5);
    }

    #[test]
    fn degenerate_aspect_falls_back_to_square() {
        let p = Projection::default();
        assert_eq!(p.matrix(0.0), p.matrix(1.0));
        assert_eq!(p.matrix(f32::NAN), p.matrix(1.0));
    }
}
