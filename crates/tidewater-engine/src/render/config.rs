use glam::{Mat4, Vec3};

use crate::camera::{CameraController, Projection};
use crate::render::MeshKind;

/// How the background cube map is drawn.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum SkyboxMode {
    /// Full-screen triangle; the fragment shader unprojects through
    /// `inverse(projection · direction_view)`.
    #[default]
    InverseViewProjection,
    /// Unit cube transformed by `projection · direction_view`.
    DirectView,
}

/// Static scene configuration, fixed at setup.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneConfig {
    pub mesh: MeshKind,
    pub skybox_mode: SkyboxMode,
    /// Whether skybox fragments write depth.
    pub skybox_depth_write: bool,
    /// Water camera position.
    pub eye: Vec3,
    pub model: Mat4,
    pub projection: Projection,
    /// Linear RGBA.
    pub clear_color: [f64; 4],
    pub camera_yaw: f32,
    pub camera_pitch: f32,
    pub camera_sensitivity: f32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            mesh: MeshKind::default(),
            skybox_mode: SkyboxMode::default(),
            skybox_depth_write: true,
            eye: Vec3::new(0.0, 0.75, -2.5),
            model: Mat4::IDENTITY,
            projection: Projection::default(),
            clear_color: [133.0 / 255.0, 211.0 / 255.0, 241.0 / 255.0, 1.0],
            camera_yaw: 0.0,
            camera_pitch: -0.25,
            camera_sensitivity: CameraController::DEFAULT_SENSITIVITY,
        }
    }
}

impl SceneConfig {
    /// Replaces invalid values with defaults, logging each substitution.
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();

        if let MeshKind::Plane { size, detail } = &mut self.mesh {
            if *detail == 0 {
                log::warn!(
                    "plane detail 0 is invalid; using {}",
                    MeshKind::DEFAULT_PLANE_DETAIL
                );
                *detail = MeshKind::DEFAULT_PLANE_DETAIL;
            }
            if *detail > MeshKind::MAX_PLANE_DETAIL {
                log::warn!(
                    "plane detail {detail} is too large; clamping to {}",
                    MeshKind::MAX_PLANE_DETAIL
                );
                *detail = MeshKind::MAX_PLANE_DETAIL;
            }
            if !(size.is_finite() && *size > 0.0) {
                log::warn!(
                    "plane size {size} is invalid; using {}",
                    MeshKind::DEFAULT_PLANE_SIZE
                );
                *size = MeshKind::DEFAULT_PLANE_SIZE;
            }
        }

        let p = self.projection;
        let projection_ok = p.fov_y.is_finite()
            && p.fov_y > 0.0
            && p.fov_y < std::f32::consts::PI
            && p.near > 0.0
            && p.far > p.near
            && p.far.is_finite();
        if !projection_ok {
            log::warn!("projection {p:?} is invalid; using defaults");
            self.projection = defaults.projection;
        }

        if !self.eye.is_finite() {
            log::warn!("eye {:?} is not finite; using default", self.eye);
            self.eye = defaults.eye;
        }

        if !self.model.is_finite() {
            log::warn!("model matrix is not finite; using identity");
            self.model = defaults.model;
        }

        if !(self.camera_sensitivity.is_finite() && self.camera_sensitivity > 0.0) {
            log::warn!(
                "camera sensitivity {} is invalid; using {}",
                self.camera_sensitivity,
                defaults.camera_sensitivity
            );
            self.camera_sensitivity = defaults.camera_sensitivity;
        }

        self
    }

    pub fn camera(&self) -> CameraController {
        CameraController::new(self.camera_yaw, self.camera_pitch, self.camera_sensitivity)
    }

    pub fn clear_color(&self) -> wgpu::Color {
        let [r, g, b, a] = self.clear_color;
        wgpu::Color { r, g, b, a }
    }
}
