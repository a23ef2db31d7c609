use glam::{Mat4, Vec3};
use std::f32::consts::{FRAC_PI_2, TAU};
use wavefield_common::CameraConfig;
use wavefield_render::RenderView;

/// Keeps the camera off the poles, where the look-at basis degenerates.
const ELEVATION_LIMIT: f32 = FRAC_PI_2 - 0.01;

/// Input accumulated since the last `update`.
#[derive(Debug, Clone, Copy)]
struct PendingMotion {
    azimuth: f32,
    elevation: f32,
    pan: Vec3,
    scale: f32,
}

impl Default for PendingMotion {
    fn default() -> Self {
        Self {
            azimuth: 0.0,
            elevation: 0.0,
            pan: Vec3::ZERO,
            scale: 1.0,
        }
    }
}

/// Perspective camera orbiting a target point.
///
/// Position is kept in spherical coordinates around `target`: `azimuth` is
/// measured around +Y from +Z, `elevation` up from the XZ plane. Rotate, pan
/// and zoom requests accumulate and are applied by [`OrbitCamera::update`],
/// which runs once per frame. With damping on, each update applies a fraction
/// of the pending rotation and pan so motion eases out over later frames.
#[derive(Debug, Clone)]
pub struct OrbitCamera {
    pub target: Vec3,
    pub radius: f32,
    pub azimuth: f32,
    pub elevation: f32,
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pending: PendingMotion,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::from_config(&CameraConfig::default())
    }
}

impl OrbitCamera {
    pub fn from_config(config: &CameraConfig) -> Self {
        Self {
            target: Vec3::ZERO,
            radius: config.distance,
            azimuth: 0.0,
            elevation: 0.0,
            fov: config.fov_degrees.to_radians(),
            aspect: 16.0 / 9.0,
            near: config.near,
            far: config.far,
            min_distance: config.near,
            max_distance: config.far,
            enable_damping: config.enable_damping,
            damping_factor: config.damping_factor,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            pending: PendingMotion::default(),
        }
    }

    pub fn position(&self) -> Vec3 {
        let (sin_az, cos_az) = self.azimuth.sin_cos();
        let (sin_el, cos_el) = self.elevation.sin_cos();
        self.target + self.radius * Vec3::new(cos_el * sin_az, sin_el, cos_el * cos_az)
    }

    pub fn forward(&self) -> Vec3 {
        (self.target - self.position()).normalize()
    }

    pub fn right(&self) -> Vec3 {
        self.forward().cross(Vec3::Y).normalize()
    }

    pub fn up(&self) -> Vec3 {
        self.right().cross(self.forward())
    }

    /// Queue a rotation from a pointer drag of `dx, dy` pixels. A drag across
    /// the full viewport height turns the camera once around.
    pub fn rotate(&mut self, dx: f32, dy: f32, viewport_height: f32) {
        let h = viewport_height.max(1.0);
        self.pending.azimuth -= TAU * dx / h * self.rotate_speed;
        self.pending.elevation += TAU * dy / h * self.rotate_speed;
    }

    /// Queue a pan from a pointer drag of `dx, dy` pixels. The target moves so
    /// that points at the target's depth follow the pointer.
    pub fn pan(&mut self, dx: f32, dy: f32, viewport_height: f32) {
        let h = viewport_height.max(1.0);
        let visible_half_height = self.radius * (self.fov * 0.5).tan();
        let per_pixel = 2.0 * visible_half_height / h;
        self.pending.pan += -self.right() * dx * per_pixel + self.up() * dy * per_pixel;
    }

    /// Queue a zoom. Positive steps move toward the target.
    pub fn zoom(&mut self, steps: f32) {
        self.pending.scale *= 0.95_f32.powf(steps * self.zoom_speed);
    }

    /// Apply queued motion. Call once per frame.
    pub fn update(&mut self) {
        let factor = if self.enable_damping {
            self.damping_factor
        } else {
            1.0
        };

        self.azimuth = (self.azimuth + self.pending.azimuth * factor) % TAU;
        self.elevation = (self.elevation + self.pending.elevation * factor)
            .clamp(-ELEVATION_LIMIT, ELEVATION_LIMIT);
        self.target += self.pending.pan * factor;
        self.radius = (self.radius * self.pending.scale).clamp(self.min_distance, self.max_distance);

        if self.enable_damping {
            let keep = 1.0 - self.damping_factor;
            self.pending.azimuth *= keep;
            self.pending.elevation *= keep;
            self.pending.pan *= keep;
        } else {
            self.pending.azimuth = 0.0;
            self.pending.elevation = 0.0;
            self.pending.pan = Vec3::ZERO;
        }
        self.pending.scale = 1.0;
    }

    /// Return to the starting pose, dropping queued motion.
    pub fn reset(&mut self, config: &CameraConfig) {
        let aspect = self.aspect;
        *self = Self::from_config(config);
        self.aspect = aspect;
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position(), self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    pub fn render_view(&self) -> RenderView {
        RenderView {
            eye: self.position(),
            target: self.target,
            fov_degrees: self.fov.to_degrees(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-4;

    fn undamped() -> OrbitCamera {
        OrbitCamera {
            enable_damping: false,
            ..OrbitCamera::default()
        }
    }

    #[test]
    fn default_camera() {
        let cam = OrbitCamera::default();
        assert!((cam.position() - Vec3::new(0.0, 0.0, 3.0)).length() < EPS);
        assert!((cam.fov.to_degrees() - 75.0).abs() < EPS);
        let vp = cam.view_projection();
        // Should produce a valid matrix (no NaN)
        assert!(!vp.col(0).x.is_nan());
    }

    #[test]
    fn rotation_keeps_distance() {
        let mut cam = undamped();
        cam.rotate(120.0, -45.0, 720.0);
        cam.update();
        assert!((cam.position().length() - 3.0).abs() < EPS);
        assert!(cam.azimuth != 0.0);
        assert!(cam.elevation != 0.0);
    }

    #[test]
    fn full_height_drag_turns_once() {
        let mut cam = undamped();
        cam.rotate(720.0, 0.0, 720.0);
        cam.update();
        assert!((cam.position() - Vec3::new(0.0, 0.0, 3.0)).length() < 1e-3);
    }

    #[test]
    fn elevation_clamped_at_poles() {
        let mut cam = undamped();
        cam.rotate(0.0, 10_000.0, 100.0);
        cam.update();
        assert!(cam.elevation <= ELEVATION_LIMIT);
        assert!(!cam.view_matrix().col(0).x.is_nan());
    }

    #[test]
    fn zoom_moves_closer_and_clamps() {
        let mut cam = undamped();
        cam.zoom(1.0);
        cam.update();
        assert!(cam.radius < 3.0);

        cam.zoom(10_000.0);
        cam.update();
        assert!((cam.radius - cam.min_distance).abs() < EPS);

        cam.zoom(-10_000.0);
        cam.update();
        assert!((cam.radius - cam.max_distance).abs() < EPS);
    }

    #[test]
    fn pan_moves_target_sideways() {
        let mut cam = undamped();
        cam.pan(100.0, 0.0, 720.0);
        cam.update();
        assert!(cam.target.x < 0.0);
        assert!(cam.target.y.abs() < EPS);
        assert!(((cam.position() - cam.target).length() - 3.0).abs() < EPS);
    }

    #[test]
    fn damping_eases_out() {
        let mut cam = OrbitCamera::default();
        assert!(cam.enable_damping);
        cam.rotate(100.0, 0.0, 720.0);
        let total = -TAU * 100.0 / 720.0;

        cam.update();
        let first = cam.azimuth;
        assert!((first - total * cam.damping_factor).abs() < EPS);

        cam.update();
        let second = cam.azimuth - first;
        assert!(second.abs() < first.abs());
        assert!(second.signum() == first.signum());

        for _ in 0..500 {
            cam.update();
        }
        assert!((cam.azimuth - total).abs() < 1e-3);
    }

    #[test]
    fn reset_restores_pose() {
        let config = CameraConfig::default();
        let mut cam = undamped();
        cam.aspect = 2.0;
        cam.rotate(50.0, 50.0, 720.0);
        cam.zoom(3.0);
        cam.update();
        cam.reset(&config);
        assert!((cam.position() - Vec3::new(0.0, 0.0, 3.0)).length() < EPS);
        assert_eq!(cam.aspect, 2.0);
    }

    #[test]
    fn render_view_matches_camera() {
        let cam = OrbitCamera::default();
        let view = cam.render_view();
        assert_eq!(view.target, Vec3::ZERO);
        assert!((view.fov_degrees - 75.0).abs() < EPS);
        assert!((view.eye - cam.position()).length() < EPS);
    }
}
