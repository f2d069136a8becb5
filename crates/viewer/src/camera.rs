use glam::{Mat4, Vec3};
use pointview_core::Aabb;

const ZOOM_STEP: f32 = 1.20;
const ORBIT_SPEED: f32 = 0.01;
// Keep the eye off the poles so the up vector never aligns with the view direction.
const MAX_PITCH: f32 = 1.54;

/// Camera orbiting a fixed focal point, with +Y as the turntable axis.
///
/// At `yaw = pitch = 0` the eye sits on the +Z side of the target looking
/// down -Z.
#[derive(Debug, Clone, PartialEq)]
pub struct TurntableCamera {
    pub target: Vec3,
    pub distance: f32,
    pub yaw: f32,
    pub pitch: f32,
    pub fov_y_rad: f32,
    radius: f32,
    home_distance: f32,
}

impl Default for TurntableCamera {
    fn default() -> Self {
        Self {
            target: Vec3::ZERO,
            distance: 5.0,
            yaw: 0.0,
            pitch: 0.0,
            fov_y_rad: 45.0f32.to_radians(),
            radius: 1.0,
            home_distance: 5.0,
        }
    }
}

impl TurntableCamera {
    /// Camera looking at the whole box from the default direction.
    pub fn framing(aabb: &Aabb) -> Self {
        let mut camera = Self::default();
        camera.frame(aabb);
        camera
    }

    /// Centers on `aabb` and backs off until its bounding sphere fits the view.
    pub fn frame(&mut self, aabb: &Aabb) {
        self.target = Vec3::from_array(aabb.center());
        self.radius = (0.5 * aabb.diagonal()).max(1e-3);
        self.home_distance = 1.1 * self.radius / (0.5 * self.fov_y_rad).sin();
        self.reset();
    }

    /// Back to the framed view.
    pub fn reset(&mut self) {
        self.distance = self.home_distance;
        self.yaw = 0.0;
        self.pitch = 0.0;
    }

    pub fn home_distance(&self) -> f32 {
        self.home_distance
    }

    fn direction(&self) -> Vec3 {
        let (sy, cy) = self.yaw.sin_cos();
        let (sp, cp) = self.pitch.sin_cos();
        Vec3::new(cp * sy, sp, cp * cy)
    }

    pub fn eye(&self) -> Vec3 {
        self.target + self.direction() * self.distance
    }

    /// Eye position the camera returns to on [`reset`](Self::reset).
    pub fn home_eye(&self) -> Vec3 {
        self.target + Vec3::Z * self.home_distance
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye(), self.target, Vec3::Y)
    }

    /// Depth range wide enough to hold the framed bounding sphere from any orbit position.
    pub fn clip_planes(&self) -> (f32, f32) {
        let near = (self.distance - self.radius).max(self.distance * 1e-3).max(1e-4);
        let far = self.distance + self.radius * 2.0;
        (near, far)
    }

    pub fn projection_matrix(&self, aspect_ratio: f32) -> Mat4 {
        let (near, far) = self.clip_planes();
        Mat4::perspective_rh(self.fov_y_rad, aspect_ratio.max(1e-3), near, far)
    }

    pub fn view_projection(&self, aspect_ratio: f32) -> Mat4 {
        self.projection_matrix(aspect_ratio) * self.view_matrix()
    }

    /// Rotates by a pointer drag measured in screen points.
    pub fn orbit(&mut self, dx: f32, dy: f32) {
        self.yaw = (self.yaw - dx * ORBIT_SPEED) % std::f32::consts::TAU;
        self.pitch = (self.pitch + dy * ORBIT_SPEED).clamp(-MAX_PITCH, MAX_PITCH);
    }

    /// Moves toward the target for positive `steps`, away for negative.
    pub fn zoom(&mut self, steps: f32) {
        let scale = ZOOM_STEP.powf(-steps);
        let min_distance = (self.radius * 0.05).max(1e-3);
        let max_distance = (self.home_distance * 20.0).max(min_distance);
        self.distance = (self.distance * scale).clamp(min_distance, max_distance);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_box() -> Aabb {
        Aabb::from_xyz(&[-1.0, 1.0], &[-1.0, 1.0], &[-1.0, 1.0])
    }

    #[test]
    fn framing_centers_on_box() {
        let aabb = Aabb::from_xyz(&[2.0, 4.0], &[0.0, 2.0], &[-2.0, 0.0]);
        let camera = TurntableCamera::framing(&aabb);
        assert_eq!(camera.target, Vec3::new(3.0, 1.0, -1.0));
        let eye = camera.eye();
        assert!((eye.x - 3.0).abs() < 1e-5);
        assert!(eye.z > camera.target.z);
        assert_eq!(camera.home_eye(), eye);
    }

    #[test]
    fn framed_box_projects_inside_clip_space() {
        let camera = TurntableCamera::framing(&unit_box());
        let vp = camera.view_projection(1.0);
        for corner in [
            Vec3::new(-1.0, -1.0, -1.0),
            Vec3::new(1.0, 1.0, 1.0),
            Vec3::new(1.0, -1.0, 1.0),
        ] {
            let ndc = vp.project_point3(corner);
            assert!(ndc.x.abs() <= 1.0 && ndc.y.abs() <= 1.0, "{:?}", ndc);
            assert!((0.0..=1.0).contains(&ndc.z), "{:?}", ndc);
        }
    }

    #[test]
    fn orbit_keeps_distance_and_clamps_pitch() {
        let mut camera = TurntableCamera::framing(&unit_box());
        let d = (camera.eye() - camera.target).length();
        camera.orbit(120.0, 10_000.0);
        assert!((camera.pitch - MAX_PITCH).abs() < 1e-6);
        assert!(((camera.eye() - camera.target).length() - d).abs() < 1e-4);
    }

    #[test]
    fn zoom_is_bounded_and_reset_restores() {
        let mut camera = TurntableCamera::framing(&unit_box());
        let home = camera.distance;
        camera.zoom(1.0);
        assert!(camera.distance < home);
        camera.zoom(-1000.0);
        assert!((camera.distance - home * 20.0).abs() < 1e-3);
        camera.zoom(1000.0);
        assert!(camera.distance > 0.0);
        camera.orbit(50.0, 50.0);
        camera.reset();
        assert_eq!(camera.distance, home);
        assert_eq!((camera.yaw, camera.pitch), (0.0, 0.0));
    }

    #[test]
    fn empty_box_still_gives_usable_camera() {
        let camera = TurntableCamera::framing(&Aabb::empty());
        assert!(camera.distance > 0.0);
        let (near, far) = camera.clip_planes();
        assert!(near > 0.0 && far > near);
    }
}
