use glam::{Mat4, Vec2, Vec3};

const TARGET: Vec3 = Vec3::new(0.0, 30.0, 0.0);
const FOV_Y_DEGREES: f32 = 60.0;
const NEAR: f32 = 0.1;
const FAR: f32 = 5000.0;

/// Fixed perspective camera looking at the launch area.
pub struct Camera {
    view_proj: Mat4,
    focal: f32,
}

impl Camera {
    pub fn new(eye: Vec3, aspect: f32) -> Self {
        let fov = FOV_Y_DEGREES.to_radians();
        let proj = Mat4::perspective_rh_gl(fov, aspect.max(0.1), NEAR, FAR);
        let view = Mat4::look_at_rh(eye, TARGET, Vec3::Y);
        Self {
            view_proj: proj * view,
            focal: 1.0 / (fov * 0.5).tan(),
        }
    }

    /// Normalised device position of `p`, plus NDC units per world unit at its
    /// depth. `None` behind the near plane.
    pub fn project(&self, p: Vec3) -> Option<(Vec2, f32)> {
        let clip = self.view_proj * p.extend(1.0);
        if clip.w <= NEAR {
            return None;
        }
        let ndc = Vec2::new(clip.x, clip.y) / clip.w;
        Some((ndc, self.focal / clip.w))
    }
}
