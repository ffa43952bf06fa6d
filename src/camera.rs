//! Photograph-calibrated camera and screen-ray geometry.

use glam::{Mat4, Vec2, Vec3, Vec4};

use crate::params::CameraParams;

/// Camera state derived once per frame from the calibration parameters:
/// view-projection matrix, its inverse, and the eye position.
#[derive(Debug, Clone)]
pub struct Camera {
    position: Vec3,
    view_proj: Mat4,
    view_proj_inverse: Mat4,
}

impl Camera {
    /// Build the camera for the given aspect ratio.
    ///
    /// The eye sits at (0, height, 0); the pitch angle tilts the view from
    /// straight down (0 deg) past the horizon (90 deg), matching the
    /// photograph calibration convention.
    pub fn new(params: &CameraParams, aspect_ratio: f32) -> Self {
        let angle = params.angle_deg.to_radians();
        let eye = Vec3::new(0.0, params.height_m, 0.0);
        let target = Vec3::new(
            0.0,
            params.height_m * (1.0 - angle.cos()),
            params.height_m * angle.sin(),
        );

        let view = Mat4::look_at_rh(eye, target, Vec3::Y);
        let proj = Mat4::perspective_rh(
            params.fov_deg.to_radians(),
            aspect_ratio,
            params.near_m,
            params.far_m,
        );
        let view_proj = proj * view;

        Self {
            position: eye,
            view_proj,
            view_proj_inverse: view_proj.inverse(),
        }
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn view_proj(&self) -> Mat4 {
        self.view_proj
    }

    pub fn view_proj_inverse(&self) -> Mat4 {
        self.view_proj_inverse
    }

    /// Intersect the view ray through an NDC point with the water plane
    /// (y = 0). Returns `None` when the ray does not descend toward the
    /// plane (sky pixels).
    pub fn water_plane_point(&self, ndc: Vec2) -> Option<Vec3> {
        let near = self.view_proj_inverse * Vec4::new(ndc.x, ndc.y, 0.0, 1.0);
        let far = self.view_proj_inverse * Vec4::new(ndc.x, ndc.y, 1.0, 1.0);
        let near = near.truncate() / near.w;
        let far = far.truncate() / far.w;

        if near.y - far.y <= 0.0 {
            return None;
        }
        Some((near * far.y - far * near.y) / (far.y - near.y))
    }

    /// Project a world position to NDC
    pub fn world_to_ndc(&self, position: Vec3) -> Vec2 {
        let clip = self.view_proj * position.extend(1.0);
        Vec2::new(clip.x, clip.y) / clip.w
    }
}
