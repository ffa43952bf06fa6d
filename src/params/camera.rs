//! Photograph-calibrated camera parameters.

/// Camera parameters fitted to the active photograph.
///
/// The camera sits on the vertical axis above the water plane and pitches
/// toward the horizon; height and angle are the values a photograph's
/// calibration supplies.
#[derive(Debug, Clone)]
pub struct CameraParams {
    /// Eye height above the water plane (meters, range 1-75)
    pub height_m: f32,

    /// Pitch angle from straight down (degrees, range 45-105; 90 = horizontal)
    pub angle_deg: f32,

    /// Vertical field of view (degrees, range 30-120)
    pub fov_deg: f32,

    /// Near clipping plane (meters)
    pub near_m: f32,

    /// Far clipping plane (meters)
    pub far_m: f32,
}

impl Default for CameraParams {
    fn default() -> Self {
        Self {
            height_m: 15.0,
            angle_deg: 80.0,
            fov_deg: 60.0,
            near_m: 0.1,
            far_m: 3000.0,
        }
    }
}
