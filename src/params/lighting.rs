//! Ambient lighting and water color parameters.

use glam::Vec3;

/// Ambient lighting configuration.
///
/// The environment light is a 2nd-order spherical-harmonics fit of the
/// photograph's sky: 9 RGB coefficients ordered (l=0,m=0), (1,0), (1,+1),
/// (1,-1), (2,0), (2,+1), (2,-1), (2,+2), (2,-2).
#[derive(Debug, Clone)]
pub struct LightingParams {
    /// SH coefficients, one RGB triple per basis function
    pub sh_coefficients: [Vec3; 9],

    /// Flat base color used when a refracted ray leaves the scene
    pub ocean_color: Vec3,
}

impl Default for LightingParams {
    fn default() -> Self {
        // Neutral overcast: constant band only, scaled so the reconstructed
        // radiance is ~1.0 (basis0 = 1/sqrt(4*pi))
        let mut sh_coefficients = [Vec3::ZERO; 9];
        sh_coefficients[0] = Vec3::splat(3.5449077);
        Self {
            sh_coefficients,
            ocean_color: Vec3::ONE,
        }
    }
}
