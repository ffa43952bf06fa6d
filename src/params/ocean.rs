//! Wave simulation parameters.

use glam::Vec2;

use super::ConfigError;

/// Wave simulation parameters
#[derive(Debug, Clone)]
pub struct WaveParams {
    /// Wind speed in meters per second (range 0.1-30)
    pub wind_speed_m_per_s: f32,

    /// Wind direction in degrees (0 = +x, counter-clockwise)
    pub wind_direction_deg: f32,

    /// Horizontal crest displacement exaggeration (range 0-3, 0 = no chop)
    pub choppiness: f32,

    /// Physical extent of the simulated patch in meters (range 32-2048)
    pub domain_size_m: f32,

    /// Simulation grid resolution (texels per side, power of two)
    pub resolution: usize,

    /// Phase integration speed multiplier (1.0 = real time)
    pub playback_speed: f32,

    /// Seed for the initial random phase field
    pub phase_seed: u64,
}

impl Default for WaveParams {
    fn default() -> Self {
        Self {
            wind_speed_m_per_s: 10.0,
            wind_direction_deg: 0.0,
            choppiness: 1.0,
            domain_size_m: 256.0,
            resolution: 1024,
            playback_speed: 1.0,
            phase_seed: 42,
        }
    }
}

impl WaveParams {
    pub const MIN_DOMAIN_SIZE_M: f32 = 32.0;
    pub const MAX_DOMAIN_SIZE_M: f32 = 2048.0;
    pub const MAX_CHOPPINESS: f32 = 3.0;

    /// Wind vector in frequency-space convention (speed scaled direction)
    pub fn wind_vector(&self) -> Vec2 {
        let dir = self.wind_direction_deg.to_radians();
        Vec2::new(
            self.wind_speed_m_per_s * dir.cos(),
            self.wind_speed_m_per_s * dir.sin(),
        )
    }

    /// Reject configurations the pipeline cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.resolution < 2 || !self.resolution.is_power_of_two() {
            return Err(ConfigError::ResolutionNotPowerOfTwo(self.resolution));
        }
        if !(Self::MIN_DOMAIN_SIZE_M..=Self::MAX_DOMAIN_SIZE_M).contains(&self.domain_size_m) {
            return Err(ConfigError::DomainSizeOutOfRange {
                got: self.domain_size_m,
                min: Self::MIN_DOMAIN_SIZE_M,
                max: Self::MAX_DOMAIN_SIZE_M,
            });
        }
        if !(0.0..=Self::MAX_CHOPPINESS).contains(&self.choppiness) {
            return Err(ConfigError::ChoppinessOutOfRange {
                got: self.choppiness,
                max: Self::MAX_CHOPPINESS,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_params_validate() {
        assert!(WaveParams::default().validate().is_ok());
    }

    #[test]
    fn test_non_power_of_two_rejected() {
        let params = WaveParams {
            resolution: 1000,
            ..WaveParams::default()
        };
        assert!(matches!(
            params.validate(),
            Err(ConfigError::ResolutionNotPowerOfTwo(1000))
        ));
    }

    #[test]
    fn test_domain_size_bounds() {
        let params = WaveParams {
            domain_size_m: 4096.0,
            ..WaveParams::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_wind_vector_direction() {
        let params = WaveParams {
            wind_speed_m_per_s: 10.0,
            wind_direction_deg: 90.0,
            ..WaveParams::default()
        };
        let wind = params.wind_vector();
        assert!(wind.x.abs() < 1e-5);
        assert!((wind.y - 10.0).abs() < 1e-5);
    }
}
