//! Spectral ocean wave simulation.
//!
//! A Tessendorf-style pipeline over fixed-resolution grid fields: a static
//! wind-wave amplitude spectrum, a per-frequency phase field advanced by the
//! dispersion relation, a time-domain complex spectrum, a 2D inverse Stockham
//! FFT into spatial displacement, and a finite-difference normal estimate.
//! Each pass is data-parallel across cells; the only read/write aliasing
//! hazard (the phase field) is handled by a parity-indexed buffer pair.

mod fft;
mod normal;
mod phase;
mod spectrum;

use glam::{Vec2, Vec3};

use crate::field::{Field, FieldPair, Wrap};
use crate::params::{ConfigError, WaveParams};

/// Gravitational acceleration (m/s^2)
pub(crate) const GRAVITY: f32 = 9.81;
/// Capillary-gravity transition wavenumber (rad/m)
pub(crate) const KM: f32 = 370.0;

/// Map a texel index to its signed frequency index (indices >= R/2 wrap to
/// negative frequencies)
#[inline]
pub(crate) fn frequency_index(texel: usize, resolution: usize) -> f32 {
    if texel < resolution / 2 {
        texel as f32
    } else {
        texel as f32 - resolution as f32
    }
}

/// Wavevector for a frequency-space cell
#[inline]
pub(crate) fn wavevector(x: usize, y: usize, resolution: usize, domain_size: f32) -> Vec2 {
    let n = frequency_index(x, resolution);
    let m = frequency_index(y, resolution);
    2.0 * std::f32::consts::PI * Vec2::new(n, m) / domain_size
}

/// The wave simulation context: every spectral grid buffer plus the pass
/// schedule that advances them once per frame.
pub struct WaveSimulation {
    params: WaveParams,
    /// Static wind-wave amplitude spectrum (1 channel), regenerated on demand
    initial_spectrum: Field,
    /// Per-frequency phase in [0, 2pi), double-buffered
    phases: FieldPair,
    /// Time-domain complex spectrum packing (hx + i*h, hz)
    spectrum: Field,
    /// FFT scratch buffers
    transform_ping: Field,
    transform_pong: Field,
    /// Spatial displacement (dx, height, dz)
    displacement: Field,
    /// Surface normals
    normals: Field,
    frame: u64,
    spectrum_dirty: bool,
}

impl WaveSimulation {
    pub fn new(params: WaveParams) -> Result<Self, ConfigError> {
        params.validate()?;
        let r = params.resolution;

        let mut phases = FieldPair::square(r, 1);
        phase::seed_phases(phases.read_slot_mut(0), params.phase_seed);

        log::info!(
            "wave simulation: {r}x{r} grid, {}m domain, wind {:.1} m/s @ {:.0} deg",
            params.domain_size_m,
            params.wind_speed_m_per_s,
            params.wind_direction_deg
        );

        Ok(Self {
            params,
            initial_spectrum: Field::square(r, 1),
            phases,
            spectrum: Field::square(r, 4),
            transform_ping: Field::square(r, 4),
            transform_pong: Field::square(r, 4),
            displacement: Field::square(r, 4),
            normals: Field::square(r, 4),
            frame: 0,
            spectrum_dirty: true,
        })
    }

    pub fn params(&self) -> &WaveParams {
        &self.params
    }

    pub fn resolution(&self) -> usize {
        self.params.resolution
    }

    /// Spatial displacement field (dx, height, dz per cell)
    pub fn displacement(&self) -> &Field {
        &self.displacement
    }

    /// Surface normal field
    pub fn normals(&self) -> &Field {
        &self.normals
    }

    pub fn set_wind(&mut self, speed_m_per_s: f32, direction_deg: f32) {
        self.params.wind_speed_m_per_s = speed_m_per_s;
        self.params.wind_direction_deg = direction_deg;
        self.spectrum_dirty = true;
    }

    pub fn set_domain_size(&mut self, size_m: f32) -> Result<(), ConfigError> {
        let candidate = WaveParams {
            domain_size_m: size_m,
            ..self.params.clone()
        };
        candidate.validate()?;
        self.params = candidate;
        self.spectrum_dirty = true;
        Ok(())
    }

    pub fn set_choppiness(&mut self, choppiness: f32) -> Result<(), ConfigError> {
        let candidate = WaveParams {
            choppiness,
            ..self.params.clone()
        };
        candidate.validate()?;
        self.params = candidate;
        Ok(())
    }

    pub fn set_playback_speed(&mut self, speed: f32) {
        self.params.playback_speed = speed;
    }

    /// Advance the simulation by one frame.
    ///
    /// Passes run in dependency order: spectrum regeneration (only when wind
    /// or domain parameters changed), phase integration, spectrum update,
    /// inverse FFT, normal estimation.
    pub fn step(&mut self, dt: f32) {
        let size = self.params.domain_size_m;

        if self.spectrum_dirty {
            log::debug!("regenerating initial spectrum");
            spectrum::generate_initial_spectrum(
                &mut self.initial_spectrum,
                self.params.wind_vector(),
                size,
            );
            self.spectrum_dirty = false;
        }

        {
            let (read, write) = self.phases.read_write(self.frame);
            phase::advance_phases(read, write, dt * self.params.playback_speed, size);
        }

        spectrum::update_spectrum(
            &self.initial_spectrum,
            self.phases.written(self.frame),
            &mut self.spectrum,
            self.params.choppiness,
            size,
        );

        fft::inverse_transform(
            &self.spectrum,
            &mut self.transform_ping,
            &mut self.transform_pong,
            &mut self.displacement,
        );

        normal::estimate_normals(&self.displacement, &mut self.normals, size);

        self.frame += 1;
    }

    /// Read-only displacement probe at a world position (used by floating
    /// objects; wraps over the tiling domain)
    pub fn probe_displacement(&self, position_xz: Vec2) -> Vec3 {
        let uv = position_xz / self.params.domain_size_m;
        self.displacement.sample_linear(uv, Wrap::Repeat).truncate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frequency_index_wraps_negative() {
        assert_eq!(frequency_index(0, 8), 0.0);
        assert_eq!(frequency_index(3, 8), 3.0);
        assert_eq!(frequency_index(4, 8), -4.0);
        assert_eq!(frequency_index(7, 8), -1.0);
    }

    #[test]
    fn test_step_produces_finite_fields() {
        let params = WaveParams {
            resolution: 16,
            ..WaveParams::default()
        };
        let mut sim = WaveSimulation::new(params).unwrap();
        sim.step(1.0 / 60.0);
        assert!(sim.displacement().data().iter().all(|v| v.is_finite()));
        assert!(sim.normals().data().iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_invalid_resolution_rejected() {
        let params = WaveParams {
            resolution: 48,
            ..WaveParams::default()
        };
        assert!(WaveSimulation::new(params).is_err());
    }
}
