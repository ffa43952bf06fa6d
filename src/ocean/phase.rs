//! Per-frequency phase integration.

use glam::Vec4;
use rand::{rngs::StdRng, Rng, SeedableRng};

use super::{wavevector, GRAVITY, KM};
use crate::field::Field;

const TAU: f32 = 2.0 * std::f32::consts::PI;

/// Dispersion relation: gravity waves with a surface-tension correction
#[inline]
fn angular_frequency(k: f32) -> f32 {
    (GRAVITY * k * (1.0 + (k / KM) * (k / KM))).sqrt()
}

/// Fill a phase field with independent uniform draws in [0, 2pi).
///
/// Runs once at startup; after that the field is owned by the integrator's
/// ping/pong pair.
pub fn seed_phases(out: &mut Field, seed: u64) {
    let mut rng = StdRng::seed_from_u64(seed);
    let resolution = out.resolution();
    for y in 0..resolution {
        for x in 0..resolution {
            let phase = rng.gen::<f32>() * TAU;
            out.store(x, y, Vec4::new(phase, 0.0, 0.0, 0.0));
        }
    }
}

/// Advance every cell's phase by omega(k) * dt, mod 2pi, writing into the
/// other buffer of the ping/pong pair.
pub fn advance_phases(previous: &Field, next: &mut Field, dt: f32, domain_size: f32) {
    let resolution = next.resolution();

    for y in 0..resolution {
        for x in 0..resolution {
            let k = wavevector(x, y, resolution, domain_size).length();
            let phase = previous.fetch(x, y).x;
            let advanced = (phase + angular_frequency(k) * dt) % TAU;
            next.store(x, y, Vec4::new(advanced, 0.0, 0.0, 0.0));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_phases_in_range() {
        let mut field = Field::square(16, 1);
        seed_phases(&mut field, 7);
        for y in 0..16 {
            for x in 0..16 {
                let p = field.fetch(x, y).x;
                assert!((0.0..TAU).contains(&p), "phase {p} out of range");
            }
        }
    }

    #[test]
    fn test_seed_phases_deterministic() {
        let mut a = Field::square(8, 1);
        let mut b = Field::square(8, 1);
        seed_phases(&mut a, 42);
        seed_phases(&mut b, 42);
        assert_eq!(a.data(), b.data());
    }

    #[test]
    fn test_phases_stay_in_range_over_many_steps() {
        let mut ping = Field::square(8, 1);
        let mut pong = Field::square(8, 1);
        seed_phases(&mut ping, 3);

        for step in 0..500 {
            // Alternate buffers; vary dt including zero
            let dt = match step % 3 {
                0 => 0.0,
                1 => 1.0 / 60.0,
                _ => 2.5,
            };
            if step % 2 == 0 {
                advance_phases(&ping, &mut pong, dt, 256.0);
            } else {
                advance_phases(&pong, &mut ping, dt, 256.0);
            }
        }

        for field in [&ping, &pong] {
            for y in 0..8 {
                for x in 0..8 {
                    let p = field.fetch(x, y).x;
                    assert!((0.0..TAU).contains(&p), "phase {p} escaped [0, 2pi)");
                }
            }
        }
    }

    #[test]
    fn test_zero_dt_preserves_phase() {
        let mut ping = Field::square(8, 1);
        let mut pong = Field::square(8, 1);
        seed_phases(&mut ping, 9);
        advance_phases(&ping, &mut pong, 0.0, 256.0);
        assert_eq!(ping.data(), pong.data());
    }
}
