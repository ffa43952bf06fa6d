//! Wind-wave spectrum passes.
//!
//! The initial pass evaluates a two-scale (gravity + capillary) spectral
//! density with a JONSWAP-like peak enhancement and directional spreading,
//! after Elfouhaily et al.; the update pass combines that static amplitude
//! with the current phase into the time-domain complex spectrum.

use glam::{Vec2, Vec4};

use super::{wavevector, GRAVITY, KM};
use crate::field::Field;

/// Capillary peak phase speed constant (m/s)
const CM: f32 = 0.23;
/// Inverse wave age (fully developed sea)
const OMEGA: f32 = 0.84;

fn angular_frequency(k: f32) -> f32 {
    (GRAVITY * k * (1.0 + (k / KM) * (k / KM))).sqrt()
}

/// Evaluate the directional spectral density S(K) for wavevector `k_vec`
fn spectral_density(k_vec: Vec2, wind: Vec2) -> f32 {
    let k = k_vec.length();
    let wind_speed = wind.length();

    let kp = GRAVITY * (OMEGA / wind_speed) * (OMEGA / wind_speed);

    let c = angular_frequency(k) / k;
    let cp = angular_frequency(kp) / kp;

    // Long-wave (gravity) branch with JONSWAP-like peak enhancement
    let lpm = (-1.25 * (kp / k) * (kp / k)).exp();
    let gamma = 1.7f32;
    let sigma = 0.08 * (1.0 + 4.0 * OMEGA.powf(-3.0));
    let big_gamma = (-((k / kp).sqrt() - 1.0).powi(2) / 2.0 * sigma * sigma).exp();
    let jp = gamma.powf(big_gamma);
    let fp = lpm * jp * (-OMEGA / 10.0f32.sqrt() * ((k / kp).sqrt() - 1.0)).exp();
    let alpha_p = 0.006 * OMEGA.sqrt();
    let bl = 0.5 * alpha_p * cp / c * fp;

    // Short-wave (capillary) branch driven by friction velocity
    let z0 = 0.000037 * wind_speed * wind_speed / GRAVITY * (wind_speed / cp).powf(0.9);
    let u_star = 0.41 * wind_speed / (10.0 / z0).ln();
    let alpha_m = 0.01
        * if u_star < CM {
            1.0 + (u_star / CM).ln()
        } else {
            1.0 + 3.0 * (u_star / CM).ln()
        };
    let fm = (-0.25 * (k / KM - 1.0) * (k / KM - 1.0)).exp();
    let bh = 0.5 * alpha_m * CM / c * fm * lpm;

    // Directional spreading
    let a0 = 2.0f32.ln() / 4.0;
    let am = 0.13 * u_star / CM;
    let delta = (a0 + 4.0 * (c / cp).powf(2.5) + am * (CM / c).powf(2.5)).tanh();
    let cos_phi = wind.normalize().dot(k_vec.normalize());

    (1.0 / (2.0 * std::f32::consts::PI))
        * k.powf(-4.0)
        * (bl + bh)
        * (1.0 + delta * (2.0 * cos_phi * cos_phi - 1.0))
}

/// Generate the static amplitude spectrum into a 1-channel field.
///
/// Runs only when wind, domain size, or resolution change; output is stable
/// across frames otherwise.
pub fn generate_initial_spectrum(out: &mut Field, wind: Vec2, domain_size: f32) {
    let resolution = out.resolution();
    let dk = 2.0 * std::f32::consts::PI / domain_size;

    for y in 0..resolution {
        for x in 0..resolution {
            let k_vec = wavevector(x, y, resolution, domain_size);
            // No DC term
            if k_vec == Vec2::ZERO {
                out.store(x, y, Vec4::ZERO);
                continue;
            }
            let s = spectral_density(k_vec, wind);
            let amplitude = (s / 2.0).sqrt() * dk;
            out.store(x, y, Vec4::new(amplitude, 0.0, 0.0, 0.0));
        }
    }
}

#[inline]
fn complex_mul(a: Vec2, b: Vec2) -> Vec2 {
    Vec2::new(a.x * b.x - a.y * b.y, a.y * b.x + a.x * b.y)
}

#[inline]
fn mul_by_i(z: Vec2) -> Vec2 {
    Vec2::new(-z.y, z.x)
}

/// Texel index holding the mirrored frequency -K (exact under R-periodic wrap)
#[inline]
pub fn mirror_index(i: usize, resolution: usize) -> usize {
    (resolution - i) % resolution
}

/// Combine the static amplitude and current phase into the time-domain
/// complex spectrum: h(t) = h0 e^{i phi} + h0* e^{-i phi}, plus the
/// choppiness-scaled horizontal displacement spectra.
///
/// Output packs (hx + i*h, hz) into 4 channels, ready for the inverse
/// transform.
pub fn update_spectrum(
    initial: &Field,
    phases: &Field,
    out: &mut Field,
    choppiness: f32,
    domain_size: f32,
) {
    let resolution = out.resolution();

    for y in 0..resolution {
        for x in 0..resolution {
            let k_vec = wavevector(x, y, resolution, domain_size);
            // No DC term
            if k_vec == Vec2::ZERO {
                out.store(x, y, Vec4::ZERO);
                continue;
            }
            let k = k_vec.length();

            let phase = phases.fetch(x, y).x;
            let phase_vector = Vec2::new(phase.cos(), phase.sin());

            let h0 = Vec2::new(initial.fetch(x, y).x, 0.0);
            let mx = mirror_index(x, resolution);
            let my = mirror_index(y, resolution);
            // Conjugate-symmetric counterpart at -K
            let h0_star = Vec2::new(initial.fetch(mx, my).x, 0.0);

            let h = complex_mul(h0, phase_vector)
                + complex_mul(h0_star, Vec2::new(phase_vector.x, -phase_vector.y));

            let hx = -mul_by_i(h * (k_vec.x / k)) * choppiness;
            let hz = -mul_by_i(h * (k_vec.y / k)) * choppiness;

            let packed = hx + mul_by_i(h);
            out.store(x, y, Vec4::new(packed.x, packed.y, hz.x, hz.y));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dc_term_is_zero() {
        let mut field = Field::square(16, 1);
        generate_initial_spectrum(&mut field, Vec2::new(10.0, 0.0), 256.0);
        assert_eq!(field.fetch(0, 0).x, 0.0);
    }

    #[test]
    fn test_spectrum_finite_for_various_winds() {
        for (speed, dir) in [(0.5, 0.0), (10.0, 45.0), (30.0, 170.0)] {
            let wind =
                Vec2::new(speed as f32, 0.0).rotate(Vec2::from_angle((dir as f32).to_radians()));
            let mut field = Field::square(16, 1);
            generate_initial_spectrum(&mut field, wind, 256.0);
            assert!(
                field.data().iter().all(|v| v.is_finite()),
                "non-finite amplitude for wind {speed} m/s @ {dir} deg"
            );
        }
    }

    #[test]
    fn test_amplitude_grows_with_wind() {
        let mut calm = Field::square(32, 1);
        let mut stormy = Field::square(32, 1);
        generate_initial_spectrum(&mut calm, Vec2::new(4.0, 0.0), 256.0);
        generate_initial_spectrum(&mut stormy, Vec2::new(20.0, 0.0), 256.0);
        let energy = |f: &Field| f.data().iter().map(|v| (v * v) as f64).sum::<f64>();
        assert!(energy(&stormy) > energy(&calm));
    }

    #[test]
    fn test_mirror_index_roundtrips() {
        let r = 16;
        for i in 0..r {
            assert_eq!(mirror_index(mirror_index(i, r), r), i);
        }
        // DC maps to itself; everything else to R - i
        assert_eq!(mirror_index(0, r), 0);
        assert_eq!(mirror_index(1, r), 15);
        assert_eq!(mirror_index(8, r), 8);
    }

    #[test]
    fn test_update_spectrum_zero_dc() {
        let mut initial = Field::square(8, 1);
        generate_initial_spectrum(&mut initial, Vec2::new(10.0, 0.0), 256.0);
        let mut phases = Field::square(8, 1);
        phases.fill(Vec4::new(1.0, 0.0, 0.0, 0.0));
        let mut spectrum = Field::square(8, 4);
        update_spectrum(&initial, &phases, &mut spectrum, 1.5, 256.0);
        assert_eq!(spectrum.fetch(0, 0), Vec4::ZERO);
        assert!(spectrum.data().iter().all(|v| v.is_finite()));
    }
}
