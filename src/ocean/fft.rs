//! 2D inverse FFT over the packed spectrum, Stockham radix-2 formulation.
//!
//! Each butterfly pass reads one buffer and writes another, so no pass ever
//! transforms in place (the point of the Stockham ordering: no bit-reversal
//! permutation either). Two complex sequences ride in each texel (xy and zw),
//! so one 2D sweep transforms the height and both horizontal displacement
//! spectra together. The last vertical pass writes straight into the
//! displacement field, fusing the final butterfly with its consumer.

use glam::{Vec2, Vec4};

use crate::field::Field;

#[inline]
fn complex_mul(a: Vec2, b: Vec2) -> Vec2 {
    Vec2::new(a.x * b.x - a.y * b.y, a.y * b.x + a.x * b.y)
}

#[derive(Copy, Clone)]
enum Direction {
    Horizontal,
    Vertical,
}

/// One Stockham butterfly stage.
///
/// For output index i: the even input sits at
/// `floor(i / sub) * sub/2 + i mod sub/2`, the odd input a half-transform
/// away, and the twiddle is `e^{-2 pi i (i / sub)}`.
fn subtransform(input: &Field, output: &mut Field, subtransform_size: usize, dir: Direction) {
    let resolution = output.resolution();
    let half = subtransform_size / 2;

    for y in 0..resolution {
        for x in 0..resolution {
            let index = match dir {
                Direction::Horizontal => x,
                Direction::Vertical => y,
            };
            let even_index = (index / subtransform_size) * half + index % half;
            let odd_index = even_index + resolution / 2;

            let (even, odd) = match dir {
                Direction::Horizontal => (input.fetch(even_index, y), input.fetch(odd_index, y)),
                Direction::Vertical => (input.fetch(x, even_index), input.fetch(x, odd_index)),
            };

            let twiddle_argument =
                -2.0 * std::f32::consts::PI * (index as f32 / subtransform_size as f32);
            let twiddle = Vec2::new(twiddle_argument.cos(), twiddle_argument.sin());

            let output_a =
                Vec2::new(even.x, even.y) + complex_mul(twiddle, Vec2::new(odd.x, odd.y));
            let output_b =
                Vec2::new(even.z, even.w) + complex_mul(twiddle, Vec2::new(odd.z, odd.w));

            output.store(x, y, Vec4::new(output_a.x, output_a.y, output_b.x, output_b.y));
        }
    }
}

/// Run the full 2D transform: log2(R) horizontal stages, then log2(R)
/// vertical stages, ping-ponging between the two scratch fields. The final
/// vertical stage writes into `displacement`.
pub fn inverse_transform(
    spectrum: &Field,
    ping: &mut Field,
    pong: &mut Field,
    displacement: &mut Field,
) {
    let resolution = spectrum.resolution();
    debug_assert!(resolution.is_power_of_two());
    let stages = resolution.trailing_zeros() as usize;

    // First horizontal stage reads the spectrum directly
    subtransform(spectrum, ping, 2, Direction::Horizontal);
    let mut ping_holds_current = true;

    for stage in 1..stages {
        let subtransform_size = 1 << (stage + 1);
        if ping_holds_current {
            subtransform(ping, pong, subtransform_size, Direction::Horizontal);
        } else {
            subtransform(pong, ping, subtransform_size, Direction::Horizontal);
        }
        ping_holds_current = !ping_holds_current;
    }

    for stage in 0..stages {
        let subtransform_size = 1 << (stage + 1);
        if stage == stages - 1 {
            let input = if ping_holds_current { &*ping } else { &*pong };
            subtransform(input, displacement, subtransform_size, Direction::Vertical);
        } else if ping_holds_current {
            subtransform(ping, pong, subtransform_size, Direction::Vertical);
            ping_holds_current = false;
        } else {
            subtransform(pong, ping, subtransform_size, Direction::Vertical);
            ping_holds_current = true;
        }
    }
}
