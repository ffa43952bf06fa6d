//! Surface normal estimation from the displacement field.

use glam::{Vec3, Vec4};

use crate::field::{Field, Wrap};

/// Estimate per-cell normals from the 4 axis neighbors.
///
/// Tangents are built from the displaced neighbor offsets at the physical
/// texel spacing (domain size / resolution); the four cross products are
/// summed and normalized. No smoothing beyond the 4-neighbor stencil.
pub fn estimate_normals(displacement: &Field, out: &mut Field, domain_size: f32) {
    let resolution = out.resolution();
    let texel_size = domain_size / resolution as f32;

    let displaced = |x: i64, y: i64| -> Vec3 {
        displacement.fetch_wrapped(x, y, Wrap::Repeat).truncate()
    };

    for y in 0..resolution {
        for x in 0..resolution {
            let xi = x as i64;
            let yi = y as i64;
            let center = displaced(xi, yi);

            // Texture v advances along world -z
            let right = Vec3::new(texel_size, 0.0, 0.0) + displaced(xi + 1, yi) - center;
            let left = Vec3::new(-texel_size, 0.0, 0.0) + displaced(xi - 1, yi) - center;
            let top = Vec3::new(0.0, 0.0, -texel_size) + displaced(xi, yi - 1) - center;
            let bottom = Vec3::new(0.0, 0.0, texel_size) + displaced(xi, yi + 1) - center;

            let normal = (right.cross(top) + top.cross(left) + left.cross(bottom)
                + bottom.cross(right))
            .normalize();

            out.store(x, y, Vec4::new(normal.x, normal.y, normal.z, 1.0));
        }
    }
}
