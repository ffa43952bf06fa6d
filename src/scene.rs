//! Analytic scene objects floating on the water.

use glam::{Mat4, Vec2, Vec3};
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::field::{Field, Wrap};

/// Fixed number of sphere slots in the scene
pub const MAX_SPHERES: usize = 16;

/// A beach-ball sphere floating on the surface.
///
/// Spheres contribute to reflection/refraction intersection tests but not to
/// the wave fields; the coupling runs one way, through `displaced_center`.
#[derive(Debug, Clone)]
pub struct Sphere {
    /// Base position; vertical component is the rest height (radius * 0.7)
    pub position: Vec3,
    /// Inverse (transposed) orientation, mapping world normals into the
    /// ball's paint pattern
    pub rotation: Mat4,
    pub radius: f32,
}

impl Sphere {
    /// Center displaced by the wave field sampled at the base footprint
    pub fn displaced_center(&self, displacement: &Field, domain_size: f32) -> Vec3 {
        let uv = Vec2::new(self.position.x, self.position.z) / domain_size;
        self.position + displacement.sample_linear(uv, Wrap::Repeat).truncate()
    }
}

/// Scatter the full sphere fleet over the water in front of the camera.
///
/// Positions land in x [-200, 200], z [100, 600] with random orientations;
/// a zero radius keeps a sphere invisible until enabled.
pub fn scatter_spheres(radius: f32, seed: u64) -> Vec<Sphere> {
    let mut rng = StdRng::seed_from_u64(seed);
    let tau = 2.0 * std::f32::consts::PI;

    (0..MAX_SPHERES)
        .map(|_| {
            let x = rng.gen::<f32>() * 400.0 - 200.0;
            let z = rng.gen::<f32>() * 500.0 - 250.0 + 350.0;
            let rotation = Mat4::from_euler(
                glam::EulerRot::XYZ,
                tau * rng.gen::<f32>(),
                tau * rng.gen::<f32>(),
                tau * rng.gen::<f32>(),
            )
            .transpose();
            Sphere {
                position: Vec3::new(x, radius * 0.7, z),
                rotation,
                radius,
            }
        })
        .collect()
}

/// Closest-intersection parameter of a ray against a sphere, or -1.0 when
/// the ray misses (tangent hits count as misses)
pub fn ray_sphere_intersection(
    ray_src: Vec3,
    ray_dir: Vec3,
    sphere_center: Vec3,
    sphere_radius: f32,
) -> f32 {
    let offset = ray_src - sphere_center;
    let a = ray_dir.dot(ray_dir);
    let b = 2.0 * offset.dot(ray_dir);
    let c = offset.dot(offset) - sphere_radius * sphere_radius;

    let discriminant = b * b - 4.0 * a * c;
    if discriminant <= 0.0 {
        return -1.0;
    }

    let t1 = (-b + discriminant.sqrt()) / (2.0 * a);
    let t2 = (-b - discriminant.sqrt()) / (2.0 * a);

    if t1 <= 0.0 && t2 > 0.0 {
        t2
    } else if t2 <= 0.0 && t1 > 0.0 {
        t1
    } else if t1 < t2 {
        t1
    } else {
        t2
    }
}

const BALL_COLORS: [Vec3; 7] = [
    Vec3::new(251.0 / 255.0, 70.0 / 255.0, 65.0 / 255.0),  // red
    Vec3::new(253.0 / 255.0, 148.0 / 255.0, 45.0 / 255.0), // orange
    Vec3::new(255.0 / 255.0, 201.0 / 255.0, 54.0 / 255.0), // yellow
    Vec3::new(68.0 / 255.0, 180.0 / 255.0, 49.0 / 255.0),  // green
    Vec3::new(18.0 / 255.0, 146.0 / 255.0, 237.0 / 255.0), // blue
    Vec3::new(174.0 / 255.0, 90.0 / 255.0, 199.0 / 255.0), // purple
    Vec3::new(40.0 / 255.0, 118.0 / 255.0, 228.0 / 255.0), // dark blue
];

/// Paint color at an object-space normal: polar caps in dark blue, six
/// longitude wedges around the equator
pub fn beach_ball_color(normal: Vec3) -> Vec3 {
    let pi = std::f32::consts::PI;
    let theta = normal.y.clamp(-1.0, 1.0).acos();
    let phi = normal.z.atan2(normal.x);
    if theta < pi * 0.1 || theta > 0.9 * pi {
        return BALL_COLORS[6];
    }
    let wedge = (6.0 * (0.5 + phi / (2.0 * pi))) as usize;
    BALL_COLORS[wedge.min(6)]
}
