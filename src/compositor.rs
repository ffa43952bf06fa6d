//! Final per-pixel shading of the water surface into the photograph.
//!
//! For every viewport pixel inside the masked water region: reconstruct the
//! displaced surface point, shade it with a Schlick Fresnel split between a
//! reflected and a refracted term, source the reflection from the
//! photograph through the filtered collision coordinates (or from a sphere
//! the ray hits on the way), and alpha-blend the result over the background
//! photograph by the mask's opacity.

use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3, Vec4};

use crate::camera::Camera;
use crate::collision::NOT_FOUND;
use crate::field::{Field, Wrap};
use crate::params::LightingParams;
use crate::photo::PhotoSet;
use crate::scene::{beach_ball_color, ray_sphere_intersection, Sphere};
use crate::viewport::ScreenMapping;

/// Canvas color where no photograph covers the viewport
const CLEAR_COLOR: Vec3 = Vec3::new(50.0 / 255.0, 50.0 / 255.0, 50.0 / 255.0);

/// Weight of the photograph sample against the ambient term in the
/// reflection color
const PURE_REFLECTION_WEIGHT: f32 = 0.8;

/// Evaluate the 2nd-order spherical-harmonics ambient light toward `dir`
pub fn sh_irradiance(dir: Vec3, coefficients: &[Vec3; 9]) -> Vec3 {
    let pi = std::f32::consts::PI;
    let basis = [
        1.0 / (4.0 * pi).sqrt(),
        (3.0 / (4.0 * pi)).sqrt() * dir.z,
        (3.0 / (4.0 * pi)).sqrt() * dir.x,
        (3.0 / (4.0 * pi)).sqrt() * dir.y,
        0.5 * (5.0 / (4.0 * pi)).sqrt() * (3.0 * dir.z * dir.z - 1.0),
        3.0 * (5.0 / (12.0 * pi)).sqrt() * dir.x * dir.z,
        3.0 * (5.0 / (12.0 * pi)).sqrt() * dir.y * dir.z,
        1.5 * (5.0 / (12.0 * pi)).sqrt() * (dir.x * dir.x - dir.y * dir.y),
        3.0 * (5.0 / (12.0 * pi)).sqrt() * dir.x * dir.y,
    ];
    basis
        .iter()
        .zip(coefficients)
        .map(|(b, c)| *b * *c)
        .sum()
}

/// Everything the compositor reads; all buffers are borrowed read-only
pub struct CompositorInputs<'a> {
    pub displacement: &'a Field,
    pub normals: &'a Field,
    /// Filtered collision coordinates at device resolution
    pub collision: &'a Field,
    pub photos: &'a PhotoSet,
    pub mapping: &'a ScreenMapping,
    pub camera: &'a Camera,
    pub lighting: &'a LightingParams,
    pub spheres: &'a [Sphere],
    pub domain_size: f32,
    /// 0-based fractional index into the photograph sequences
    pub time_lapse: f32,
    pub device_pixel_ratio: f32,
}

impl<'a> CompositorInputs<'a> {
    /// Closest sphere hit along a ray, shaded as an SH-lit beach ball
    fn sphere_color(&self, ray_src: Vec3, ray_dir: Vec3) -> Option<Vec3> {
        let mut best: Option<(f32, Vec3, &Sphere)> = None;
        for sphere in self.spheres {
            let center = sphere.displaced_center(self.displacement, self.domain_size);
            let t = ray_sphere_intersection(ray_src, ray_dir, center, sphere.radius);
            if t >= 0.0 && best.map_or(true, |(min_t, _, _)| t < min_t) {
                best = Some((t, center, sphere));
            }
        }

        let (t, center, sphere) = best?;
        let normal = ((ray_src + t * ray_dir) - center).normalize();
        let lit = sh_irradiance(
            Vec3::new(normal.x, normal.y.max(0.0), normal.z),
            &self.lighting.sh_coefficients,
        );
        let object_normal = sphere.rotation.transform_vector3(normal);
        Some((lit * 0.5 + Vec3::splat(0.5)) * beach_ball_color(object_normal))
    }

    /// Sample the reflection-texture sequence where an NDC coordinate lands
    /// in the photograph
    fn reflection_value(&self, ndc: Vec2) -> Vec3 {
        let current = ndc * 0.5 + 0.5;
        let image = self
            .mapping
            .current_to_image(current)
            .clamp(Vec2::ZERO, Vec2::ONE);
        self.photos
            .reflections()
            .sample_interpolated(self.time_lapse, image)
    }

    /// Walk the reflected ray out to the depth of a boundary point
    fn reflection_source(&self, position: Vec3, reflection: Vec3, boundary_ndc: Vec2) -> Option<Vec3> {
        if reflection.z.abs() < 1e-6 {
            return None;
        }
        let boundary = self.camera.water_plane_point(boundary_ndc)?;
        Some(position + reflection * ((boundary.z - position.z) / reflection.z))
    }

    fn sample_mirrored(&self, source: Vec3) -> Vec3 {
        let camera = self.camera.position();
        let mut to_mirror = Vec3::new(camera.x, -camera.y, camera.z) - source;
        to_mirror /= -to_mirror.y;
        let texture_pos = source + to_mirror * source.y;
        let ndc = self
            .camera
            .world_to_ndc(Vec3::new(texture_pos.x, 0.0, texture_pos.z));
        self.reflection_value(ndc)
    }

    fn reflection_color(&self, position: Vec3, normal: Vec3, view: Vec3, collision: Vec4) -> Vec3 {
        let incidence = normal.dot(view);
        let reflection = (2.0 * incidence * normal - view).normalize();
        let sh_reflection = sh_irradiance(reflection, &self.lighting.sh_coefficients);

        if let Some(color) = self.sphere_color(position, reflection) {
            return color;
        }

        let near = Vec2::new(collision.x, collision.y);
        let far = Vec2::new(collision.z, collision.w);
        // No boundary data: only the ambient term is available
        if near == NOT_FOUND && far == NOT_FOUND {
            return sh_reflection;
        }

        let mut pure = [Vec3::ZERO; 2];
        let mut first_ratio = 0.0;
        for i in 0..2 {
            if i == 0 && near == NOT_FOUND {
                first_ratio = 0.0;
                continue;
            }
            if i == 1 && first_ratio == 1.0 {
                continue;
            }
            let boundary_ndc = if i == 0 { near } else { far };

            let Some(source) = self.reflection_source(position, reflection, boundary_ndc) else {
                if i == 1 {
                    pure[i] = sh_reflection;
                }
                continue;
            };

            if i == 0 {
                // Does the near boundary's source still land on water? If
                // so the reflection passes through to the far boundary.
                let source_ndc = self.camera.world_to_ndc(source);
                let tex = self.mapping.current_to_image(source_ndc * 0.5 + 0.5);
                let covered = 1.0 - self.photos.mask().value(tex);
                first_ratio = if covered < 0.5 { 0.0 } else { 1.0 };
                if first_ratio == 0.0 {
                    continue;
                }
            }
            pure[i] = self.sample_mirrored(source);
        }

        let pure_reflection = pure[0] * first_ratio + pure[1] * (1.0 - first_ratio);
        PURE_REFLECTION_WEIGHT * pure_reflection + (1.0 - PURE_REFLECTION_WEIGHT) * sh_reflection
    }

    fn refraction_color(&self, position: Vec3, normal: Vec3, view: Vec3) -> Vec3 {
        let cos_incidence = normal.dot(view);
        // Water refracts at a ratio of 4/3
        let refraction =
            (0.75 * (cos_incidence * normal - view) - normal * cos_incidence).normalize();
        self.sphere_color(position, refraction)
            .unwrap_or(self.lighting.ocean_color)
    }
}

/// Composite one frame into the device-resolution RGBA output buffer
pub fn render(inputs: &CompositorInputs, out: &mut Field) {
    let width = out.width();
    let height = out.height();

    for y in 0..height {
        for x in 0..width {
            let color = shade_pixel(inputs, x, y);
            out.store(x, y, color.extend(1.0));
        }
    }
}

fn shade_pixel(inputs: &CompositorInputs, x: usize, y: usize) -> Vec3 {
    let mapping = inputs.mapping;
    let frag = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
    let current_window = frag / (inputs.device_pixel_ratio * mapping.screen_resolution);
    let image_coord = mapping.current_to_image(current_window);

    if ScreenMapping::out_of_range(image_coord) {
        return CLEAR_COLOR;
    }
    let background = inputs
        .photos
        .sources()
        .sample_interpolated(inputs.time_lapse, image_coord);

    let opacity = inputs.photos.mask().value(image_coord);
    if opacity <= 0.0 {
        return background;
    }

    let ndc = current_window * 2.0 - 1.0;
    let Some(geometry) = inputs.camera.water_plane_point(ndc) else {
        return background;
    };
    let uv = Vec2::new(geometry.x, geometry.z) / inputs.domain_size;
    let position = geometry
        + inputs
            .displacement
            .sample_linear(uv, Wrap::Repeat)
            .truncate();
    let normal = inputs
        .normals
        .sample_linear(uv, Wrap::Repeat)
        .truncate()
        .normalize();
    let view = (inputs.camera.position() - position).normalize();

    let incidence = normal.dot(view);
    let fresnel = 0.02 + 0.98 * (1.0 - incidence).powi(5);

    let collision = inputs.collision.fetch(x, y);
    let reflection = inputs.reflection_color(position, normal, view, collision);
    let refraction = inputs.refraction_color(position, normal, view);
    let color = reflection * (Vec3::splat(fresnel) + (1.0 - fresnel) * refraction);

    background * (1.0 - opacity) + color * opacity
}

/// One exported pixel
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
struct Rgba8 {
    r: u8,
    g: u8,
    b: u8,
    a: u8,
}

/// Convert a composited frame to tightly packed RGBA bytes, top row first
/// (screen buffers keep row 0 at the bottom)
pub fn frame_to_rgba8(frame: &Field) -> Vec<u8> {
    let to_byte = |v: f32| (v.clamp(0.0, 1.0) * 255.0 + 0.5) as u8;

    let mut pixels = Vec::with_capacity(frame.width() * frame.height());
    for y in (0..frame.height()).rev() {
        for x in 0..frame.width() {
            let c = frame.fetch(x, y);
            pixels.push(Rgba8 {
                r: to_byte(c.x),
                g: to_byte(c.y),
                b: to_byte(c.z),
                a: to_byte(c.w),
            });
        }
    }
    bytemuck::cast_slice(&pixels).to_vec()
}
