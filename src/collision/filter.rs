//! Per-pixel interpolation of the block-sparse collision samples.
//!
//! The solver stores one boundary pair per pixel *slot*: 16 ray angles per
//! 4x4 block, all cast from the block center. This pass reconstructs a
//! smooth per-pixel reflection coordinate: compute the pixel's own
//! reflection angle, map it to a fractional slot index, and blend the two
//! nearest slots, correcting for the pixel's horizontal offset from each
//! slot's origin column. It trades 16x the solver's per-frame cost for
//! anti-aliased reflection boundaries at full resolution.

use glam::{Vec2, Vec4};

use super::{RAY_CONE_HALF_ANGLE, NOT_FOUND};
use crate::camera::Camera;
use crate::field::{Field, Wrap};
use crate::photo::Mask;
use crate::viewport::ScreenMapping;

/// Value stored for pixels with no water surface
const EMPTY: Vec4 = Vec4::new(-2.0, -2.0, -2.0, -2.0);

/// Shift a stored boundary pair by the pixel's sub-block column offset.
/// A sentinel near point keeps its xy untouched.
fn shift_coord(coord: Vec4, shift: Vec2) -> Vec4 {
    if Vec2::new(coord.x, coord.y) == NOT_FOUND {
        coord + Vec4::new(0.0, 0.0, shift.x, shift.y)
    } else {
        coord + Vec4::new(shift.x, shift.y, shift.x, shift.y)
    }
}

/// Blend the far (zw) points of two slots; the near (xy) point follows the
/// dominant slot unblended, so a sentinel never leaks into arithmetic
fn interpolate_far(dominant: Vec4, other: Vec4, weight: f32) -> Vec4 {
    let far = weight * Vec2::new(dominant.z, dominant.w)
        + (1.0 - weight) * Vec2::new(other.z, other.w);
    Vec4::new(dominant.x, dominant.y, far.x, far.y)
}

/// Inputs shared by every pixel of the filter pass
pub struct FilterInputs<'a> {
    pub collision: &'a Field,
    pub displacement: &'a Field,
    pub normals: &'a Field,
    pub mask: &'a Mask,
    pub mapping: &'a ScreenMapping,
    pub camera: &'a Camera,
    pub domain_size: f32,
    pub device_pixel_ratio: f32,
}

/// Run the filter over the device-resolution output buffer
pub fn filter(inputs: &FilterInputs, out: &mut Field) {
    let width = out.width();
    let height = out.height();

    for y in 0..height {
        for x in 0..width {
            out.store(x, y, filter_pixel(inputs, x, y));
        }
    }
}

fn filter_pixel(inputs: &FilterInputs, x: usize, y: usize) -> Vec4 {
    let mapping = inputs.mapping;
    let dpr = inputs.device_pixel_ratio;
    let screen = mapping.screen_resolution;

    let frag = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
    let current_window = frag / (dpr * screen);
    let image_coord = mapping.current_to_image(current_window);
    if ScreenMapping::out_of_range(image_coord) || inputs.mask.value(image_coord) <= 0.0 {
        return EMPTY;
    }

    let ndc = current_window * 2.0 - 1.0;
    let Some(geometry) = inputs.camera.water_plane_point(ndc) else {
        return EMPTY;
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
    let reflection = (2.0 * incidence * normal - view).normalize();

    // Reflection direction on screen, as an angle from vertical
    let projected = inputs.camera.world_to_ndc(position + reflection);
    let reflection_display = projected - ndc;
    let mut ray_angle = (reflection_display.x / reflection_display.y).atan();
    if !ray_angle.is_finite() {
        ray_angle = 0.0;
    }
    ray_angle = ray_angle.clamp(-RAY_CONE_HALF_ANGLE, RAY_CONE_HALF_ANGLE);

    // Fractional index into the 16 slots of this pixel's block
    let ray_index = (ray_angle + RAY_CONE_HALF_ANGLE).to_degrees() / 10.0;
    let block_coord = Vec2::new((frag.x / dpr) % 4.0, (frag.y / dpr) % 4.0);
    let block_origin = frag / dpr - block_coord;

    let slot_position = |index: f32| -> Vec2 {
        let column = index % 4.0;
        let row = (index - column) / 4.0;
        (block_origin + 0.5 + Vec2::new(column, row)) / screen
    };
    let lower = slot_position(ray_index.floor());
    let upper = slot_position(ray_index.ceil());

    // Each slot's ray originates at its own column; re-center on this pixel
    let local_shift = Vec2::new((block_coord.x - 1.5) * 2.0 / screen.x, 0.0);
    let coord_lower = shift_coord(inputs.collision.sample_nearest(lower, Wrap::Clamp), local_shift);
    let coord_upper = shift_coord(inputs.collision.sample_nearest(upper, Wrap::Clamp), local_shift);

    let fract = ray_index.fract();
    if fract > 0.5 {
        interpolate_far(coord_upper, coord_lower, fract)
    } else {
        interpolate_far(coord_lower, coord_upper, 1.0 - fract)
    }
}
