//! Screen-space boundary ray-collision search.
//!
//! Reflections must be clipped to the photograph's visible water region, and
//! there is no scene geometry for the surroundings, only the photograph. So
//! for every water pixel the renderer needs to know where a reflected ray
//! leaves the masked region. This pass marches rays outward in image space:
//! the screen is partitioned into 4x4 blocks, each pixel of a block casts one
//! ray from the block center at an angle picked by its position in the block
//! (16 angles spanning +-75 degrees from vertical), and the crossings found
//! are stored per pixel in NDC for the filter pass to interpolate.

pub mod filter;

use glam::{Vec2, Vec4};
use std::f32::consts::PI;

use crate::photo::Mask;
use crate::viewport::ScreenMapping;
use crate::field::Field;

/// Sentinel marking "no boundary found within the search budget"
pub const NOT_FOUND: Vec2 = Vec2::new(-2.0, -2.0);

/// Pixels per block side
const BLOCK_SIZE: usize = 4;
/// Angular step between the 16 ray slots (10 degrees)
const RAY_SLOT_ANGLE: f32 = PI / 18.0;
/// Half-width of the ray cone (75 degrees)
pub(crate) const RAY_CONE_HALF_ANGLE: f32 = 5.0 * PI / 12.0;
/// Consecutive inside-the-region samples required to re-arm boundary
/// detection (suppresses anti-aliased mask edges)
const HYSTERESIS_SAMPLES: usize = 10;

const MAX_BOUNDARIES: usize = 5;

/// Search variant selected by the viewport debounce timer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RayMarchMode {
    /// Runs every tick while the viewport is changing: short march, first
    /// crossing only
    Coarse,
    /// Runs once interaction settles: long march, up to five crossings
    Fine,
}

impl RayMarchMode {
    fn iterations(self) -> usize {
        match self {
            RayMarchMode::Coarse => 50,
            RayMarchMode::Fine => 1080,
        }
    }

    fn max_boundaries(self) -> usize {
        match self {
            RayMarchMode::Coarse => 1,
            RayMarchMode::Fine => MAX_BOUNDARIES,
        }
    }
}

/// March one ray; returns the packed (first, last) crossing in NDC plus the
/// number of crossings found.
///
/// The first slot is reported only when at least two crossings were found;
/// with zero or one crossing it carries the sentinel and the last slot holds
/// whatever was found (or the sentinel).
fn march_ray(
    mask: &Mask,
    mapping: &ScreenMapping,
    origin: Vec2,
    direction: Vec2,
    mode: RayMarchMode,
) -> (Vec4, usize) {
    let iterations = mode.iterations();
    let max_boundaries = mode.max_boundaries();

    let mut ray_point = mapping.initial_to_image(mapping.viewport.current_to_initial(origin));
    // Step length shrinks toward the horizon to spend resolution where
    // reflections travel far
    let step = mapping.window_to_image_vector(direction) * (1.0 - ray_point.y) * 1.1
        / iterations as f32;

    let mut boundary_points = [Vec2::ZERO; MAX_BOUNDARIES];
    let mut boundaries_found = 0usize;
    let mut inside_obstruction = false;
    let mut inside_region_run = 0usize;

    for _ in 0..iterations {
        ray_point += step;
        if !mask.is_inside(ray_point) {
            inside_region_run = 0;
            if inside_obstruction {
                continue;
            }
            inside_obstruction = true;
            boundary_points[boundaries_found] = ray_point;
            boundaries_found += 1;
            if boundaries_found == max_boundaries {
                break;
            }
        } else {
            inside_region_run += 1;
            if inside_obstruction && inside_region_run > HYSTERESIS_SAMPLES {
                inside_obstruction = false;
            }
        }
    }

    let to_ndc = |point: Vec2| mapping.image_to_current(point) * 2.0 - 1.0;

    let first = if boundaries_found <= 1 {
        NOT_FOUND
    } else {
        to_ndc(boundary_points[0])
    };
    let last = if boundaries_found == 0 {
        NOT_FOUND
    } else {
        to_ndc(boundary_points[boundaries_found - 1])
    };
    (
        Vec4::new(first.x, first.y, last.x, last.y),
        boundaries_found,
    )
}

/// Ray angle for a pixel's slot within its 4x4 block
#[inline]
pub(crate) fn slot_angle(local_id: usize) -> f32 {
    RAY_SLOT_ANGLE * local_id as f32 - RAY_CONE_HALF_ANGLE
}

/// Run the boundary search over the whole screen, one ray per pixel.
///
/// `out` must be sized to the logical viewport; every pixel of a block
/// shares the block-center origin but owns its slot's angle.
pub fn solve(mask: &Mask, mapping: &ScreenMapping, mode: RayMarchMode, out: &mut Field) {
    let width = out.width();
    let height = out.height();
    let screen = mapping.screen_resolution;

    log::debug!(
        "boundary ray march ({mode:?}): {width}x{height}, {} steps",
        mode.iterations()
    );

    for y in 0..height {
        for x in 0..width {
            let local = (x % BLOCK_SIZE, y % BLOCK_SIZE);
            let origin = Vec2::new(
                (x - local.0) as f32 + 2.0,
                (y - local.1) as f32 + 2.0,
            ) / screen;
            let local_id = local.0 + local.1 * BLOCK_SIZE;
            let direction = Vec2::new(slot_angle(local_id).tan(), 1.0);

            let (packed, _) = march_ray(mask, mapping, origin, direction, mode);
            out.store(x, y, packed);
        }
    }
}
