//! Photograph set: mask plus the source/reflection image sequences.
//!
//! A set is one single-channel mask marking where water is visible, and two
//! parallel ordered sequences of reference photographs (the background
//! "source" images and the "reflection texture" images), indexed 1..=N.
//! Sequences are held in fixed-capacity texture arrays; slots past N repeat
//! the last frame so the time-lapse interpolator can address any slot.

use glam::{Vec2, Vec3};
use std::sync::Arc;
use thiserror::Error;

use crate::field::{Field, Wrap};

/// Hard cap on sequence length (size of the texture array)
pub const MAX_SEQUENCE_LEN: usize = 8;

/// Mask values strictly above this mark the inside of the water region;
/// exactly the threshold is outside
pub const MASK_THRESHOLD: f32 = 0.5;

/// Photograph loading failures, surfaced to the caller; the pipeline must
/// not run until a valid set is present.
#[derive(Debug, Error)]
pub enum PhotoError {
    #[error("failed to load {path}: {source}")]
    Load {
        path: String,
        source: image::ImageError,
    },

    #[error("photograph sequence is empty")]
    EmptySequence,

    #[error("photograph sequence has {0} frames, the maximum is {MAX_SEQUENCE_LEN}")]
    TooManyFrames(usize),
}

/// An RGB photograph resampled into a float field (row 0 = bottom scanline,
/// matching the screen buffers)
#[derive(Debug)]
pub struct Texture {
    pixels: Field,
}

impl Texture {
    pub fn from_image(image: &image::RgbImage) -> Self {
        let (width, height) = image.dimensions();
        let mut pixels = Field::new(width as usize, height as usize, 3);
        for (x, y, pixel) in image.enumerate_pixels() {
            let flipped_y = (height - 1 - y) as usize;
            pixels.store(
                x as usize,
                flipped_y,
                glam::Vec4::new(
                    pixel[0] as f32 / 255.0,
                    pixel[1] as f32 / 255.0,
                    pixel[2] as f32 / 255.0,
                    0.0,
                ),
            );
        }
        Self { pixels }
    }

    /// Bilinear sample at normalized coordinates
    pub fn sample(&self, uv: Vec2) -> Vec3 {
        self.pixels.sample_linear(uv, Wrap::Clamp).truncate()
    }
}

/// Fixed-capacity photograph sequence with a repeat-last fill policy for
/// counts below the cap
#[derive(Debug, Clone)]
pub struct TextureSequence {
    slots: [Option<Arc<Texture>>; MAX_SEQUENCE_LEN],
    len: usize,
}

impl TextureSequence {
    pub fn new(frames: Vec<Texture>) -> Result<Self, PhotoError> {
        if frames.is_empty() {
            return Err(PhotoError::EmptySequence);
        }
        if frames.len() > MAX_SEQUENCE_LEN {
            return Err(PhotoError::TooManyFrames(frames.len()));
        }

        let len = frames.len();
        let mut slots: [Option<Arc<Texture>>; MAX_SEQUENCE_LEN] = Default::default();
        for (slot, frame) in slots.iter_mut().zip(frames) {
            *slot = Some(Arc::new(frame));
        }
        // Repeat the last frame into the remaining slots
        let last = slots[len - 1].clone();
        for slot in slots.iter_mut().skip(len) {
            *slot = last.clone();
        }

        Ok(Self { slots, len })
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn slot(&self, index: usize) -> &Texture {
        let index = index.min(MAX_SEQUENCE_LEN - 1);
        self.slots[index]
            .as_deref()
            .expect("all slots filled at construction")
    }

    /// Sample with cross-fade between the two slots bracketing the
    /// fractional index `t` (0-based)
    pub fn sample_interpolated(&self, t: f32, uv: Vec2) -> Vec3 {
        let t = t.clamp(0.0, (MAX_SEQUENCE_LEN - 1) as f32);
        let lower = self.slot(t.floor() as usize).sample(uv);
        let upper = self.slot(t.ceil() as usize).sample(uv);
        let lower_weight = t.ceil() - t;
        lower * lower_weight + upper * (1.0 - lower_weight)
    }
}

/// Single-channel water mask over the photograph
#[derive(Debug, Clone)]
pub struct Mask {
    values: Field,
}

impl Mask {
    pub fn from_image(image: &image::DynamicImage) -> Self {
        let rgb = image.to_rgb8();
        let (width, height) = rgb.dimensions();
        let mut values = Field::new(width as usize, height as usize, 1);
        for (x, y, pixel) in rgb.enumerate_pixels() {
            let flipped_y = (height - 1 - y) as usize;
            values.store(
                x as usize,
                flipped_y,
                glam::Vec4::new(pixel[0] as f32 / 255.0, 0.0, 0.0, 0.0),
            );
        }
        Self { values }
    }

    /// Build directly from row-major values (row 0 = bottom), for synthetic
    /// masks
    pub fn from_values(width: usize, height: usize, values: &[f32]) -> Self {
        let mut field = Field::new(width, height, 1);
        for y in 0..height {
            for x in 0..width {
                field.store(
                    x,
                    y,
                    glam::Vec4::new(values[y * width + x], 0.0, 0.0, 0.0),
                );
            }
        }
        Self { values: field }
    }

    /// Mask opacity at normalized image coordinates; zero outside [0,1]^2
    pub fn value(&self, coord: Vec2) -> f32 {
        if (coord.x - 0.5).abs() > 0.5 || (coord.y - 0.5).abs() > 0.5 {
            0.0
        } else {
            self.values.sample_linear(coord, Wrap::Clamp).x
        }
    }

    /// Whether a coordinate lies inside the valid water region
    pub fn is_inside(&self, coord: Vec2) -> bool {
        self.value(coord) > MASK_THRESHOLD
    }
}

/// The full photograph set handed to the pipeline as read-only input
pub struct PhotoSet {
    image_size: Vec2,
    mask: Mask,
    sources: TextureSequence,
    reflections: TextureSequence,
}

impl PhotoSet {
    /// Assemble a set from decoded images (tests build synthetic sets this
    /// way; `load` goes through here too)
    pub fn from_images(
        mask: image::DynamicImage,
        sources: Vec<image::RgbImage>,
        reflections: Vec<image::RgbImage>,
    ) -> Result<Self, PhotoError> {
        let image_size = sources
            .first()
            .map(|img| Vec2::new(img.width() as f32, img.height() as f32))
            .ok_or(PhotoError::EmptySequence)?;

        Ok(Self {
            image_size,
            mask: Mask::from_image(&mask),
            sources: TextureSequence::new(sources.iter().map(Texture::from_image).collect())?,
            reflections: TextureSequence::new(
                reflections.iter().map(Texture::from_image).collect(),
            )?,
        })
    }

    /// Load a set from disk. Sequence patterns carry a `{}` placeholder for
    /// the 1-based frame index (e.g. `data/pier/org{}.jpg`).
    pub fn load(
        mask_path: &str,
        source_pattern: &str,
        reflection_pattern: &str,
        count: usize,
    ) -> Result<Self, PhotoError> {
        if count == 0 {
            return Err(PhotoError::EmptySequence);
        }
        if count > MAX_SEQUENCE_LEN {
            return Err(PhotoError::TooManyFrames(count));
        }

        let open = |path: String| -> Result<image::DynamicImage, PhotoError> {
            image::open(&path).map_err(|source| PhotoError::Load { path, source })
        };

        let mask = open(mask_path.to_string())?;

        let mut sources = Vec::with_capacity(count);
        let mut reflections = Vec::with_capacity(count);
        for index in 1..=count {
            let index = index.to_string();
            sources.push(open(source_pattern.replace("{}", &index))?.to_rgb8());
            reflections.push(open(reflection_pattern.replace("{}", &index))?.to_rgb8());
        }

        log::info!(
            "loaded photograph set: {count} frame(s), mask {mask_path}, {}x{} px",
            sources[0].width(),
            sources[0].height()
        );

        Self::from_images(mask, sources, reflections)
    }

    /// Photograph size in pixels
    pub fn image_size(&self) -> Vec2 {
        self.image_size
    }

    pub fn mask(&self) -> &Mask {
        &self.mask
    }

    pub fn sources(&self) -> &TextureSequence {
        &self.sources
    }

    pub fn reflections(&self) -> &TextureSequence {
        &self.reflections
    }

    /// Number of frames in the sequences
    pub fn sequence_len(&self) -> usize {
        self.sources.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid_image(width: u32, height: u32, value: u8) -> image::RgbImage {
        image::RgbImage::from_pixel(width, height, image::Rgb([value, value, value]))
    }

    fn tiny_set(count: usize) -> Result<PhotoSet, PhotoError> {
        let mask = image::DynamicImage::ImageRgb8(solid_image(8, 8, 255));
        let sources = (0..count).map(|i| solid_image(8, 8, (i * 30) as u8)).collect();
        let reflections = (0..count).map(|i| solid_image(8, 8, (i * 30) as u8)).collect();
        PhotoSet::from_images(mask, sources, reflections)
    }

    #[test]
    fn test_empty_sequence_rejected() {
        assert!(matches!(tiny_set(0), Err(PhotoError::EmptySequence)));
    }

    #[test]
    fn test_sequence_over_capacity_rejected() {
        assert!(matches!(tiny_set(9), Err(PhotoError::TooManyFrames(9))));
    }

    #[test]
    fn test_repeat_last_fill() {
        let set = tiny_set(2).unwrap();
        // Slots past the sequence length hold the last frame
        let uv = Vec2::splat(0.5);
        let last = set.sources().slot(1).sample(uv);
        let filled = set.sources().slot(7).sample(uv);
        assert_eq!(last, filled);
    }

    #[test]
    fn test_interpolation_midpoint() {
        let set = tiny_set(2).unwrap();
        let uv = Vec2::splat(0.5);
        let a = set.sources().slot(0).sample(uv).x;
        let b = set.sources().slot(1).sample(uv).x;
        let mid = set.sources().sample_interpolated(0.5, uv).x;
        assert!((mid - (a + b) / 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_interpolation_index_clamped() {
        let set = tiny_set(2).unwrap();
        let uv = Vec2::splat(0.5);
        let clamped = set.sources().sample_interpolated(100.0, uv);
        let last = set.sources().slot(7).sample(uv);
        assert_eq!(clamped, last);
    }

    #[test]
    fn test_mask_threshold_exact_half_is_outside() {
        let mask = Mask::from_values(2, 2, &[0.5; 4]);
        assert!(!mask.is_inside(Vec2::splat(0.5)));
        let wet = Mask::from_values(2, 2, &[0.6; 4]);
        assert!(wet.is_inside(Vec2::splat(0.5)));
    }

    #[test]
    fn test_mask_outside_image_reads_zero() {
        let mask = Mask::from_values(2, 2, &[1.0; 4]);
        assert_eq!(mask.value(Vec2::new(1.5, 0.5)), 0.0);
        assert_eq!(mask.value(Vec2::new(0.5, -0.1)), 0.0);
    }
}
