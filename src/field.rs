//! Grid buffers shared by every simulation pass.
//!
//! A [`Field`] is a dense 2D buffer of 1-4 `f32` channels used both as a pass
//! output and as a sampled input of downstream passes. Sampling mirrors the
//! texture modes of a GPU pipeline (nearest/bilinear filtering, clamp/repeat
//! wrapping) so pass code reads like the shader math it implements.

use glam::{Vec2, Vec4};

/// Texture coordinate wrapping behavior
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Wrap {
    /// Coordinates outside [0, n) clamp to the edge texel
    Clamp,
    /// Coordinates wrap modulo the field size (tileable fields)
    Repeat,
}

/// A dense 2D float buffer with 1-4 channels per cell
#[derive(Clone, Debug)]
pub struct Field {
    width: usize,
    height: usize,
    channels: usize,
    data: Vec<f32>,
}

impl Field {
    /// Create a zero-filled field
    pub fn new(width: usize, height: usize, channels: usize) -> Self {
        assert!((1..=4).contains(&channels), "1-4 channels supported");
        Self {
            width,
            height,
            channels,
            data: vec![0.0; width * height * channels],
        }
    }

    /// Create a zero-filled square field (simulation grids)
    pub fn square(resolution: usize, channels: usize) -> Self {
        Self::new(resolution, resolution, channels)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Side length of a square field
    pub fn resolution(&self) -> usize {
        debug_assert_eq!(self.width, self.height);
        self.width
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Fetch the texel at integer coordinates; missing channels read as zero
    #[inline]
    pub fn fetch(&self, x: usize, y: usize) -> Vec4 {
        let base = (y * self.width + x) * self.channels;
        let mut out = Vec4::ZERO;
        for c in 0..self.channels {
            out[c] = self.data[base + c];
        }
        out
    }

    /// Store a texel at integer coordinates; extra channels are dropped
    #[inline]
    pub fn store(&mut self, x: usize, y: usize, value: Vec4) {
        let base = (y * self.width + x) * self.channels;
        for c in 0..self.channels {
            self.data[base + c] = value[c];
        }
    }

    pub fn fill(&mut self, value: Vec4) {
        for y in 0..self.height {
            for x in 0..self.width {
                self.store(x, y, value);
            }
        }
    }

    #[inline]
    fn wrap_coord(coord: i64, size: usize, wrap: Wrap) -> usize {
        let size = size as i64;
        match wrap {
            Wrap::Clamp => coord.clamp(0, size - 1) as usize,
            Wrap::Repeat => coord.rem_euclid(size) as usize,
        }
    }

    /// Fetch with signed coordinates resolved by the wrap mode
    #[inline]
    pub fn fetch_wrapped(&self, x: i64, y: i64, wrap: Wrap) -> Vec4 {
        self.fetch(
            Self::wrap_coord(x, self.width, wrap),
            Self::wrap_coord(y, self.height, wrap),
        )
    }

    /// Nearest-neighbor sample at normalized coordinates (texel centers at
    /// `(i + 0.5) / size`)
    pub fn sample_nearest(&self, uv: Vec2, wrap: Wrap) -> Vec4 {
        let x = (uv.x * self.width as f32).floor() as i64;
        let y = (uv.y * self.height as f32).floor() as i64;
        self.fetch_wrapped(x, y, wrap)
    }

    /// Bilinear sample at normalized coordinates
    pub fn sample_linear(&self, uv: Vec2, wrap: Wrap) -> Vec4 {
        let tx = uv.x * self.width as f32 - 0.5;
        let ty = uv.y * self.height as f32 - 0.5;
        let x0 = tx.floor();
        let y0 = ty.floor();
        let fx = tx - x0;
        let fy = ty - y0;
        let x0 = x0 as i64;
        let y0 = y0 as i64;

        let v00 = self.fetch_wrapped(x0, y0, wrap);
        let v10 = self.fetch_wrapped(x0 + 1, y0, wrap);
        let v01 = self.fetch_wrapped(x0, y0 + 1, wrap);
        let v11 = self.fetch_wrapped(x0 + 1, y0 + 1, wrap);

        let top = v00 * (1.0 - fx) + v10 * fx;
        let bottom = v01 * (1.0 - fx) + v11 * fx;
        top * (1.0 - fy) + bottom * fy
    }
}

/// Double-buffered field pair for passes that read and write the same
/// logical data.
///
/// Slots are selected by frame parity rather than a toggled flag, so a pass
/// can never alias its own input: `read_write` hands out the read slot and
/// the write slot as distinct borrows.
#[derive(Clone, Debug)]
pub struct FieldPair {
    slots: [Field; 2],
}

impl FieldPair {
    pub fn square(resolution: usize, channels: usize) -> Self {
        Self {
            slots: [
                Field::square(resolution, channels),
                Field::square(resolution, channels),
            ],
        }
    }

    /// Borrow the slot written on the given frame parity
    pub fn written(&self, parity: u64) -> &Field {
        &self.slots[((parity + 1) % 2) as usize]
    }

    /// Split-borrow (read slot, write slot) for the given frame parity
    pub fn read_write(&mut self, parity: u64) -> (&Field, &mut Field) {
        let (first, second) = self.slots.split_at_mut(1);
        if parity % 2 == 0 {
            (&first[0], &mut second[0])
        } else {
            (&second[0], &mut first[0])
        }
    }

    /// Mutable access to the slot read on the given parity (initial seeding)
    pub fn read_slot_mut(&mut self, parity: u64) -> &mut Field {
        &mut self.slots[(parity % 2) as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_store_roundtrip() {
        let mut field = Field::square(4, 4);
        field.store(1, 2, Vec4::new(1.0, 2.0, 3.0, 4.0));
        assert_eq!(field.fetch(1, 2), Vec4::new(1.0, 2.0, 3.0, 4.0));
        assert_eq!(field.fetch(0, 0), Vec4::ZERO);
    }

    #[test]
    fn test_single_channel_padding() {
        let mut field = Field::square(2, 1);
        field.store(0, 0, Vec4::new(5.0, 9.0, 9.0, 9.0));
        // Only the first channel is stored; the rest read back as zero
        assert_eq!(field.fetch(0, 0), Vec4::new(5.0, 0.0, 0.0, 0.0));
    }

    #[test]
    fn test_repeat_wrap_tiles() {
        let mut field = Field::square(4, 1);
        field.store(0, 0, Vec4::splat(7.0));
        assert_eq!(field.fetch_wrapped(4, 4, Wrap::Repeat).x, 7.0);
        assert_eq!(field.fetch_wrapped(-4, -4, Wrap::Repeat).x, 7.0);
    }

    #[test]
    fn test_linear_sample_at_texel_center() {
        let mut field = Field::square(4, 1);
        field.store(2, 1, Vec4::splat(8.0));
        // Sampling exactly at a texel center returns that texel
        let uv = Vec2::new((2.0 + 0.5) / 4.0, (1.0 + 0.5) / 4.0);
        assert!((field.sample_linear(uv, Wrap::Clamp).x - 8.0).abs() < 1e-6);
    }

    #[test]
    fn test_linear_sample_interpolates() {
        let mut field = Field::square(2, 1);
        field.store(0, 0, Vec4::splat(0.0));
        field.store(1, 0, Vec4::splat(1.0));
        field.store(0, 1, Vec4::splat(0.0));
        field.store(1, 1, Vec4::splat(1.0));
        let mid = field.sample_linear(Vec2::new(0.5, 0.5), Wrap::Clamp);
        assert!((mid.x - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_pair_read_write_distinct() {
        let mut pair = FieldPair::square(2, 1);
        {
            let (_, write) = pair.read_write(0);
            write.store(0, 0, Vec4::splat(3.0));
        }
        // Parity 0 writes slot 1, which parity 1 then reads
        let (read, _) = pair.read_write(1);
        assert_eq!(read.fetch(0, 0).x, 3.0);
        assert_eq!(pair.written(0).fetch(0, 0).x, 3.0);
    }
}
