// THEORY:
// The `PixelBuffer` is the one value type every algorithm in this crate reads and
// produces. It is a "dumb" data container: a row-major, channel-interleaved grid of
// bytes with its shape attached. It knows how to index itself and how to hand out
// per-pixel views, but it performs no analysis of its own.
//
// Key architectural principles:
// 1.  **Validated Shape**: A buffer can only be constructed with a non-zero height
//     and width, at least one channel, and a data vector of exactly
//     `height * width * channels` bytes. Only the redness detector insists on RGB.
// 2.  **Immutability by Convention**: Filters and detectors take `&PixelBuffer` and
//     return a fresh buffer. The source is never mutated by an algorithm.
// 3.  **Fixed Channel Order**: For 3-channel buffers the order is always R, G, B.

use crate::core_modules::pixel::Pixel;
use crate::error::{Result, VisionError};

pub type Byte = u8;
pub type Rgb = [Byte; 3];

pub const GRAY_CHANNELS: usize = 1;
pub const GRAY_ALPHA_CHANNELS: usize = 2;
pub const RGB_CHANNELS: usize = 3;
pub const RGBA_CHANNELS: usize = 4;

/// An H × W × C grid of unsigned 8-bit samples.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    height: usize,
    width: usize,
    channels: usize,
    data: Vec<Byte>,
}

impl PixelBuffer {
    /// Wraps raw interleaved bytes, validating the shape against the data length.
    pub fn new(height: usize, width: usize, channels: usize, data: Vec<Byte>) -> Result<Self> {
        let expected = Self::sample_count(height, width, channels)?;
        if data.len() != expected {
            return Err(VisionError::invalid_parameter(format!(
                "buffer of {height}x{width}x{channels} needs {expected} bytes, got {}",
                data.len()
            )));
        }
        Ok(Self {
            height,
            width,
            channels,
            data,
        })
    }

    /// A buffer with every sample set to `value`.
    pub fn filled(height: usize, width: usize, channels: usize, value: Byte) -> Result<Self> {
        let samples = Self::sample_count(height, width, channels)?;
        Ok(Self {
            height,
            width,
            channels,
            data: vec![value; samples],
        })
    }

    /// An RGB buffer with every pixel set to `color`.
    pub fn filled_rgb(height: usize, width: usize, color: Rgb) -> Result<Self> {
        let samples = Self::sample_count(height, width, RGB_CHANNELS)?;
        let mut data = Vec::with_capacity(samples);
        for _ in 0..samples / RGB_CHANNELS {
            data.extend_from_slice(&color);
        }
        Ok(Self {
            height,
            width,
            channels: RGB_CHANNELS,
            data,
        })
    }

    /// Validates the shape and returns `height * width * channels`.
    fn sample_count(height: usize, width: usize, channels: usize) -> Result<usize> {
        if height == 0 || width == 0 {
            return Err(VisionError::invalid_parameter(format!(
                "image dimensions must be positive, got {height}x{width}"
            )));
        }
        if channels == 0 {
            return Err(VisionError::invalid_format("a buffer needs at least one channel"));
        }
        height
            .checked_mul(width)
            .and_then(|pixels| pixels.checked_mul(channels))
            .ok_or_else(|| {
                VisionError::invalid_parameter(format!(
                    "buffer of {height}x{width}x{channels} is too large"
                ))
            })
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    /// (height, width, channels)
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.height, self.width, self.channels)
    }

    pub fn pixel_count(&self) -> usize {
        self.height * self.width
    }

    pub fn is_rgb(&self) -> bool {
        self.channels == RGB_CHANNELS
    }

    pub fn as_slice(&self) -> &[Byte] {
        &self.data
    }

    pub fn into_raw(self) -> Vec<Byte> {
        self.data
    }

    #[inline]
    fn index(&self, y: usize, x: usize) -> usize {
        (y * self.width + x) * self.channels
    }

    /// All channel samples of the pixel at row `y`, column `x`.
    #[inline]
    pub fn get(&self, y: usize, x: usize) -> &[Byte] {
        let start = self.index(y, x);
        &self.data[start..start + self.channels]
    }

    /// The pixel at (y, x) as an RGB `Pixel`, or `None` for non-RGB buffers.
    pub fn rgb_at(&self, y: usize, x: usize) -> Option<Pixel> {
        self.is_rgb().then(|| Pixel::from(self.get(y, x)))
    }

    /// Overwrites every channel of the pixel at (y, x). `values` must have
    /// `channels` elements.
    #[inline]
    pub(crate) fn set(&mut self, y: usize, x: usize, values: &[Byte]) {
        let start = self.index(y, x);
        self.data[start..start + self.channels].copy_from_slice(values);
    }

    /// Iterates over pixels as RGB triples. Fails for non-RGB buffers.
    pub fn rgb_pixels(&self) -> Result<impl Iterator<Item = Pixel> + '_> {
        if !self.is_rgb() {
            return Err(VisionError::invalid_format("image must be RGB"));
        }
        Ok(self.data.chunks_exact(RGB_CHANNELS).map(Pixel::from))
    }

    /// Builds a same-shaped buffer by mapping every sample independently.
    pub(crate) fn map_samples(&self, f: impl Fn(Byte) -> Byte) -> Self {
        Self {
            height: self.height,
            width: self.width,
            channels: self.channels,
            data: self.data.iter().map(|&v| f(v)).collect(),
        }
    }
}
