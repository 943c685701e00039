// THEORY:
// The `TestImageGenerator` synthesizes images with known content so the filters and
// the detector can be checked without fixture files.
//
// 1.  **Dotted images**: a solid background with randomly placed filled disks. Disks
//     may be clipped by the image border, and they are painted in generation order,
//     so a later disk overwrites an earlier one where they overlap.
// 2.  **Explicit randomness**: the generator never reaches for ambient randomness.
//     Callers pass an `Rng`, or a seed through `generate_seeded`, which makes a
//     seeded run bit-for-bit reproducible.
// 3.  **Gradients**: a 256 × 256 grayscale ramp, left-to-right or inverted, useful
//     for checking where a threshold cuts.

use crate::core_modules::pixel_buffer::{Byte, GRAY_CHANNELS, PixelBuffer, Rgb};
use crate::error::{Result, VisionError};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const GRADIENT_SIZE: usize = 256;

/// Parameters for a dotted test image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub width: usize,
    pub height: usize,
    pub background_color: Rgb,
    pub dot_color: Rgb,
    pub dot_count: usize,
    /// Inclusive (min, max) radius in pixels.
    pub radius_range: (u32, u32),
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            width: 400,
            height: 400,
            background_color: [200, 200, 200],
            dot_color: [255, 0, 0],
            dot_count: 25,
            radius_range: (5, 20),
        }
    }
}

/// A filled circle, used only while painting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Disk {
    pub center_x: usize,
    pub center_y: usize,
    pub radius: u32,
    pub color: Rgb,
}

impl Disk {
    /// Paints the disk into `buffer`, clipped to its bounds. A pixel is inside iff
    /// its distance from the center is at most the radius.
    fn paint(&self, buffer: &mut PixelBuffer) {
        let radius = self.radius as i64;
        let (cx, cy) = (self.center_x as i64, self.center_y as i64);
        let y_start = (cy - radius).max(0);
        let y_end = (cy + radius).min(buffer.height() as i64 - 1);
        let x_start = (cx - radius).max(0);
        let x_end = (cx + radius).min(buffer.width() as i64 - 1);
        let radius_sq = radius * radius;

        for y in y_start..=y_end {
            for x in x_start..=x_end {
                let (dx, dy) = (x - cx, y - cy);
                if dx * dx + dy * dy <= radius_sq {
                    buffer.set(y as usize, x as usize, &self.color);
                }
            }
        }
    }
}

/// Direction of the gradient ramp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    /// Dark on the left, bright on the right.
    Normal,
    /// Bright on the left, dark on the right.
    Inverted,
}

fn validate(config: &GeneratorConfig) -> Result<()> {
    if config.width == 0 || config.height == 0 {
        return Err(VisionError::invalid_parameter(format!(
            "image dimensions must be positive, got {}x{}",
            config.width, config.height
        )));
    }
    let (min_radius, max_radius) = config.radius_range;
    if min_radius > max_radius {
        return Err(VisionError::invalid_parameter(format!(
            "radius range is empty: ({min_radius}, {max_radius})"
        )));
    }
    Ok(())
}

/// Draws `config.dot_count` random disks over a solid background.
pub fn generate<R: Rng>(config: &GeneratorConfig, rng: &mut R) -> Result<PixelBuffer> {
    validate(config)?;
    let mut buffer = PixelBuffer::filled_rgb(config.height, config.width, config.background_color)?;
    let (min_radius, max_radius) = config.radius_range;

    for _ in 0..config.dot_count {
        let disk = Disk {
            center_x: rng.gen_range(0..config.width),
            center_y: rng.gen_range(0..config.height),
            radius: rng.gen_range(min_radius..=max_radius),
            color: config.dot_color,
        };
        disk.paint(&mut buffer);
    }

    debug!(
        width = config.width,
        height = config.height,
        dots = config.dot_count,
        "generated test image"
    );
    Ok(buffer)
}

/// `generate` with a `StdRng` seeded from `seed`, or from OS entropy when `None`.
pub fn generate_seeded(config: &GeneratorConfig, seed: Option<u64>) -> Result<PixelBuffer> {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    generate(config, &mut rng)
}

/// A 256 × 256 single-channel ramp whose value at column x is x, or 255 - x.
pub fn gradient(polarity: Polarity) -> Result<PixelBuffer> {
    let data = (0..GRADIENT_SIZE)
        .flat_map(|_| 0..GRADIENT_SIZE)
        .map(|x| match polarity {
            Polarity::Normal => x as Byte,
            Polarity::Inverted => (GRADIENT_SIZE - 1 - x) as Byte,
        })
        .collect();
    PixelBuffer::new(GRADIENT_SIZE, GRADIENT_SIZE, GRAY_CHANNELS, data)
}
