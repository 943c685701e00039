// THEORY (single-pixel heuristics):
// `Pixel` is the smallest unit of analysis: one R, G, B triple with the metrics that
// can be computed from that pixel alone, with no knowledge of its neighbors. The
// redness classification lives here because it is exactly such a metric; the
// detector only walks the buffer and aggregates.
//
// Channels are compared in `f64`. The sensitivity is applied to green and to blue
// independently, and both comparisons are strict, so a pixel whose red channel
// merely equals the scaled green (or blue) is not red.

use crate::core_modules::pixel_buffer::{Byte, Rgb, RGB_CHANNELS};

pub type Channel = Byte;
pub type Sensitivity = f64;

/// A "dumb" data container representing a single RGB pixel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pixel {
    /// The red channel value (0-255).
    pub red: Channel,
    /// The green channel value (0-255).
    pub green: Channel,
    /// The blue channel value (0-255).
    pub blue: Channel,
}

impl Pixel {
    pub fn new(red: Channel, green: Channel, blue: Channel) -> Self {
        Pixel { red, green, blue }
    }

    /// True iff red exceeds both green and blue scaled by `sensitivity`.
    #[inline]
    pub fn is_red_dominant(&self, sensitivity: Sensitivity) -> bool {
        let red = self.red as f64;
        red > self.green as f64 * sensitivity && red > self.blue as f64 * sensitivity
    }
}

impl From<&[Byte]> for Pixel {
    fn from(bytes: &[Byte]) -> Self {
        if bytes.len() != RGB_CHANNELS {
            panic!("Cannot convert {} bytes into pixel.", bytes.len());
        }
        Pixel::new(bytes[0], bytes[1], bytes[2])
    }
}

impl From<Rgb> for Pixel {
    fn from(rgb: Rgb) -> Self {
        Pixel::new(rgb[0], rgb[1], rgb[2])
    }
}

impl From<Pixel> for Rgb {
    fn from(pixel: Pixel) -> Self {
        [pixel.red, pixel.green, pixel.blue]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clearly_red_pixel_is_dominant() {
        assert!(Pixel::new(200, 100, 80).is_red_dominant(1.2));
    }

    #[test]
    fn equality_with_scaled_green_is_not_dominant() {
        // 150 * 1.2 == 180
        assert!(!Pixel::new(180, 150, 140).is_red_dominant(1.2));
    }

    #[test]
    fn sensitivity_applies_to_each_channel_separately() {
        // Beats green by a wide margin but not blue.
        let pixel = Pixel::new(120, 10, 110);
        assert!(!pixel.is_red_dominant(1.2));
        assert!(pixel.is_red_dominant(1.0));
    }

    #[test]
    fn converts_to_and_from_rgb() {
        let pixel = Pixel::from([1, 2, 3]);
        let rgb: Rgb = pixel.into();
        assert_eq!(rgb, [1, 2, 3]);
    }
}
