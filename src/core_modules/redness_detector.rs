// THEORY:
// The `RednessDetector` turns an RGB buffer into an achromatic mask of "red-dominant"
// pixels and reports what share of the image they cover.
//
// Key architectural principles:
// 1.  **Single-Pixel Scope**: Each pixel is classified on its own through
//     `Pixel::is_red_dominant`. No neighbor, no history, no ordering dependency.
// 2.  **Fail Before Work**: The buffer must carry exactly three channels and the
//     sensitivity must be a finite positive number. Both are checked before any
//     pixel is read, so a failed call never yields a partial mask.
// 3.  **Statistics as Output**: `red_fraction` is returned next to the mask rather
//     than derived later from it. It is the number reports and batch summaries use.

use crate::core_modules::pixel::Sensitivity;
use crate::core_modules::pixel_buffer::{PixelBuffer, RGB_CHANNELS};
use crate::core_modules::threshold_filter::{BLACK, WHITE};
use crate::error::{Result, VisionError};
use tracing::debug;

pub const DEFAULT_SENSITIVITY: Sensitivity = 1.2;

const RED_PIXEL: [u8; RGB_CHANNELS] = [WHITE; RGB_CHANNELS];
const OTHER_PIXEL: [u8; RGB_CHANNELS] = [BLACK; RGB_CHANNELS];

/// The result of a redness pass over one buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct RednessReport {
    /// White where the source pixel is red-dominant, black elsewhere. Always RGB.
    pub mask: PixelBuffer,
    /// Number of red-dominant pixels.
    pub red_pixels: usize,
    /// `red_pixels / (height * width)`, in [0, 1].
    pub red_fraction: f64,
}

/// Rejects non-finite or non-positive sensitivities.
pub fn validate_sensitivity(sensitivity: Sensitivity) -> Result<()> {
    if !sensitivity.is_finite() || sensitivity <= 0.0 {
        return Err(VisionError::invalid_parameter(format!(
            "sensitivity must be a positive number, got {sensitivity}"
        )));
    }
    Ok(())
}

/// Classifies every pixel of `buffer` and builds the mask and red fraction.
pub fn detect(buffer: &PixelBuffer, sensitivity: Sensitivity) -> Result<RednessReport> {
    if !buffer.is_rgb() {
        return Err(VisionError::invalid_format("image must be RGB"));
    }
    validate_sensitivity(sensitivity)?;

    let mut mask = Vec::with_capacity(buffer.pixel_count() * RGB_CHANNELS);
    let mut red_pixels = 0usize;
    for pixel in buffer.rgb_pixels()? {
        if pixel.is_red_dominant(sensitivity) {
            red_pixels += 1;
            mask.extend_from_slice(&RED_PIXEL);
        } else {
            mask.extend_from_slice(&OTHER_PIXEL);
        }
    }

    let red_fraction = red_pixels as f64 / buffer.pixel_count() as f64;
    debug!(
        sensitivity,
        red_pixels,
        red_fraction,
        shape = ?buffer.shape(),
        "redness detection finished"
    );

    Ok(RednessReport {
        mask: PixelBuffer::new(buffer.height(), buffer.width(), RGB_CHANNELS, mask)?,
        red_pixels,
        red_fraction,
    })
}

/// `detect` with the default sensitivity of 1.2.
pub fn detect_default(buffer: &PixelBuffer) -> Result<RednessReport> {
    detect(buffer, DEFAULT_SENSITIVITY)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single(rgb: [u8; 3]) -> PixelBuffer {
        PixelBuffer::new(1, 1, 3, rgb.to_vec()).unwrap()
    }

    #[test]
    fn gray_background_has_no_red() {
        let buffer = PixelBuffer::filled_rgb(20, 30, [200, 200, 200]).unwrap();
        let report = detect(&buffer, 1.2).unwrap();
        assert_eq!(report.red_fraction, 0.0);
        assert!(report.mask.as_slice().iter().all(|&v| v == BLACK));
    }

    #[test]
    fn pure_red_is_all_red() {
        let buffer = PixelBuffer::filled_rgb(20, 30, [255, 0, 0]).unwrap();
        let report = detect_default(&buffer).unwrap();
        assert_eq!(report.red_fraction, 1.0);
        assert_eq!(report.red_pixels, 600);
        assert!(report.mask.as_slice().iter().all(|&v| v == WHITE));
    }

    #[test]
    fn worked_examples() {
        assert_eq!(detect(&single([200, 100, 80]), 1.2).unwrap().red_pixels, 1);
        assert_eq!(detect(&single([180, 150, 140]), 1.2).unwrap().red_pixels, 0);
    }

    #[test]
    fn mixed_buffer_reports_fraction_and_achromatic_mask() {
        let data = vec![
            200, 100, 80, // red
            10, 10, 10, // gray
            255, 0, 0, // red
            100, 200, 50, // green
        ];
        let buffer = PixelBuffer::new(2, 2, 3, data).unwrap();
        let report = detect(&buffer, 1.2).unwrap();
        assert_eq!(report.red_fraction, 0.5);
        assert_eq!(report.mask.get(0, 0), &[255, 255, 255]);
        assert_eq!(report.mask.get(0, 1), &[0, 0, 0]);
        assert_eq!(report.mask.get(1, 0), &[255, 255, 255]);
        assert_eq!(report.mask.get(1, 1), &[0, 0, 0]);
    }

    #[test]
    fn source_buffer_is_untouched() {
        let buffer = PixelBuffer::filled_rgb(3, 3, [250, 10, 10]).unwrap();
        let before = buffer.clone();
        let _ = detect(&buffer, 1.2).unwrap();
        assert_eq!(buffer, before);
    }

    #[test]
    fn grayscale_is_rejected() {
        let buffer = PixelBuffer::filled(4, 4, 1, 255).unwrap();
        let err = detect(&buffer, 1.2).unwrap_err();
        assert!(matches!(err, VisionError::InvalidImageFormat { .. }));
        assert!(err.to_string().contains("image must be RGB"));
    }

    #[test]
    fn non_positive_sensitivity_is_rejected() {
        let buffer = single([255, 0, 0]);
        for sensitivity in [0.0, -1.2, f64::NAN, f64::INFINITY] {
            let err = detect(&buffer, sensitivity).unwrap_err();
            assert!(matches!(err, VisionError::InvalidParameter { .. }));
        }
    }

    #[test]
    fn raising_sensitivity_never_adds_red_pixels() {
        let mut data = Vec::new();
        for r in (0..=255).step_by(15) {
            for g in (1..=255).step_by(30) {
                for b in (1..=255).step_by(45) {
                    data.extend_from_slice(&[r as u8, g as u8, b as u8]);
                }
            }
        }
        let pixels = data.len() / 3;
        let buffer = PixelBuffer::new(1, pixels, 3, data).unwrap();

        let mut previous = detect(&buffer, 0.5).unwrap();
        for sensitivity in [0.8, 1.0, 1.2, 1.5, 2.0, 4.0] {
            let current = detect(&buffer, sensitivity).unwrap();
            for x in 0..pixels {
                if current.mask.get(0, x)[0] == WHITE {
                    assert_eq!(previous.mask.get(0, x)[0], WHITE, "pixel {x} at {sensitivity}");
                }
            }
            assert!(current.red_fraction <= previous.red_fraction);
            previous = current;
        }
    }
}
