// THEORY:
// The `ThresholdFilter` binarizes a buffer: every sample below the cutoff becomes
// black (0), every other sample becomes white (255). It is a per-sample map with no
// neighborhood interaction, so it works on buffers of any channel count alike and
// is idempotent for any fixed cutoff.
//
// A cutoff is given either as an absolute intensity in [0, 255] or as a percentage
// of full scale in [0, 100]. Percentages resolve to `round(p / 100 * 255)`, rounding
// halves away from zero, so 50 % resolves to 128.

use crate::core_modules::pixel_buffer::{Byte, PixelBuffer};
use crate::error::{Result, VisionError};
use tracing::debug;

pub const BLACK: Byte = 0;
pub const WHITE: Byte = 255;

/// How the black/white boundary is specified.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ThresholdSpec {
    /// An intensity in [0, 255].
    Absolute(i32),
    /// A percentage of full scale in [0, 100].
    Percentage(f64),
}

impl ThresholdSpec {
    /// Validates the spec and resolves it to an absolute cutoff.
    pub fn cutoff(&self) -> Result<Byte> {
        match *self {
            ThresholdSpec::Absolute(value) => {
                if !(0..=255).contains(&value) {
                    return Err(VisionError::invalid_parameter(format!(
                        "threshold cutoff must be in [0, 255], got {value}"
                    )));
                }
                Ok(value as Byte)
            }
            ThresholdSpec::Percentage(percentage) => {
                // NaN fails the range check too.
                if !(0.0..=100.0).contains(&percentage) {
                    return Err(VisionError::invalid_parameter(format!(
                        "threshold percentage must be in [0, 100], got {percentage}"
                    )));
                }
                Ok((percentage / 100.0 * 255.0).round() as Byte)
            }
        }
    }
}

/// Returns a new buffer of the same shape with every sample mapped to 0 or 255.
pub fn apply(buffer: &PixelBuffer, spec: ThresholdSpec) -> Result<PixelBuffer> {
    let cutoff = spec.cutoff()?;
    debug!(?spec, cutoff, shape = ?buffer.shape(), "applying threshold");
    Ok(buffer.map_samples(|value| if value < cutoff { BLACK } else { WHITE }))
}
