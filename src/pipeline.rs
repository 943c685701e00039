// THEORY:
// The `pipeline` module is the top-level API of the crate. It packages the pure
// algorithms from `core_modules` into a small closed set of operations and offers a
// stateful session for callers that want to load an image, run operations on it,
// and write the results out under conventional names.
//
// Key architectural principles:
// 1.  **Tagged Operations**: `Operation` is an enum, not a hierarchy. Thresholding
//     (absolute or percentage) and redness detection are variants that all consume
//     a `PixelBuffer` and produce an `Outcome`.
// 2.  **Pure Core, Stateful Shell**: `Operation::apply` is a pure function.
//     `ImageSession` wraps it and retains the source buffer and the last outcome so
//     they can be fetched or saved later. Running an operation never mutates the
//     source buffer.
// 3.  **Injected Locations**: where images are read from and written to comes from
//     the `ImageStore`s handed to the session, never from global state.

use crate::config::AnalysisConfig;
use crate::core_modules::pixel::Sensitivity;
use crate::core_modules::pixel_buffer::PixelBuffer;
use crate::core_modules::redness_detector::{self, RednessReport};
use crate::core_modules::threshold_filter::{self, ThresholdSpec};
use crate::core_modules::utils::image_helper::{self, ImageStore};
use crate::error::{Result, VisionError};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// One analysis step over a buffer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Operation {
    Threshold(ThresholdSpec),
    RednessDetect { sensitivity: Sensitivity },
}

/// What an `Operation` produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Thresholded(PixelBuffer),
    Redness(RednessReport),
}

impl Outcome {
    /// The output image regardless of which operation produced it.
    pub fn buffer(&self) -> &PixelBuffer {
        match self {
            Outcome::Thresholded(buffer) => buffer,
            Outcome::Redness(report) => &report.mask,
        }
    }

    pub fn red_fraction(&self) -> Option<f64> {
        match self {
            Outcome::Thresholded(_) => None,
            Outcome::Redness(report) => Some(report.red_fraction),
        }
    }
}

impl Operation {
    pub fn apply(&self, buffer: &PixelBuffer) -> Result<Outcome> {
        match *self {
            Operation::Threshold(spec) => threshold_filter::apply(buffer, spec).map(Outcome::Thresholded),
            Operation::RednessDetect { sensitivity } => {
                redness_detector::detect(buffer, sensitivity).map(Outcome::Redness)
            }
        }
    }

    /// The conventional file name for this operation's output on `source`.
    pub fn output_name(&self, source: &Path, fallback_ext: &str) -> String {
        match *self {
            Operation::Threshold(spec) => image_helper::threshold_output_name(source, spec, fallback_ext),
            Operation::RednessDetect { sensitivity } => {
                image_helper::redness_output_name(source, sensitivity, fallback_ext)
            }
        }
    }
}

/// The JSON summary written next to a redness mask.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectionSummary {
    pub source: PathBuf,
    pub output: Option<PathBuf>,
    pub sensitivity: Sensitivity,
    pub red_pixels: usize,
    pub total_pixels: usize,
    pub red_fraction: f64,
}

impl DetectionSummary {
    pub fn new(source: &Path, sensitivity: Sensitivity, report: &RednessReport) -> Self {
        Self {
            source: source.to_path_buf(),
            output: None,
            sensitivity,
            red_pixels: report.red_pixels,
            total_pixels: report.mask.pixel_count(),
            red_fraction: report.red_fraction,
        }
    }
}

/// A loaded image plus the most recent result computed from it.
pub struct ImageSession {
    input: ImageStore,
    output: ImageStore,
    output_extension: String,
    source: PathBuf,
    image: PixelBuffer,
    last_operation: Option<Operation>,
    last_outcome: Option<Outcome>,
}

impl ImageSession {
    pub fn open(config: &AnalysisConfig, source: impl AsRef<Path>) -> Result<Self> {
        let input = ImageStore::new(&config.assets_dir);
        let output = ImageStore::new(config.output_dir());
        let source = source.as_ref().to_path_buf();
        let image = input.load_image(&source)?;
        Ok(Self {
            input,
            output,
            output_extension: config.output_extension.clone(),
            source,
            image,
            last_operation: None,
            last_outcome: None,
        })
    }

    /// Starts a session over an in-memory buffer. `source` is only used for naming.
    pub fn from_buffer(config: &AnalysisConfig, source: impl AsRef<Path>, image: PixelBuffer) -> Self {
        Self {
            input: ImageStore::new(&config.assets_dir),
            output: ImageStore::new(config.output_dir()),
            output_extension: config.output_extension.clone(),
            source: source.as_ref().to_path_buf(),
            image,
            last_operation: None,
            last_outcome: None,
        }
    }

    /// Replaces the source image and forgets the previous result.
    pub fn set_image(&mut self, source: impl AsRef<Path>) -> Result<()> {
        let source = source.as_ref();
        self.image = self.input.load_image(source)?;
        self.source = source.to_path_buf();
        self.last_operation = None;
        self.last_outcome = None;
        Ok(())
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    /// The source buffer as loaded.
    pub fn array(&self) -> &PixelBuffer {
        &self.image
    }

    pub fn last_outcome(&self) -> Option<&Outcome> {
        self.last_outcome.as_ref()
    }

    /// Runs `operation` on the source image and retains the outcome.
    pub fn run(&mut self, operation: Operation) -> Result<&Outcome> {
        let outcome = operation.apply(&self.image)?;
        debug!(source = %self.source.display(), ?operation, "operation finished");
        self.last_operation = Some(operation);
        let outcome = self.last_outcome.insert(outcome);
        Ok(&*outcome)
    }

    /// Writes the last outcome under its conventional name. Returns the path written.
    pub fn save_result(&self) -> Result<PathBuf> {
        let (operation, outcome) = self
            .last_operation
            .as_ref()
            .zip(self.last_outcome.as_ref())
            .ok_or_else(|| VisionError::invalid_parameter("no result to save; run an operation first"))?;
        let name = operation.output_name(&self.source, &self.output_extension);
        self.output.save_image(outcome.buffer(), name)
    }

    /// Writes a `DetectionSummary` for the last redness result to `name`.
    pub fn write_summary(&self, name: impl AsRef<Path>, output: Option<PathBuf>) -> Result<PathBuf> {
        match (self.last_operation, self.last_outcome.as_ref()) {
            (Some(Operation::RednessDetect { sensitivity }), Some(Outcome::Redness(report))) => {
                let mut summary = DetectionSummary::new(&self.source, sensitivity, report);
                summary.output = output;
                self.output.write_json(&summary, name)
            }
            _ => Err(VisionError::invalid_parameter(
                "no redness result to summarize",
            )),
        }
    }
}
