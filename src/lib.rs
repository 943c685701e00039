// THEORY:
// This file is the entry point of the `red_vision` library crate. It exposes two
// layers:
//
// - `core_modules`: the pure, single-threaded algorithms over `PixelBuffer`s
//   (thresholding, redness detection, test image synthesis) and the thin file I/O
//   adapter around the `image` crate.
// - `pipeline` / `parallel_pipeline`: the operation enum, the stateful
//   `ImageSession`, and the batch processor that runs an operation over many files.
//
// Configuration and errors are shared by both layers.

pub mod config;
pub mod core_modules;
pub mod error;
pub mod parallel_pipeline;
pub mod pipeline;

pub use crate::config::AnalysisConfig;
pub use crate::core_modules::pixel_buffer::PixelBuffer;
pub use crate::core_modules::redness_detector::RednessReport;
pub use crate::core_modules::threshold_filter::ThresholdSpec;
pub use crate::error::{Result, VisionError};
pub use crate::pipeline::{ImageSession, Operation, Outcome};
