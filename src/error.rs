use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum VisionError {
    #[error("Invalid parameter: {message}")]
    InvalidParameter { message: String },

    #[error("Invalid image format: {message}")]
    InvalidImageFormat { message: String },

    #[error("Failed to load image '{path}': {message}")]
    ImageLoad { path: PathBuf, message: String },

    #[error("Failed to save image '{path}': {message}")]
    ImageSave { path: PathBuf, message: String },

    #[error("Failed to write report '{path}': {message}")]
    ReportWrite { path: PathBuf, message: String },

    #[error("Config error for '{path}': {message}")]
    Config { path: PathBuf, message: String },

    #[error("Worker error: {message}")]
    Worker { message: String },
}

pub type Result<T> = std::result::Result<T, VisionError>;

impl VisionError {
    pub(crate) fn invalid_parameter(message: impl Into<String>) -> Self {
        VisionError::InvalidParameter {
            message: message.into(),
        }
    }

    pub(crate) fn invalid_format(message: impl Into<String>) -> Self {
        VisionError::InvalidImageFormat {
            message: message.into(),
        }
    }

    /// Returns an error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            VisionError::InvalidParameter { .. } => "E_PARAM",
            VisionError::InvalidImageFormat { .. } => "E_FORMAT",
            VisionError::ImageLoad { .. } => "E_LOAD",
            VisionError::ImageSave { .. } => "E_SAVE",
            VisionError::ReportWrite { .. } => "E_REPORT",
            VisionError::Config { .. } => "E_CONFIG",
            VisionError::Worker { .. } => "E_WORKER",
        }
    }

    /// True for failures raised by argument validation, before any pixel is touched.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            VisionError::InvalidParameter { .. } | VisionError::InvalidImageFormat { .. }
        )
    }
}
