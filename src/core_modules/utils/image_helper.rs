// THEORY:
// `image_helper` is the boundary between in-memory `PixelBuffer`s and files on disk.
// It is deliberately thin: decoding and encoding are delegated to the `image` crate,
// relative names are resolved against a base directory the caller injects, and the
// output naming convention lives here so every writer derives names the same way.

use crate::core_modules::pixel::Sensitivity;
use crate::core_modules::pixel_buffer::{
    GRAY_ALPHA_CHANNELS, GRAY_CHANNELS, PixelBuffer, RGB_CHANNELS, RGBA_CHANNELS,
};
use crate::core_modules::threshold_filter::ThresholdSpec;
use crate::error::{Result, VisionError};
use image::{DynamicImage, GrayAlphaImage, GrayImage, RgbImage, RgbaImage};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Loads and saves buffers relative to a base directory.
#[derive(Debug, Clone)]
pub struct ImageStore {
    base_dir: PathBuf,
}

impl ImageStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Absolute names pass through untouched; relative ones hang off `base_dir`.
    pub fn resolve(&self, name: impl AsRef<Path>) -> PathBuf {
        let name = name.as_ref();
        if name.is_absolute() {
            name.to_path_buf()
        } else {
            self.base_dir.join(name)
        }
    }

    /// Decodes the file into an RGB buffer. Alpha is discarded.
    pub fn load_image(&self, name: impl AsRef<Path>) -> Result<PixelBuffer> {
        let path = self.resolve(name);
        let load_error = |message: String| VisionError::ImageLoad {
            path: path.clone(),
            message,
        };

        if !path.is_file() {
            return Err(load_error("file does not exist".into()));
        }
        let rgb = image::open(&path)
            .map_err(|e| load_error(e.to_string()))?
            .into_rgb8();
        let (width, height) = rgb.dimensions();
        debug!(path = %path.display(), width, height, "loaded image");
        PixelBuffer::new(height as usize, width as usize, RGB_CHANNELS, rgb.into_raw())
            .map_err(|e| load_error(e.to_string()))
    }

    /// Encodes `buffer` to `name` (format from the extension), creating parent
    /// directories. Returns the path written.
    pub fn save_image(&self, buffer: &PixelBuffer, name: impl AsRef<Path>) -> Result<PathBuf> {
        let path = self.resolve(name);
        let save_error = |message: String| VisionError::ImageSave {
            path: path.clone(),
            message,
        };

        ensure_parent_dir(&path).map_err(save_error)?;
        let (width, height) = image_dimensions(buffer).map_err(save_error)?;
        let raw = buffer.as_slice().to_vec();
        let image = match buffer.channels() {
            GRAY_CHANNELS => GrayImage::from_raw(width, height, raw).map(DynamicImage::ImageLuma8),
            GRAY_ALPHA_CHANNELS => {
                GrayAlphaImage::from_raw(width, height, raw).map(DynamicImage::ImageLumaA8)
            }
            RGB_CHANNELS => RgbImage::from_raw(width, height, raw).map(DynamicImage::ImageRgb8),
            RGBA_CHANNELS => RgbaImage::from_raw(width, height, raw).map(DynamicImage::ImageRgba8),
            other => {
                return Err(save_error(format!(
                    "no image encoding for {other}-channel buffers"
                )));
            }
        }
        .ok_or_else(|| save_error("Failed to create image buffer".into()))?;

        image.save(&path).map_err(|e| save_error(e.to_string()))?;
        info!(path = %path.display(), "saved image");
        Ok(path)
    }

    /// Serializes `value` as pretty JSON to `name`, creating parent directories.
    pub fn write_json<T: Serialize>(&self, value: &T, name: impl AsRef<Path>) -> Result<PathBuf> {
        let path = self.resolve(name);
        let write_error = |message: String| VisionError::ReportWrite {
            path: path.clone(),
            message,
        };
        ensure_parent_dir(&path).map_err(write_error)?;
        let json = serde_json::to_string_pretty(value).map_err(|e| write_error(e.to_string()))?;
        fs::write(&path, json).map_err(|e| write_error(e.to_string()))?;
        Ok(path)
    }
}

/// Width and height as the `u32`s the `image` crate expects.
fn image_dimensions(buffer: &PixelBuffer) -> std::result::Result<(u32, u32), String> {
    Ok((
        dimension_to_u32(buffer.width(), "width")?,
        dimension_to_u32(buffer.height(), "height")?,
    ))
}

fn dimension_to_u32(value: usize, axis: &str) -> std::result::Result<u32, String> {
    u32::try_from(value).map_err(|_| format!("image {axis} {value} exceeds the encoder limit"))
}

fn ensure_parent_dir(path: &Path) -> std::result::Result<(), String> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create {}: {e}", parent.display()))?;
        }
    }
    Ok(())
}

fn split_name(source: &Path, fallback_ext: &str) -> (String, String) {
    let base = source
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    let ext = source
        .extension()
        .map(|ext| ext.to_string_lossy().into_owned())
        .unwrap_or_else(|| fallback_ext.to_string());
    (base, ext)
}

/// `{base}_red_detection_sens_{sensitivity}.{ext}`
pub fn redness_output_name(source: &Path, sensitivity: Sensitivity, fallback_ext: &str) -> String {
    let (base, ext) = split_name(source, fallback_ext);
    format!("{base}_red_detection_sens_{sensitivity}.{ext}")
}

/// `{base}_threshold_{value}.{ext}` or `{base}_threshold_{percentage}percent.{ext}`
pub fn threshold_output_name(source: &Path, spec: ThresholdSpec, fallback_ext: &str) -> String {
    let (base, ext) = split_name(source, fallback_ext);
    match spec {
        ThresholdSpec::Absolute(value) => format!("{base}_threshold_{value}.{ext}"),
        ThresholdSpec::Percentage(percentage) => {
            format!("{base}_threshold_{percentage}percent.{ext}")
        }
    }
}
