use crate::core_modules::pixel::Sensitivity;
use crate::core_modules::redness_detector::{self, DEFAULT_SENSITIVITY};
use crate::error::{Result, VisionError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Runtime configuration. Every field has a default, so a config file only needs
/// the values it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Directory relative image names are read from.
    pub assets_dir: PathBuf,
    /// Directory results are written to. Falls back to `assets_dir`.
    pub output_dir: Option<PathBuf>,
    pub sensitivity: Sensitivity,
    /// Extension used when the source name has none.
    pub output_extension: String,
    /// Batch worker count. `None` means one per CPU.
    pub workers: Option<usize>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            assets_dir: PathBuf::from("assets"),
            output_dir: None,
            sensitivity: DEFAULT_SENSITIVITY,
            output_extension: "png".to_string(),
            workers: None,
        }
    }
}

impl AnalysisConfig {
    pub fn output_dir(&self) -> &Path {
        self.output_dir.as_deref().unwrap_or(&self.assets_dir)
    }

    pub fn worker_count(&self) -> usize {
        self.workers.unwrap_or_else(num_cpus::get).max(1)
    }

    pub fn validate(&self) -> Result<()> {
        redness_detector::validate_sensitivity(self.sensitivity)?;
        if self.workers == Some(0) {
            return Err(VisionError::invalid_parameter("workers must be at least 1"));
        }
        Ok(())
    }
}

pub fn load_config(path: &Path) -> Result<AnalysisConfig> {
    let config_error = |message: String| VisionError::Config {
        path: path.to_path_buf(),
        message,
    };
    let contents = fs::read_to_string(path)
        .map_err(|e| config_error(format!("Failed to read config: {e}")))?;
    let config: AnalysisConfig = serde_json::from_str(&contents)
        .map_err(|e| config_error(format!("Failed to parse config: {e}")))?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "sensitivity": 1.5, "output_dir": "out" }"#).unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.sensitivity, 1.5);
        assert_eq!(config.assets_dir, PathBuf::from("assets"));
        assert_eq!(config.output_dir(), Path::new("out"));
        assert_eq!(config.output_extension, "png");
    }

    #[test]
    fn output_dir_falls_back_to_assets() {
        let config = AnalysisConfig::default();
        assert_eq!(config.output_dir(), Path::new("assets"));
        assert!(config.worker_count() >= 1);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "sensitivity": -2.0 }"#).unwrap();
        assert!(matches!(
            load_config(&path).unwrap_err(),
            VisionError::InvalidParameter { .. }
        ));

        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            load_config(&path).unwrap_err(),
            VisionError::Config { .. }
        ));
    }
}
