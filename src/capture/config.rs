//! Camera capture and pipeline configuration.
//!
//! The preview size is fixed for the lifetime of a run; the mailbox and
//! detector only ever see frames of the configured dimensions.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration for camera capture.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Preview width in pixels.
    pub width: u32,
    /// Preview height in pixels.
    pub height: u32,
    /// Target preview frames per second.
    pub fps: u32,
    /// Seed for the synthetic sensor noise of [`MockCamera`](super::MockCamera).
    pub seed: u64,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            fps: 30,
            seed: 0x5eed,
        }
    }
}

impl CaptureConfig {
    /// Creates a new configuration with the specified dimensions.
    pub fn with_dimensions(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }

    /// Validates the configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::InvalidDimensions);
        }
        if self.fps == 0 || self.fps > 120 {
            return Err(ConfigError::InvalidFrameRate);
        }
        Ok(())
    }
}

/// Configuration validation errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    /// Width or height is zero.
    #[error("invalid frame dimensions")]
    InvalidDimensions,
    /// Frame rate outside 1-120.
    #[error("invalid frame rate (must be 1-120 fps)")]
    InvalidFrameRate,
    /// Display refresh rate outside 1-240.
    #[error("invalid display refresh rate (must be 1-240 Hz)")]
    InvalidRefreshRate,
    /// The file could not be read.
    #[error("failed to read config file: {0}")]
    FileReadError(String),
    /// The file is not valid TOML for this format.
    #[error("failed to parse config file: {0}")]
    ParseError(String),
}

/// Full configuration file format.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FileConfig {
    /// `[capture]` section.
    #[serde(default)]
    pub capture: CaptureConfig,
    /// `[detector]` section.
    #[serde(default)]
    pub detector: DetectorConfig,
    /// `[output]` section.
    #[serde(default)]
    pub output: OutputConfig,
}

/// Edge detector configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Gradient threshold; a pixel is an edge when its neighbor
    /// difference is strictly greater than this.
    pub threshold: u8,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            threshold: crate::detector::DEFAULT_THRESHOLD,
        }
    }
}

/// Output configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory captured edge images are written to.
    pub directory: PathBuf,
    /// Run until interrupted (true) or for a fixed number of frames (false).
    pub continuous: bool,
    /// Number of camera frames to deliver if not continuous.
    pub frame_count: u32,
    /// Display refresh rate driving the render loop.
    pub display_hz: u32,
    /// Metrics server port (0 to disable).
    pub metrics_port: u16,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("captures"),
            continuous: false,
            frame_count: 90,
            display_hz: 60,
            metrics_port: 9090,
        }
    }
}

impl FileConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::FileReadError(e.to_string()))?;
        Self::from_toml(&content)
    }

    /// Parses and validates configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: FileConfig =
            toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates every section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.capture.validate()?;
        if self.output.display_hz == 0 || self.output.display_hz > 240 {
            return Err(ConfigError::InvalidRefreshRate);
        }
        Ok(())
    }
}
