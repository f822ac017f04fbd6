//! Camera input and frame handling.
//!
//! This module provides the camera abstraction that feeds preview frames
//! into the pipeline, the frame type itself, and run configuration.

mod camera;
mod config;
mod frame;

pub use camera::{Camera, CameraError, MockCamera};
pub use config::{CaptureConfig, ConfigError, DetectorConfig, FileConfig, OutputConfig};
pub use frame::{luma_len, Frame, FrameError};
