//! Camera abstraction for preview frame delivery.
//!
//! Real devices live outside this crate; anything that can hand out
//! luminance frames implements [`Camera`].

use super::{CaptureConfig, Frame};
use rand_chacha::ChaCha8Rng;
use rand_core::{RngCore, SeedableRng};
use thiserror::Error;

/// Errors that can occur during camera operations.
#[derive(Debug, Error)]
pub enum CameraError {
    /// The capture configuration was rejected.
    #[error("failed to configure camera: {0}")]
    ConfigFailed(String),
    /// A frame was requested before [`Camera::open`].
    #[error("camera not initialized")]
    NotInitialized,
}

/// Trait for camera implementations.
pub trait Camera {
    /// Opens and initializes the camera with the given configuration.
    fn open(&mut self, config: &CaptureConfig) -> Result<(), CameraError>;

    /// Captures a single preview frame.
    fn capture(&mut self) -> Result<Frame, CameraError>;

    /// Checks if the camera is currently open.
    fn is_open(&self) -> bool;

    /// Closes the camera and releases resources.
    fn close(&mut self);
}

/// Brightness of the moving square.
const SQUARE_LUMA: u8 = 230;
/// Peak brightness of the background ramp.
const RAMP_PEAK: u32 = 128;
/// Sensor noise is drawn from `0..NOISE_SPAN`.
const NOISE_SPAN: u32 = 5;

/// Synthetic camera: a dark horizontal ramp with a bright square sliding
/// diagonally across it, plus a little seeded sensor noise.
///
/// The ramp and the noise stay well under the default threshold, so the
/// square's outline is the only thing the detector should pick up.
#[derive(Debug, Default)]
pub struct MockCamera {
    config: Option<CaptureConfig>,
    rng: Option<ChaCha8Rng>,
    sequence: u64,
}

impl MockCamera {
    /// Creates a closed camera.
    pub fn new() -> Self {
        Self::default()
    }

    fn render_scene(&mut self, width: u32, height: u32) -> Vec<u8> {
        let side = (width.min(height) / 4).max(1);
        let travel_x = width.saturating_sub(side).max(1) as u64;
        let travel_y = height.saturating_sub(side).max(1) as u64;
        let left = (self.sequence * 4 % travel_x) as u32;
        let top = (self.sequence * 3 % travel_y) as u32;

        let mut pixels = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                let inside = (left..left + side).contains(&x) && (top..top + side).contains(&y);
                let base = if inside {
                    SQUARE_LUMA as u32
                } else {
                    x * RAMP_PEAK / width.max(1)
                };
                let noise = match self.rng.as_mut() {
                    Some(rng) => rng.next_u32() % NOISE_SPAN,
                    None => 0,
                };
                pixels.push((base + noise).min(255) as u8);
            }
        }
        pixels
    }
}

impl Camera for MockCamera {
    fn open(&mut self, config: &CaptureConfig) -> Result<(), CameraError> {
        config
            .validate()
            .map_err(|e| CameraError::ConfigFailed(e.to_string()))?;
        self.config = Some(config.clone());
        self.rng = Some(ChaCha8Rng::seed_from_u64(config.seed));
        self.sequence = 0;
        tracing::info!("MockCamera opened with config: {:?}", config);
        Ok(())
    }

    fn capture(&mut self) -> Result<Frame, CameraError> {
        let (width, height) = {
            let config = self.config.as_ref().ok_or(CameraError::NotInitialized)?;
            (config.width, config.height)
        };

        let pixels = self.render_scene(width, height);
        self.sequence += 1;
        Ok(Frame::new(pixels, width, height, self.sequence))
    }

    fn is_open(&self) -> bool {
        self.config.is_some()
    }

    fn close(&mut self) {
        self.config = None;
        self.rng = None;
        tracing::info!("MockCamera closed");
    }
}
