//! Shutter state shared between the input context and the renderer.

use std::sync::atomic::{AtomicBool, Ordering};

/// Whether the next rendered frame goes to the display or to a capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    /// Frames are drawn onto the live surface.
    Live,
    /// The next consumed frame is rendered offscreen and persisted.
    CapturePending,
}

/// Two-state capture flag.
///
/// Set from any input context, cleared by the renderer when it services
/// the request. Repeated requests while pending collapse into one capture.
#[derive(Debug, Default)]
pub struct CaptureController {
    pending: AtomicBool,
}

impl CaptureController {
    /// Creates a controller in [`CaptureState::Live`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Arms a capture. Returns `false` if one was already pending.
    pub fn request_capture(&self) -> bool {
        let armed = !self.pending.swap(true, Ordering::AcqRel);
        if armed {
            tracing::debug!("capture requested");
        }
        armed
    }

    /// Clears the flag, returning whether a capture was pending.
    pub fn take_pending(&self) -> bool {
        self.pending.swap(false, Ordering::AcqRel)
    }

    /// Current state.
    pub fn state(&self) -> CaptureState {
        if self.pending.load(Ordering::Acquire) {
            CaptureState::CapturePending
        } else {
            CaptureState::Live
        }
    }
}
