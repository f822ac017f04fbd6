//! The live edge view: camera frames in, edge images out.

use super::controller::{CaptureController, CaptureState};
use super::store::{CaptureMetadata, ImageStore, StoreError};
use crate::capture::{Frame, FrameError};
use crate::detector::{Bitmap, EdgeDetector, RenderError, Surface, BACKGROUND};
use crate::mailbox::{FrameBuffer, FrameBufferStats};
use std::sync::atomic::{AtomicU64, Ordering};

/// Host hook asking the display to schedule another draw.
pub trait RedrawRequester: Send + Sync {
    /// Schedules a draw; must not block.
    fn request_redraw(&self);
}

impl<F> RedrawRequester for F
where
    F: Fn() + Send + Sync,
{
    fn request_redraw(&self) {
        self()
    }
}

/// Host hook told about capture results, e.g. to show a toast.
pub trait CaptureListener: Send + Sync {
    /// A capture was persisted at `location`.
    fn capture_saved(&self, _location: &str) {}
    /// A capture was rendered but could not be persisted.
    fn capture_failed(&self, _error: &StoreError) {}
}

/// Listener that only logs.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogListener;

impl CaptureListener for LogListener {
    fn capture_saved(&self, location: &str) {
        tracing::info!(location, "edge capture saved");
    }

    fn capture_failed(&self, error: &StoreError) {
        tracing::warn!(error = %error, "edge capture could not be saved");
    }
}

/// What one draw cycle did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrawOutcome {
    /// No fresh frame, or the camera held the buffer.
    Idle,
    /// A frame was drawn onto the live surface.
    Rendered {
        /// Edge pixels drawn.
        edges: usize,
    },
    /// A frame was rendered offscreen and persisted.
    Captured {
        /// Edge pixels in the capture.
        edges: usize,
        /// Where the store put it.
        location: String,
    },
    /// A frame was rendered offscreen but persisting it failed.
    CaptureFailed {
        /// Edge pixels in the capture.
        edges: usize,
        /// Store error message.
        error: String,
    },
    /// The consumed frame could not be rendered.
    Skipped(RenderError),
}

/// Counters for the consumer side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViewStats {
    /// Frames rendered, live or offscreen.
    pub rendered: u64,
    /// Consumed frames the detector rejected.
    pub skipped: u64,
    /// Captures the store accepted.
    pub captures_saved: u64,
    /// Captures the store failed to persist.
    pub captures_failed: u64,
    /// Camera frames refused by the mailbox.
    pub frames_rejected: u64,
}

#[derive(Debug, Default)]
struct Counters {
    rendered: AtomicU64,
    skipped: AtomicU64,
    captures_saved: AtomicU64,
    captures_failed: AtomicU64,
    frames_rejected: AtomicU64,
}

/// Where a consumed frame ended up while the buffer guard was held.
enum Pass {
    Live(usize),
    Capture(usize, Bitmap),
}

/// Joins the camera callback, the display's draw cycle and the shutter.
///
/// Share it behind an `Arc`: the camera thread calls
/// [`on_preview_frame`](Self::on_preview_frame), the display thread calls
/// [`on_draw`](Self::on_draw) and any input context may call
/// [`request_capture`](Self::request_capture). None of them block.
pub struct EdgeView {
    buffer: FrameBuffer,
    capture: CaptureController,
    detector: EdgeDetector,
    store: Box<dyn ImageStore>,
    listener: Box<dyn CaptureListener>,
    redraw: Box<dyn RedrawRequester>,
    metadata: CaptureMetadata,
    counters: Counters,
}

impl EdgeView {
    /// Creates a view persisting captures to `store`.
    pub fn new(detector: EdgeDetector, store: impl ImageStore + 'static) -> Self {
        Self {
            buffer: FrameBuffer::new(),
            capture: CaptureController::new(),
            detector,
            store: Box::new(store),
            listener: Box::new(LogListener),
            redraw: Box::new(|| {}),
            metadata: CaptureMetadata::default(),
            counters: Counters::default(),
        }
    }

    /// Sets the display's redraw hook.
    pub fn with_redraw(mut self, redraw: impl RedrawRequester + 'static) -> Self {
        self.redraw = Box::new(redraw);
        self
    }

    /// Sets the capture result listener.
    pub fn with_listener(mut self, listener: impl CaptureListener + 'static) -> Self {
        self.listener = Box::new(listener);
        self
    }

    /// Sets the metadata attached to captures.
    pub fn with_metadata(mut self, metadata: CaptureMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Camera callback. Returns whether the frame was accepted.
    pub fn on_preview_frame(&self, data: &[u8], width: u32, height: u32) -> Result<bool, FrameError> {
        match self.buffer.publish(data, width, height) {
            Ok(accepted) => {
                if accepted {
                    self.redraw.request_redraw();
                }
                Ok(accepted)
            }
            Err(err) => {
                self.counters.frames_rejected.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(error = %err, width, height, "preview frame rejected");
                Err(err)
            }
        }
    }

    /// Shutter event: the next consumed frame is captured.
    pub fn request_capture(&self) -> bool {
        self.capture.request_capture()
    }

    /// Current capture state.
    pub fn capture_state(&self) -> CaptureState {
        self.capture.state()
    }

    /// One display draw cycle.
    ///
    /// Renders the fresh frame, if any, onto `surface`, or captures it when
    /// a capture is pending. Always ends by requesting the next redraw.
    pub fn on_draw<S: Surface + ?Sized>(&self, surface: &mut S) -> DrawOutcome {
        let pass = self
            .buffer
            .try_consume(|frame| self.draw_frame(frame, surface));

        // Persisting happens after the guard is released so the camera can
        // keep publishing during a slow save.
        let outcome = match pass {
            None => DrawOutcome::Idle,
            Some(Ok(Pass::Live(edges))) => {
                self.counters.rendered.fetch_add(1, Ordering::Relaxed);
                DrawOutcome::Rendered { edges }
            }
            Some(Ok(Pass::Capture(edges, bitmap))) => {
                self.counters.rendered.fetch_add(1, Ordering::Relaxed);
                self.persist(edges, bitmap)
            }
            Some(Err(err)) => {
                self.counters.skipped.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(error = %err, "frame skipped");
                DrawOutcome::Skipped(err)
            }
        };

        self.redraw.request_redraw();
        outcome
    }

    /// Renders one consumed frame. A pending capture that fails to render
    /// is re-armed for the next frame.
    fn draw_frame<S: Surface + ?Sized>(
        &self,
        frame: &Frame,
        surface: &mut S,
    ) -> Result<Pass, RenderError> {
        if !self.capture.take_pending() {
            return self.detector.render_frame(frame, surface).map(Pass::Live);
        }

        let mut bitmap = Bitmap::new(frame.width(), frame.height());
        match self.detector.render_frame(frame, &mut bitmap) {
            Ok(edges) => {
                surface.clear(BACKGROUND);
                surface.blit(&bitmap);
                Ok(Pass::Capture(edges, bitmap))
            }
            Err(err) => {
                self.capture.request_capture();
                Err(err)
            }
        }
    }

    fn persist(&self, edges: usize, bitmap: Bitmap) -> DrawOutcome {
        match self.store.save(&bitmap, &self.metadata) {
            Ok(location) => {
                self.counters.captures_saved.fetch_add(1, Ordering::Relaxed);
                self.listener.capture_saved(&location);
                DrawOutcome::Captured { edges, location }
            }
            Err(err) => {
                self.counters.captures_failed.fetch_add(1, Ordering::Relaxed);
                self.listener.capture_failed(&err);
                DrawOutcome::CaptureFailed {
                    edges,
                    error: err.to_string(),
                }
            }
        }
    }

    /// Detector used for every frame.
    pub fn detector(&self) -> &EdgeDetector {
        &self.detector
    }

    /// Consumer-side counters.
    pub fn stats(&self) -> ViewStats {
        ViewStats {
            rendered: self.counters.rendered.load(Ordering::Relaxed),
            skipped: self.counters.skipped.load(Ordering::Relaxed),
            captures_saved: self.counters.captures_saved.load(Ordering::Relaxed),
            captures_failed: self.counters.captures_failed.load(Ordering::Relaxed),
            frames_rejected: self.counters.frames_rejected.load(Ordering::Relaxed),
        }
    }

    /// Mailbox counters.
    pub fn buffer_stats(&self) -> FrameBufferStats {
        self.buffer.stats()
    }
}

impl std::fmt::Debug for EdgeView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EdgeView")
            .field("detector", &self.detector)
            .field("capture", &self.capture.state())
            .field("stats", &self.stats())
            .finish()
    }
}
