//! Prometheus metrics for the edge pipeline.
//!
//! Frame drops under contention are normal operation, not errors. These
//! counters are how they are observed.
//!
//! # Metrics Exposed
//!
//! ## Frame buffer
//! - `edge_finder_frames_published_total` - Frames accepted from the camera
//! - `edge_finder_frames_dropped_busy_total` - Dropped while the renderer held the buffer
//! - `edge_finder_frames_dropped_unconsumed_total` - Dropped because the last frame was unseen
//! - `edge_finder_frames_consumed_total` - Frames taken by the renderer
//! - `edge_finder_consume_busy_total` - Draws that found the camera holding the buffer
//! - `edge_finder_consume_empty_total` - Draws that found no fresh frame
//!
//! ## Render path
//! - `edge_finder_frames_rendered_total` - Frames rendered
//! - `edge_finder_frames_skipped_total` - Consumed frames the detector rejected
//! - `edge_finder_frames_rejected_total` - Malformed camera frames
//! - `edge_finder_captures_saved_total` - Captures persisted
//! - `edge_finder_captures_failed_total` - Captures that failed to persist
//!
//! # Example
//!
//! ```no_run
//! use edge_finder::metrics::{MetricsRegistry, MetricsSnapshot};
//!
//! let registry = MetricsRegistry::new().expect("Failed to create registry");
//! registry.update(&MetricsSnapshot::default());
//! println!("{}", registry.encode().unwrap());
//! ```

mod collector;
#[cfg(feature = "metrics")]
mod server;

pub use collector::{MetricsError, MetricsRegistry, MetricsSnapshot};
#[cfg(feature = "metrics")]
pub use server::{MetricsServer, MetricsServerConfig, ServerError};
