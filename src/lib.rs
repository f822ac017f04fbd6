//! Edge Finder Library
//!
//! Live edge-detected overlay for a camera preview, with still capture of
//! the edge image.
//!
//! # Architecture
//!
//! Two threads of control share one single-slot mailbox:
//!
//! ```text
//! camera ──publish──▶ FrameBuffer ──try_consume──▶ detector ──▶ display
//!                                                     │
//!                                   (capture pending) └──▶ Bitmap ──▶ ImageStore
//! ```
//!
//! # Design Principles
//!
//! - **Never block**: camera and renderer both use try-lock; the loser drops
//! - **One frame of lag**: no queue, an unseen frame is never overwritten
//! - **Pure kernel**: the detector is a function of its inputs, allocation-free
//! - **Nothing is fatal**: bad frames and failed saves are reported and skipped
//!
//! # Example
//!
//! ```no_run
//! use edge_finder::{
//!     capture::{Camera, CaptureConfig, MockCamera},
//!     detector::{Bitmap, EdgeDetector},
//!     view::{EdgeView, PngDirectoryStore},
//! };
//!
//! let config = CaptureConfig::with_dimensions(320, 240);
//! let mut camera = MockCamera::new();
//! camera.open(&config).unwrap();
//!
//! let view = EdgeView::new(EdgeDetector::default(), PngDirectoryStore::new("captures"));
//! let mut display = Bitmap::new(config.width, config.height);
//!
//! view.request_capture();
//! for _ in 0..10 {
//!     let frame = camera.capture().unwrap();
//!     view.on_preview_frame(frame.pixels(), frame.width(), frame.height()).unwrap();
//!     println!("{:?}", view.on_draw(&mut display));
//! }
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod capture;
pub mod detector;
pub mod logging;
pub mod mailbox;
pub mod metrics;
pub mod view;

// Re-export commonly used types at crate root
pub use capture::{Camera, CaptureConfig, FileConfig, Frame, FrameError, MockCamera};
pub use detector::{Bitmap, EdgeDetector, EdgeMask, RenderError, Surface};
pub use mailbox::{FrameBuffer, FrameBufferStats};
pub use view::{CaptureState, DrawOutcome, EdgeView, ImageStore, PngDirectoryStore};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
