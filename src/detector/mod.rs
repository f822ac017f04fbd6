//! Edge detection and drawing.
//!
//! The kernel is a pure function of `(threshold, samples, width, height)`
//! that streams its result onto a [`Surface`]. It runs once per displayed
//! frame, so the steady-state path allocates nothing; only captures
//! allocate, for their offscreen [`Bitmap`].

mod kernel;
mod mask;
mod surface;

pub use kernel::{edge_mask, render, EdgeDetector, RenderError, DEFAULT_THRESHOLD};
pub use mask::EdgeMask;
pub use surface::{Bitmap, Color, Surface, BACKGROUND, EDGE_COLOR};
