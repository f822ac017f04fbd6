//! Frame hand-off between the camera and the renderer.
//!
//! The camera delivers frames on its own schedule and the display draws on
//! another. [`FrameBuffer`] joins them with exactly one slot: at most one
//! frame of lag, no queue, and no blocking on either side. Frames arriving
//! while the slot is busy or still unread are dropped, which is the only
//! backpressure the pipeline has.

mod buffer;

pub use buffer::{FrameBuffer, FrameBufferStats};
