//! Render path glue: capture control, persistence and the edge view.
//!
//! [`EdgeView`] is what a host wires up. The camera callback publishes
//! into its frame buffer, the display's draw callback renders from it, and
//! the shutter arms a capture that diverts the next frame into an
//! offscreen [`Bitmap`](crate::detector::Bitmap) handed to an
//! [`ImageStore`].

mod controller;
mod edge_view;
mod store;

pub use controller::{CaptureController, CaptureState};
pub use edge_view::{
    CaptureListener, DrawOutcome, EdgeView, LogListener, RedrawRequester, ViewStats,
};
pub use store::{CaptureMetadata, ImageStore, PngDirectoryStore, StoreError};
