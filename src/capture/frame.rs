//! Frame type representing a captured luminance image with metadata.

use std::time::Instant;
use thiserror::Error;

/// Errors raised when raw samples do not describe a usable frame.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    /// Width or height is zero.
    #[error("frame has a zero dimension ({width}x{height})")]
    ZeroDimension {
        /// Claimed width.
        width: u32,
        /// Claimed height.
        height: u32,
    },
    /// `width * height` does not fit in `usize`.
    #[error("frame dimensions {width}x{height} overflow the address space")]
    DimensionOverflow {
        /// Claimed width.
        width: u32,
        /// Claimed height.
        height: u32,
    },
    /// Fewer bytes than the luminance plane needs.
    #[error("sample buffer too short: expected at least {expected} bytes, got {actual}")]
    Truncated {
        /// `width * height`.
        expected: usize,
        /// Bytes supplied.
        actual: usize,
    },
}

/// Returns `width * height` for a non-empty frame, or the reason it is unusable.
pub fn luma_len(width: u32, height: u32) -> Result<usize, FrameError> {
    if width == 0 || height == 0 {
        return Err(FrameError::ZeroDimension { width, height });
    }
    (width as usize)
        .checked_mul(height as usize)
        .ok_or(FrameError::DimensionOverflow { width, height })
}

/// A single luminance frame from the camera.
///
/// One byte per pixel, row-major. The slot inside
/// [`FrameBuffer`](crate::mailbox::FrameBuffer) keeps one of these alive
/// and overwrites it in place, so the storage is reused across frames.
#[derive(Clone)]
pub struct Frame {
    /// Luminance samples.
    pixels: Vec<u8>,
    /// Frame width in pixels.
    width: u32,
    /// Frame height in pixels.
    height: u32,
    /// When the samples were copied in.
    timestamp: Instant,
    /// Monotonic sequence number.
    sequence: u64,
}

impl Frame {
    /// Creates a new frame with the given parameters.
    pub fn new(pixels: Vec<u8>, width: u32, height: u32, sequence: u64) -> Self {
        Self {
            pixels,
            width,
            height,
            timestamp: Instant::now(),
            sequence,
        }
    }

    /// An empty 0x0 frame, used as the initial mailbox slot.
    pub fn empty() -> Self {
        Self::new(Vec::new(), 0, 0, 0)
    }

    /// Builds a frame from the luminance plane at the front of `data`.
    ///
    /// Bytes past `width * height` (e.g. the interleaved chroma plane of an
    /// NV21 preview buffer) are ignored.
    pub fn from_luma(data: &[u8], width: u32, height: u32, sequence: u64) -> Result<Self, FrameError> {
        let mut frame = Self::empty();
        frame.overwrite(data, width, height, sequence)?;
        Ok(frame)
    }

    /// Replaces the contents of this frame, reusing its allocation.
    ///
    /// On error the frame is left unchanged.
    pub fn overwrite(
        &mut self,
        data: &[u8],
        width: u32,
        height: u32,
        sequence: u64,
    ) -> Result<(), FrameError> {
        let len = luma_len(width, height)?;
        if data.len() < len {
            return Err(FrameError::Truncated {
                expected: len,
                actual: data.len(),
            });
        }

        self.pixels.clear();
        self.pixels.extend_from_slice(&data[..len]);
        self.width = width;
        self.height = height;
        self.sequence = sequence;
        self.timestamp = Instant::now();
        Ok(())
    }

    /// Returns a reference to the raw pixel data.
    #[inline]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Returns the frame width.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the frame height.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns the time the samples were copied in.
    #[inline]
    pub fn timestamp(&self) -> Instant {
        self.timestamp
    }

    /// Returns the sequence number.
    #[inline]
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Returns the total number of pixels (width * height).
    #[inline]
    pub fn pixel_count(&self) -> usize {
        (self.width as usize) * (self.height as usize)
    }

    /// True when there are no samples.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// Validates that the pixel buffer size matches dimensions.
    pub fn is_valid(&self) -> bool {
        self.pixels.len() == self.pixel_count()
    }
}

impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Frame")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("sequence", &self.sequence)
            .field("pixel_bytes", &self.pixels.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_creation() {
        let pixels = vec![0u8; 640 * 480];
        let frame = Frame::new(pixels, 640, 480, 1);

        assert_eq!(frame.width(), 640);
        assert_eq!(frame.height(), 480);
        assert_eq!(frame.sequence(), 1);
        assert!(frame.is_valid());
    }

    #[test]
    fn test_frame_invalid_size() {
        let pixels = vec![0u8; 100]; // Wrong size
        let frame = Frame::new(pixels, 640, 480, 1);

        assert!(!frame.is_valid());
    }

    #[test]
    fn test_from_luma_drops_chroma_plane() {
        // 4x2 NV21: 8 luma bytes followed by 4 interleaved chroma bytes
        let nv21: Vec<u8> = (0..12).collect();
        let frame = Frame::from_luma(&nv21, 4, 2, 7).unwrap();

        assert_eq!(frame.pixels(), &nv21[..8]);
        assert!(frame.is_valid());
        assert_eq!(frame.sequence(), 7);
    }

    #[test]
    fn test_from_luma_rejects_short_buffer() {
        assert_eq!(
            Frame::from_luma(&[0u8; 5], 3, 2, 1).unwrap_err(),
            FrameError::Truncated {
                expected: 6,
                actual: 5
            }
        );
    }

    #[test]
    fn test_zero_dimension_rejected() {
        assert!(matches!(
            Frame::from_luma(&[], 0, 10, 1),
            Err(FrameError::ZeroDimension { .. })
        ));
    }

    #[test]
    fn test_overwrite_failure_leaves_frame_intact() {
        let mut frame = Frame::from_luma(&[1, 2, 3, 4], 2, 2, 1).unwrap();
        assert!(frame.overwrite(&[9; 3], 2, 2, 2).is_err());

        assert_eq!(frame.pixels(), &[1, 2, 3, 4]);
        assert_eq!(frame.sequence(), 1);
    }

    #[test]
    fn test_overwrite_reuses_allocation() {
        let mut frame = Frame::from_luma(&[0u8; 64], 8, 8, 1).unwrap();
        let capacity = frame.pixels.capacity();

        frame.overwrite(&[5u8; 16], 4, 4, 2).unwrap();

        assert_eq!(frame.pixels.capacity(), capacity);
        assert_eq!(frame.pixel_count(), 16);
    }
}
