//! Forward-difference edge kernel.
//!
//! Each pixel is compared with its right, lower and lower-right neighbors.
//! It is an edge when the largest absolute difference is strictly greater
//! than the threshold. The last row and last column have no complete
//! forward neighborhood and are never edges.
//!
//! One pass over row slices, no allocation, no out-of-bounds indexing.

use super::mask::EdgeMask;
use super::surface::{Color, Surface, BACKGROUND, EDGE_COLOR};
use crate::capture::Frame;
use thiserror::Error;

/// Threshold used when none is configured.
pub const DEFAULT_THRESHOLD: u8 = 30;

/// Errors from the edge kernel.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    /// The sample buffer does not hold exactly `width * height` bytes.
    #[error("sample buffer holds {actual} bytes but {width}x{height} needs {expected}")]
    InvalidInput {
        /// Claimed width.
        width: u32,
        /// Claimed height.
        height: u32,
        /// `width * height`, saturated at `usize::MAX` on overflow.
        expected: usize,
        /// Bytes actually supplied.
        actual: usize,
    },
}

/// Checks that `samples` holds exactly one byte per pixel.
fn check_input(samples: &[u8], width: u32, height: u32) -> Result<(), RenderError> {
    let expected = (width as usize).checked_mul(height as usize);
    if expected == Some(samples.len()) {
        return Ok(());
    }
    Err(RenderError::InvalidInput {
        width,
        height,
        expected: expected.unwrap_or(usize::MAX),
        actual: samples.len(),
    })
}

/// Renders the edges of `samples` onto `surface`.
///
/// The surface is cleared to [`BACKGROUND`] and every edge pixel is
/// plotted in `edge_color`. Returns the number of edge pixels. When
/// `samples.len() != width * height` nothing is drawn.
pub fn render<S: Surface + ?Sized>(
    threshold: u8,
    samples: &[u8],
    width: u32,
    height: u32,
    surface: &mut S,
    edge_color: Color,
) -> Result<usize, RenderError> {
    check_input(samples, width, height)?;

    surface.clear(BACKGROUND);
    if width < 2 || height < 2 {
        return Ok(0);
    }

    let rows = samples.chunks_exact(width as usize);
    let mut edges = 0;
    for (y, (row, below)) in rows.clone().zip(rows.skip(1)).enumerate() {
        let pairs = row.windows(2).zip(below.windows(2));
        for (x, (here, under)) in pairs.enumerate() {
            let p = here[0];
            let gradient = p
                .abs_diff(here[1])
                .max(p.abs_diff(under[0]))
                .max(p.abs_diff(under[1]));
            if gradient > threshold {
                surface.plot(x as u32, y as u32, edge_color);
                edges += 1;
            }
        }
    }

    tracing::trace!(width, height, threshold, edges, "edges rendered");
    Ok(edges)
}

/// Computes the edge mask of `samples` without a display surface.
///
/// The input is checked before the mask is allocated, so absurd
/// dimensions fail with [`RenderError::InvalidInput`].
pub fn edge_mask(
    threshold: u8,
    samples: &[u8],
    width: u32,
    height: u32,
) -> Result<EdgeMask, RenderError> {
    check_input(samples, width, height)?;
    let mut mask = EdgeMask::new(width, height);
    render(threshold, samples, width, height, &mut mask, EDGE_COLOR)?;
    Ok(mask)
}

/// Edge detector with a fixed threshold and edge color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeDetector {
    threshold: u8,
    edge_color: Color,
}

impl EdgeDetector {
    /// Creates a detector drawing in [`EDGE_COLOR`].
    pub fn new(threshold: u8) -> Self {
        Self {
            threshold,
            edge_color: EDGE_COLOR,
        }
    }

    /// Returns the threshold.
    pub fn threshold(&self) -> u8 {
        self.threshold
    }

    /// Renders raw samples onto `surface`.
    pub fn render<S: Surface + ?Sized>(
        &self,
        samples: &[u8],
        width: u32,
        height: u32,
        surface: &mut S,
    ) -> Result<usize, RenderError> {
        render(self.threshold, samples, width, height, surface, self.edge_color)
    }

    /// Renders a frame onto `surface`.
    pub fn render_frame<S: Surface + ?Sized>(
        &self,
        frame: &Frame,
        surface: &mut S,
    ) -> Result<usize, RenderError> {
        self.render(frame.pixels(), frame.width(), frame.height(), surface)
    }
}

impl Default for EdgeDetector {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detector::Bitmap;
    use proptest::prelude::*;

    fn frame_strategy() -> impl Strategy<Value = (u32, u32, Vec<u8>)> {
        (1u32..24, 1u32..24).prop_flat_map(|(w, h)| {
            let len = (w * h) as usize;
            (Just(w), Just(h), prop::collection::vec(any::<u8>(), len))
        })
    }

    #[test]
    fn test_diagonal_step_marks_top_left_only() {
        let mask = edge_mask(30, &[10, 10, 10, 200], 2, 2).unwrap();

        assert!(mask.is_edge(0, 0));
        assert_eq!(mask.count(), 1);
    }

    #[test]
    fn test_flat_image_has_no_edges() {
        let mask = edge_mask(0, &[77u8; 100], 10, 10).unwrap();
        assert_eq!(mask.count(), 0);
    }

    #[test]
    fn test_threshold_is_strict() {
        // Difference of exactly 30 is not an edge at threshold 30
        assert_eq!(edge_mask(30, &[0, 30, 0, 30], 2, 2).unwrap().count(), 0);
        assert_eq!(edge_mask(29, &[0, 30, 0, 30], 2, 2).unwrap().count(), 1);
    }

    #[test]
    fn test_vertical_step_marks_column_before_step() {
        // 4x3, left half dark, right half bright
        let samples = [0, 0, 255, 255, 0, 0, 255, 255, 0, 0, 255, 255];
        let mask = edge_mask(30, &samples, 4, 3).unwrap();

        assert_eq!(mask.edges().collect::<Vec<_>>(), vec![(1, 0), (1, 1)]);
    }

    #[test]
    fn test_size_mismatch_rejected_without_drawing() {
        let mut bitmap = Bitmap::new(2, 2);
        bitmap.plot(0, 0, EDGE_COLOR);

        let err = render(30, &[0u8; 3], 2, 2, &mut bitmap, EDGE_COLOR).unwrap_err();
        assert_eq!(
            err,
            RenderError::InvalidInput {
                width: 2,
                height: 2,
                expected: 4,
                actual: 3
            }
        );
        // Untouched: not even cleared
        assert_eq!(bitmap.pixel(0, 0), Some(EDGE_COLOR));
    }

    #[test]
    fn test_huge_dimensions_rejected_before_allocating() {
        for (w, h) in [(u32::MAX, u32::MAX), (100_000, 100_000)] {
            assert!(matches!(
                edge_mask(0, &[], w, h),
                Err(RenderError::InvalidInput { actual: 0, .. })
            ));
        }
    }

    #[test]
    fn test_overflowing_dimensions_rejected_by_render() {
        let mut mask = EdgeMask::new(2, 2);
        let err = render(0, &[0u8; 4], u32::MAX, u32::MAX, &mut mask, EDGE_COLOR).unwrap_err();

        let expected = (u32::MAX as usize)
            .checked_mul(u32::MAX as usize)
            .unwrap_or(usize::MAX);
        assert_eq!(
            err,
            RenderError::InvalidInput {
                width: u32::MAX,
                height: u32::MAX,
                expected,
                actual: 4
            }
        );
    }

    #[test]
    fn test_render_clears_previous_content() {
        let mut bitmap = Bitmap::new(3, 3);
        bitmap.plot(2, 2, EDGE_COLOR);

        let edges = EdgeDetector::default()
            .render(&[0u8; 9], 3, 3, &mut bitmap)
            .unwrap();

        assert_eq!(edges, 0);
        assert_eq!(bitmap.count(BACKGROUND), 9);
    }

    #[test]
    fn test_empty_and_single_line_frames() {
        assert_eq!(edge_mask(0, &[], 0, 0).unwrap().count(), 0);
        assert_eq!(edge_mask(0, &[0, 255, 0, 255], 4, 1).unwrap().count(), 0);
        assert_eq!(edge_mask(0, &[0, 255, 0], 1, 3).unwrap().count(), 0);
    }

    #[test]
    fn test_custom_color_reaches_surface() {
        let red = image::Rgb([255, 0, 0]);
        let mut bitmap = Bitmap::new(2, 2);
        render(30, &[10, 10, 10, 200], 2, 2, &mut bitmap, red).unwrap();

        assert_eq!(bitmap.pixel(0, 0), Some(red));
        assert_eq!(bitmap.count(red), 1);
    }

    proptest! {
        #[test]
        fn prop_render_is_deterministic((w, h, samples) in frame_strategy(), threshold in any::<u8>()) {
            let first = edge_mask(threshold, &samples, w, h).unwrap();
            let second = edge_mask(threshold, &samples, w, h).unwrap();
            prop_assert_eq!(first, second);
        }

        #[test]
        fn prop_higher_threshold_never_adds_edges(
            (w, h, samples) in frame_strategy(),
            t1 in any::<u8>(),
            t2 in any::<u8>(),
        ) {
            let (low, high) = if t1 <= t2 { (t1, t2) } else { (t2, t1) };
            let loose = edge_mask(low, &samples, w, h).unwrap();
            let strict = edge_mask(high, &samples, w, h).unwrap();
            prop_assert!(strict.is_subset_of(&loose));
            prop_assert!(strict.count() <= loose.count());
        }

        #[test]
        fn prop_last_row_and_column_never_edges(
            (w, h, samples) in frame_strategy(),
            threshold in any::<u8>(),
        ) {
            let mask = edge_mask(threshold, &samples, w, h).unwrap();
            for x in 0..w {
                prop_assert!(!mask.is_edge(x, h - 1));
            }
            for y in 0..h {
                prop_assert!(!mask.is_edge(w - 1, y));
            }
        }

        #[test]
        fn prop_bitmap_and_mask_agree((w, h, samples) in frame_strategy(), threshold in any::<u8>()) {
            let mut bitmap = Bitmap::new(w, h);
            let drawn = render(threshold, &samples, w, h, &mut bitmap, EDGE_COLOR).unwrap();
            let mask = edge_mask(threshold, &samples, w, h).unwrap();

            prop_assert_eq!(drawn, mask.count());
            prop_assert_eq!(bitmap.count(EDGE_COLOR), drawn);
            for (x, y) in mask.edges() {
                prop_assert_eq!(bitmap.pixel(x, y), Some(EDGE_COLOR));
            }
        }

        #[test]
        fn prop_wrong_length_rejected(
            (w, h, mut samples) in frame_strategy(),
            extra in 1usize..8,
            shrink in any::<bool>(),
        ) {
            if shrink {
                samples.pop();
            } else {
                samples.extend(std::iter::repeat(0).take(extra));
            }
            let rejected = matches!(
                edge_mask(0, &samples, w, h),
                Err(RenderError::InvalidInput { .. })
            );
            prop_assert!(rejected);
        }

        #[test]
        fn prop_claimed_size_far_beyond_buffer_rejected(
            w in 1_000u32..=u32::MAX,
            h in 1_000u32..=u32::MAX,
            samples in prop::collection::vec(any::<u8>(), 0..64),
        ) {
            let rejected = matches!(
                edge_mask(0, &samples, w, h),
                Err(RenderError::InvalidInput { .. })
            );
            prop_assert!(rejected);
        }
    }
}
