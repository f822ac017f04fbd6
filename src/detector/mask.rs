//! Bit-per-pixel edge mask.

use super::surface::{Color, Surface, BACKGROUND};

/// Records which pixels the kernel marked as edges.
///
/// Any non-background plot sets the pixel; colors are not kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeMask {
    bits: Vec<bool>,
    width: u32,
    height: u32,
}

impl EdgeMask {
    /// Creates an empty mask.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            bits: vec![false; width as usize * height as usize],
            width,
            height,
        }
    }

    /// True when (x, y) was marked. Out-of-range coordinates are never edges.
    pub fn is_edge(&self, x: u32, y: u32) -> bool {
        x < self.width && y < self.height && self.bits[self.index(x, y)]
    }

    /// Number of edge pixels.
    pub fn count(&self) -> usize {
        self.bits.iter().filter(|&&b| b).count()
    }

    /// Iterates over edge coordinates in row-major order.
    pub fn edges(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        let width = self.width.max(1) as usize;
        self.bits
            .iter()
            .enumerate()
            .filter(|(_, b)| **b)
            .map(move |(i, _)| ((i % width) as u32, (i / width) as u32))
    }

    /// True when every edge in `self` is also an edge in `other`.
    pub fn is_subset_of(&self, other: &EdgeMask) -> bool {
        self.bits.len() == other.bits.len()
            && self.bits.iter().zip(&other.bits).all(|(&a, &b)| !a || b)
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }
}

impl Surface for EdgeMask {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn clear(&mut self, color: Color) {
        self.bits.fill(color != BACKGROUND);
    }

    fn plot(&mut self, x: u32, y: u32, color: Color) {
        if x < self.width && y < self.height {
            let index = self.index(x, y);
            self.bits[index] = color != BACKGROUND;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detector::EDGE_COLOR;

    #[test]
    fn test_plot_and_query() {
        let mut mask = EdgeMask::new(3, 2);
        mask.plot(2, 1, EDGE_COLOR);

        assert!(mask.is_edge(2, 1));
        assert!(!mask.is_edge(0, 0));
        assert!(!mask.is_edge(3, 1));
        assert_eq!(mask.edges().collect::<Vec<_>>(), vec![(2, 1)]);
    }

    #[test]
    fn test_clear_resets_marks() {
        let mut mask = EdgeMask::new(2, 2);
        mask.plot(0, 0, EDGE_COLOR);
        mask.clear(BACKGROUND);
        assert_eq!(mask.count(), 0);
    }

    #[test]
    fn test_subset() {
        let mut small = EdgeMask::new(2, 2);
        let mut large = EdgeMask::new(2, 2);
        small.plot(0, 0, EDGE_COLOR);
        large.plot(0, 0, EDGE_COLOR);
        large.plot(1, 0, EDGE_COLOR);

        assert!(small.is_subset_of(&large));
        assert!(!large.is_subset_of(&small));
    }
}
