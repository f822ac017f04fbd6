//! Drawing destinations for the edge kernel.

use image::{Rgb, RgbImage};

/// Paint value used by drawing surfaces.
pub type Color = Rgb<u8>;

/// Color edges are drawn in.
pub const EDGE_COLOR: Color = Rgb([255, 255, 255]);

/// Color every surface is cleared to before edges are drawn.
pub const BACKGROUND: Color = Rgb([0, 0, 0]);

/// Anything the edge kernel can draw on.
///
/// The live display is one implementation (provided by the host); the
/// offscreen [`Bitmap`] used for captures and the [`EdgeMask`] used for
/// analysis are the ones this crate ships.
///
/// [`EdgeMask`]: super::EdgeMask
pub trait Surface {
    /// Surface width in pixels.
    fn width(&self) -> u32;

    /// Surface height in pixels.
    fn height(&self) -> u32;

    /// Fills the whole surface with `color`.
    fn clear(&mut self, color: Color);

    /// Paints one pixel. Coordinates outside the surface are ignored.
    fn plot(&mut self, x: u32, y: u32, color: Color);

    /// Copies `bitmap` onto this surface with its origin at (0, 0).
    fn blit(&mut self, bitmap: &Bitmap) {
        for (x, y, pixel) in bitmap.image().enumerate_pixels() {
            self.plot(x, y, *pixel);
        }
    }
}

/// Offscreen RGB surface, allocated per capture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    image: RgbImage,
}

impl Bitmap {
    /// Allocates a `width` x `height` bitmap filled with [`BACKGROUND`].
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbImage::from_pixel(width, height, BACKGROUND),
        }
    }

    /// Returns the pixel at (x, y), or `None` outside the bitmap.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        self.image.get_pixel_checked(x, y).copied()
    }

    /// Number of pixels painted exactly `color`.
    pub fn count(&self, color: Color) -> usize {
        self.image.pixels().filter(|&&p| p == color).count()
    }

    /// Borrows the underlying image.
    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    /// Releases the underlying image.
    pub fn into_image(self) -> RgbImage {
        self.image
    }
}

impl Surface for Bitmap {
    fn width(&self) -> u32 {
        self.image.width()
    }

    fn height(&self) -> u32 {
        self.image.height()
    }

    fn clear(&mut self, color: Color) {
        for pixel in self.image.pixels_mut() {
            *pixel = color;
        }
    }

    fn plot(&mut self, x: u32, y: u32, color: Color) {
        if x < self.image.width() && y < self.image.height() {
            self.image.put_pixel(x, y, color);
        }
    }
}
