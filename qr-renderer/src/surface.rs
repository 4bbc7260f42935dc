//! Raster surfaces passed between the pipeline stages.

use image::{Rgba, RgbaImage};

use crate::error::{RenderError, RenderResult};

/// Opaque white, the background of every composite.
pub const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Opaque black, the default QR foreground.
pub const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// A square QR symbol raster, as produced by a [`SymbolRenderer`].
///
/// Read-only to the compositor.
///
/// [`SymbolRenderer`]: crate::symbol::SymbolRenderer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrBitmap {
    image: RgbaImage,
}

impl QrBitmap {
    /// Wrap a raster produced by a symbol renderer.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Surface`] if the raster is empty or not square.
    pub fn new(image: RgbaImage) -> RenderResult<Self> {
        let (width, height) = image.dimensions();
        if width == 0 || width != height {
            return Err(RenderError::Surface(format!(
                "QR bitmap must be a non-empty square, got {width}x{height}"
            )));
        }
        Ok(Self { image })
    }

    /// Side length in pixels.
    #[must_use]
    pub fn side(&self) -> u32 {
        self.image.width()
    }

    /// The underlying pixels.
    #[must_use]
    pub fn image(&self) -> &RgbaImage {
        &self.image
    }
}

/// The finished raster: padded white background, QR symbol and optional logo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositeImage {
    image: RgbaImage,
}

impl CompositeImage {
    /// Allocate an all-white square surface.
    #[must_use]
    pub fn blank(side: u32) -> Self {
        Self {
            image: RgbaImage::from_pixel(side, side, WHITE),
        }
    }

    /// Width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// The pixel at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinates are out of bounds.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Rgba<u8> {
        *self.image.get_pixel(x, y)
    }

    /// The underlying pixels.
    #[must_use]
    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub(crate) fn image_mut(&mut self) -> &mut RgbaImage {
        &mut self.image
    }

    /// Consume the composite and return its pixels.
    #[must_use]
    pub fn into_image(self) -> RgbaImage {
        self.image
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qr_bitmap_must_be_square() {
        assert!(QrBitmap::new(RgbaImage::new(10, 10)).is_ok());
        assert!(QrBitmap::new(RgbaImage::new(10, 11)).is_err());
        assert!(QrBitmap::new(RgbaImage::new(0, 0)).is_err());
    }

    #[test]
    fn test_blank_composite_is_white() {
        let composite = CompositeImage::blank(4);
        assert_eq!(composite.width(), 4);
        assert_eq!(composite.height(), 4);
        assert!(composite.image().pixels().all(|p| *p == WHITE));
    }
}
