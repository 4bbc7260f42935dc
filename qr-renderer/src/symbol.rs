//! QR symbol rendering.
//!
//! The symbol itself is produced by the `qrcode` crate; this module only maps
//! its modules onto a pixel raster of the requested side length.

use image::{Rgba, RgbaImage};
use qr_core::GenerationRequest;
use qrcode::{EcLevel, QrCode};

use crate::error::{RenderError, RenderResult};
use crate::surface::{QrBitmap, BLACK, WHITE};

/// QR error correction level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ErrorCorrection {
    /// ~7% recovery.
    Low,
    /// ~15% recovery.
    Medium,
    /// ~25% recovery.
    Quartile,
    /// ~30% recovery; leaves room for a logo over the centre.
    #[default]
    High,
}

impl From<ErrorCorrection> for EcLevel {
    fn from(level: ErrorCorrection) -> Self {
        match level {
            ErrorCorrection::Low => EcLevel::L,
            ErrorCorrection::Medium => EcLevel::M,
            ErrorCorrection::Quartile => EcLevel::Q,
            ErrorCorrection::High => EcLevel::H,
        }
    }
}

/// Colours and error correction for rendered symbols.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymbolStyle {
    /// Error correction level.
    pub error_correction: ErrorCorrection,
    /// Colour of dark modules.
    pub foreground: Rgba<u8>,
    /// Colour of light modules.
    pub background: Rgba<u8>,
}

impl Default for SymbolStyle {
    fn default() -> Self {
        Self {
            error_correction: ErrorCorrection::High,
            foreground: BLACK,
            background: WHITE,
        }
    }
}

/// Produces a square QR raster for a piece of text.
pub trait SymbolRenderer: Send + Sync {
    /// Render `text` as a QR symbol exactly `size` pixels on a side.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Symbol`] if the text cannot be encoded, or if
    /// the symbol has more modules per side than `size` has pixels.
    fn render(&self, text: &str, size: u32) -> RenderResult<QrBitmap>;

    /// Render a validated request.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Symbol`] if the text cannot be encoded or does
    /// not fit the requested size.
    fn render_request(&self, request: &GenerationRequest) -> RenderResult<QrBitmap> {
        self.render(request.text(), request.size())
    }
}

/// [`SymbolRenderer`] backed by the `qrcode` crate.
///
/// No quiet zone is drawn; the compositor's padding provides the margin.
#[derive(Debug, Clone, Default)]
pub struct QrCodeRenderer {
    style: SymbolStyle,
}

impl QrCodeRenderer {
    /// Create a renderer with black-on-white, high error correction.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a renderer with a custom style.
    #[must_use]
    pub fn with_style(style: SymbolStyle) -> Self {
        Self { style }
    }

    /// The active style.
    #[must_use]
    pub const fn style(&self) -> &SymbolStyle {
        &self.style
    }
}

impl SymbolRenderer for QrCodeRenderer {
    #[allow(clippy::cast_possible_truncation)]
    fn render(&self, text: &str, size: u32) -> RenderResult<QrBitmap> {
        if size == 0 {
            return Err(RenderError::Surface("QR size must be positive".to_string()));
        }

        let code = QrCode::with_error_correction_level(text.as_bytes(), self.style.error_correction.into())
            .map_err(|e| RenderError::Symbol(e.to_string()))?;

        let modules = code.width();
        let side = size as usize;
        if modules > side {
            return Err(RenderError::Symbol(format!(
                "{modules} modules per side do not fit in {size}px"
            )));
        }

        // Nearest-neighbour mapping keeps the raster exactly `size` wide even
        // when it is not a multiple of the module count.
        let image = RgbaImage::from_fn(size, size, |x, y| {
            let qx = x as usize * modules / side;
            let qy = y as usize * modules / side;
            if code[(qx, qy)] == qrcode::Color::Dark {
                self.style.foreground
            } else {
                self.style.background
            }
        });

        tracing::trace!("Rendered {modules}x{modules} QR symbol at {size}px");
        QrBitmap::new(image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bitmap_has_requested_side() {
        let renderer = QrCodeRenderer::new();
        for size in [100, 157, 200, 333, 400] {
            let bitmap = renderer.render("https://example.com", size).expect("render");
            assert_eq!(bitmap.side(), size);
        }
    }

    #[test]
    fn test_bitmap_uses_only_style_colours() {
        let renderer = QrCodeRenderer::new();
        let bitmap = renderer.render("hello", 120).expect("render");
        assert!(bitmap
            .image()
            .pixels()
            .all(|p| *p == BLACK || *p == WHITE));
    }

    #[test]
    fn test_finder_pattern_corner_is_dark() {
        // Without a quiet zone the top-left module belongs to a finder pattern.
        let bitmap = QrCodeRenderer::new().render("hello", 200).expect("render");
        assert_eq!(*bitmap.image().get_pixel(0, 0), BLACK);
        assert_eq!(*bitmap.image().get_pixel(199, 0), BLACK);
        assert_eq!(*bitmap.image().get_pixel(0, 199), BLACK);
    }

    #[test]
    fn test_rendering_is_deterministic() {
        let renderer = QrCodeRenderer::new();
        let a = renderer.render("same text", 240).expect("render");
        let b = renderer.render("same text", 240).expect("render");
        assert_eq!(a, b);
    }

    #[test]
    fn test_oversized_text_is_symbol_error() {
        let text = "x".repeat(4000);
        let err = QrCodeRenderer::new().render(&text, 400).unwrap_err();
        assert!(matches!(err, RenderError::Symbol(_)));
    }

    #[test]
    fn test_symbol_wider_than_size_is_symbol_error() {
        let text = "x".repeat(1000);
        let err = QrCodeRenderer::new().render(&text, 100).unwrap_err();
        assert!(matches!(&err, RenderError::Symbol(msg) if msg.contains("100px")));

        let bitmap = QrCodeRenderer::new().render(&text, 400).unwrap();
        assert_eq!(bitmap.side(), 400);
    }

    #[test]
    fn test_custom_style_colours() {
        let red = Rgba([255, 0, 0, 255]);
        let renderer = QrCodeRenderer::with_style(SymbolStyle {
            foreground: red,
            ..SymbolStyle::default()
        });
        let bitmap = renderer.render("style", 100).expect("render");
        assert_eq!(*bitmap.image().get_pixel(0, 0), red);
    }
}
