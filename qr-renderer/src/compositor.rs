//! Logo compositing.
//!
//! Layers a QR bitmap, a white margin and an optional logo into one raster.
//! Draw order matters and mirrors a 2D canvas:
//!
//! ```text
//! 1. white fill (qr side + 2 × padding)
//! 2. QR bitmap at (padding, padding)
//! 3. [logo] white border: circle r = logo/2 + 4, or square inflated by 4
//! 4. [logo] logo stretched to its square, clipped to a circle if rounded
//! ```
//!
//! Steps 3 and 4 wait on the logo decode, the one asynchronous dependency.

use std::sync::Arc;
use std::time::Duration;

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use qr_core::{LogoAsset, LogoScale, LogoShape};

use crate::error::{RenderError, RenderResult};
use crate::logo::{ImageLogoDecoder, LogoDecoder};
use crate::surface::{CompositeImage, QrBitmap, WHITE};

/// White margin around the QR bitmap on every edge, in pixels.
pub const PADDING: u32 = 20;

/// Width of the white border drawn around the logo, in pixels.
pub const BORDER_THICKNESS: u32 = 4;

/// Configuration for the compositor.
#[derive(Debug, Clone)]
pub struct CompositorConfig {
    /// How long to wait for a logo decode before giving up.
    pub decode_timeout: Duration,
}

impl Default for CompositorConfig {
    fn default() -> Self {
        Self {
            decode_timeout: Duration::from_secs(5),
        }
    }
}

/// Where the logo lands on the composite, in canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogoPlacement {
    /// Left edge of the logo square.
    pub x: u32,
    /// Top edge of the logo square.
    pub y: u32,
    /// Side of the logo square.
    pub size: u32,
}

impl LogoPlacement {
    /// Centre a logo of `scale × qr_side` inside the QR region.
    ///
    /// The QR region starts at `(padding, padding)`; the padded canvas plays
    /// no part in the centring. The logo side shares the parity of `qr_side`
    /// so the margins on either side are equal and the centres coincide.
    #[must_use]
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    pub fn compute(qr_side: u32, padding: u32, scale: LogoScale) -> Self {
        let exact = qr_side as f32 * scale.value();
        let mut size = (exact.round() as u32).clamp(1, qr_side);
        if (qr_side - size) % 2 == 1 {
            // Odd margin: step to whichever neighbour is nearer the exact side.
            let down = size - 1;
            let up = size + 1;
            size = if down == 0 || (up as f32 - exact) < (exact - down as f32) {
                up
            } else {
                down
            };
        }
        let offset = padding + (qr_side - size) / 2;
        Self {
            x: offset,
            y: offset,
            size,
        }
    }

    /// Centre of the logo square.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn center(&self) -> (f32, f32) {
        let half = self.size as f32 / 2.0;
        (self.x as f32 + half, self.y as f32 + half)
    }

    /// Radius of the circle inscribed in the logo square.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn radius(&self) -> f32 {
        self.size as f32 / 2.0
    }
}

/// Whether the centre of pixel `(px, py)` lies inside a circle.
#[allow(clippy::cast_precision_loss)]
fn pixel_in_circle(px: u32, py: u32, cx: f32, cy: f32, radius: f32) -> bool {
    let dx = px as f32 + 0.5 - cx;
    let dy = py as f32 + 0.5 - cy;
    dx.mul_add(dx, dy * dy) <= radius * radius
}

/// Fill every pixel whose centre lies inside the circle.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn fill_circle(image: &mut RgbaImage, cx: f32, cy: f32, radius: f32, color: Rgba<u8>) {
    let x0 = (cx - radius).floor().max(0.0) as u32;
    let y0 = (cy - radius).floor().max(0.0) as u32;
    let x1 = ((cx + radius).ceil() as u32).min(image.width());
    let y1 = ((cy + radius).ceil() as u32).min(image.height());

    for y in y0..y1 {
        for x in x0..x1 {
            if pixel_in_circle(x, y, cx, cy, radius) {
                image.put_pixel(x, y, color);
            }
        }
    }
}

/// Fill an axis-aligned rectangle, clamped to the image.
fn fill_rect(image: &mut RgbaImage, x: u32, y: u32, width: u32, height: u32, color: Rgba<u8>) {
    let x1 = x.saturating_add(width).min(image.width());
    let y1 = y.saturating_add(height).min(image.height());
    for py in y..y1 {
        for px in x..x1 {
            image.put_pixel(px, py, color);
        }
    }
}

/// Layers QR bitmaps, padding and logos into composites.
#[derive(Clone)]
pub struct Compositor {
    decoder: Arc<dyn LogoDecoder>,
    config: CompositorConfig,
}

impl std::fmt::Debug for Compositor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Compositor")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Default for Compositor {
    fn default() -> Self {
        Self::new(CompositorConfig::default())
    }
}

impl Compositor {
    /// Create a compositor that decodes logos with the `image` crate.
    #[must_use]
    pub fn new(config: CompositorConfig) -> Self {
        Self::with_decoder(Arc::new(ImageLogoDecoder), config)
    }

    /// Create a compositor with a custom logo decoder.
    #[must_use]
    pub fn with_decoder(decoder: Arc<dyn LogoDecoder>, config: CompositorConfig) -> Self {
        Self { decoder, config }
    }

    /// Get the compositor configuration.
    #[must_use]
    pub const fn config(&self) -> &CompositorConfig {
        &self.config
    }

    /// Steps 1 and 2: white surface with the QR bitmap inset by `padding`.
    ///
    /// This is the complete composite when there is no logo, and the
    /// fallback when a logo cannot be decoded.
    #[must_use]
    pub fn base_surface(qr: &QrBitmap, padding: u32) -> CompositeImage {
        let side = qr.side() + 2 * padding;
        let mut surface = CompositeImage::blank(side);
        imageops::overlay(
            surface.image_mut(),
            qr.image(),
            i64::from(padding),
            i64::from(padding),
        );
        surface
    }

    /// Compose the final raster.
    ///
    /// Resolves once the logo (if any) has been decoded and drawn. Each call
    /// is independent; nothing is shared between in-flight compositions.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::LogoDecode`] if the logo cannot be decoded and
    /// [`RenderError::DecodeTimeout`] if decoding exceeds
    /// [`CompositorConfig::decode_timeout`].
    pub async fn compose(
        &self,
        qr: &QrBitmap,
        padding: u32,
        logo: Option<&LogoAsset>,
    ) -> RenderResult<CompositeImage> {
        let mut surface = Self::base_surface(qr, padding);

        let Some(asset) = logo else {
            return Ok(surface);
        };

        let timeout = self.config.decode_timeout;
        let decoded = tokio::time::timeout(timeout, self.decoder.decode(&asset.image))
            .await
            .map_err(|_| RenderError::DecodeTimeout(timeout))??;

        Self::draw_logo(&mut surface, qr.side(), padding, &decoded, asset);
        Ok(surface)
    }

    /// Steps 3 and 4: draw a decoded logo (and its border) onto a base surface.
    pub fn draw_logo(
        surface: &mut CompositeImage,
        qr_side: u32,
        padding: u32,
        logo: &RgbaImage,
        asset: &LogoAsset,
    ) {
        let placement = LogoPlacement::compute(qr_side, padding, asset.scale);
        let (cx, cy) = placement.center();
        let image = surface.image_mut();

        if asset.border {
            match asset.shape {
                LogoShape::Rounded => {
                    #[allow(clippy::cast_precision_loss)]
                    let radius = placement.radius() + BORDER_THICKNESS as f32;
                    fill_circle(image, cx, cy, radius, WHITE);
                }
                LogoShape::Square => fill_rect(
                    image,
                    placement.x.saturating_sub(BORDER_THICKNESS),
                    placement.y.saturating_sub(BORDER_THICKNESS),
                    placement.size + 2 * BORDER_THICKNESS,
                    placement.size + 2 * BORDER_THICKNESS,
                    WHITE,
                ),
            }
        }

        let mut scaled = imageops::resize(logo, placement.size, placement.size, FilterType::Triangle);

        if asset.shape == LogoShape::Rounded {
            // Clip: anything outside the inscribed circle becomes transparent.
            let local = placement.radius();
            for (x, y, pixel) in scaled.enumerate_pixels_mut() {
                if !pixel_in_circle(x, y, local, local, local) {
                    pixel.0[3] = 0;
                }
            }
        }

        imageops::overlay(
            image,
            &scaled,
            i64::from(placement.x),
            i64::from(placement.y),
        );

        tracing::trace!(
            x = placement.x,
            y = placement.y,
            size = placement.size,
            shape = %asset.shape,
            border = asset.border,
            "Logo drawn"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qr_core::LogoImage;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
    const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);

    fn black_qr(side: u32) -> QrBitmap {
        QrBitmap::new(RgbaImage::from_pixel(side, side, BLACK)).unwrap()
    }

    fn asset(shape: LogoShape, border: bool, percent: u8) -> LogoAsset {
        LogoAsset {
            image: LogoImage::new(vec![1u8]).unwrap(),
            shape,
            border,
            scale: LogoScale::from_percent(percent).unwrap(),
        }
    }

    /// Resampling may shave a unit off the logo colour.
    fn is_red(pixel: Rgba<u8>) -> bool {
        pixel[0] > 200 && pixel[1] < 50 && pixel[2] < 50
    }

    fn red_logo() -> RgbaImage {
        RgbaImage::from_pixel(16, 16, RED)
    }

    #[test]
    fn test_placement_centres_in_qr_region() {
        let placement = LogoPlacement::compute(200, PADDING, LogoScale::from_percent(20).unwrap());
        assert_eq!(placement.size, 40);
        assert_eq!((placement.x, placement.y), (100, 100));
        assert_eq!(placement.center(), (120.0, 120.0));
    }

    #[test]
    fn test_placement_matches_odd_qr_side() {
        // 201 × 20% is 40.2; 41 keeps both margins at 80px.
        let placement = LogoPlacement::compute(201, PADDING, LogoScale::from_percent(20).unwrap());
        assert_eq!(placement.size, 41);
        assert_eq!((placement.x, placement.y), (100, 100));
        assert_eq!(placement.center(), (120.5, 120.5));

        // 200 × 25% is exactly 50; the even result stays put.
        let placement = LogoPlacement::compute(200, PADDING, LogoScale::from_percent(25).unwrap());
        assert_eq!(placement.size, 50);
        assert_eq!(placement.center(), (120.0, 120.0));
    }

    #[test]
    fn test_base_surface_geometry() {
        let surface = Compositor::base_surface(&black_qr(100), PADDING);
        assert_eq!((surface.width(), surface.height()), (140, 140));
        assert_eq!(surface.pixel(19, 19), WHITE);
        assert_eq!(surface.pixel(20, 20), BLACK);
        assert_eq!(surface.pixel(119, 119), BLACK);
        assert_eq!(surface.pixel(120, 120), WHITE);
    }

    #[test]
    fn test_square_logo_with_border() {
        let mut surface = Compositor::base_surface(&black_qr(200), PADDING);
        Compositor::draw_logo(
            &mut surface,
            200,
            PADDING,
            &red_logo(),
            &asset(LogoShape::Square, true, 20),
        );

        // Logo square 100..140, border 96..144
        assert!(is_red(surface.pixel(100, 100)));
        assert!(is_red(surface.pixel(139, 139)));
        assert_eq!(surface.pixel(96, 96), WHITE);
        assert_eq!(surface.pixel(143, 120), WHITE);
        assert_eq!(surface.pixel(95, 120), BLACK);
        assert_eq!(surface.pixel(144, 120), BLACK);
    }

    #[test]
    fn test_square_logo_without_border() {
        let mut surface = Compositor::base_surface(&black_qr(200), PADDING);
        Compositor::draw_logo(
            &mut surface,
            200,
            PADDING,
            &red_logo(),
            &asset(LogoShape::Square, false, 20),
        );
        assert_eq!(surface.pixel(99, 120), BLACK);
        assert!(is_red(surface.pixel(100, 120)));
    }

    #[test]
    fn test_rounded_logo_is_clipped() {
        let mut surface = Compositor::base_surface(&black_qr(200), PADDING);
        Compositor::draw_logo(
            &mut surface,
            200,
            PADDING,
            &red_logo(),
            &asset(LogoShape::Rounded, false, 20),
        );
        assert!(is_red(surface.pixel(120, 120)));
        // Corner of the logo square lies outside the circle.
        assert_eq!(surface.pixel(100, 100), BLACK);
        // Edge midpoints lie inside.
        assert!(is_red(surface.pixel(100, 120)));
    }

    #[test]
    fn test_rounded_border_ring() {
        let mut surface = Compositor::base_surface(&black_qr(200), PADDING);
        Compositor::draw_logo(
            &mut surface,
            200,
            PADDING,
            &red_logo(),
            &asset(LogoShape::Rounded, true, 20),
        );
        // Circle radius 20, border radius 24, centre (120, 120)
        assert_eq!(surface.pixel(98, 120), WHITE);
        assert_eq!(surface.pixel(96, 120), WHITE);
        assert_eq!(surface.pixel(95, 120), BLACK);
        assert_eq!(surface.pixel(100, 100), WHITE);
    }

    #[tokio::test]
    async fn test_compose_without_logo_matches_base_surface() {
        let qr = black_qr(120);
        let composite = Compositor::default().compose(&qr, PADDING, None).await.unwrap();
        assert_eq!(composite, Compositor::base_surface(&qr, PADDING));
    }

    #[tokio::test]
    async fn test_compose_reports_decode_failure() {
        let qr = black_qr(120);
        let logo = asset(LogoShape::Square, true, 20);
        let err = Compositor::default()
            .compose(&qr, PADDING, Some(&logo))
            .await
            .unwrap_err();
        assert!(matches!(err, RenderError::LogoDecode(_)));
    }
}
