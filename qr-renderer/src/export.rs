//! Composite export to PNG.

use std::time::{SystemTime, UNIX_EPOCH};

use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder};

use crate::error::{RenderError, RenderResult};
use crate::logo::encode_data_uri;
use crate::surface::CompositeImage;

/// Prefix of every exported file name.
pub const EXPORT_FILE_PREFIX: &str = "qr-code-";

/// MIME type of exported images.
pub const PNG_MIME: &str = "image/png";

/// Milliseconds since the Unix epoch, or 0 if the clock is before it.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Deterministic download name: `qr-code-<unix-ms>.png`.
#[must_use]
pub fn export_file_name(timestamp_ms: u64) -> String {
    format!("{EXPORT_FILE_PREFIX}{timestamp_ms}.png")
}

/// Encode a composite as PNG bytes.
///
/// # Errors
///
/// Returns [`RenderError::Export`] if encoding fails.
pub fn encode_png(composite: &CompositeImage) -> RenderResult<Vec<u8>> {
    let image = composite.image();
    let mut buf = Vec::new();
    PngEncoder::new(&mut buf)
        .write_image(
            image.as_raw(),
            image.width(),
            image.height(),
            ExtendedColorType::Rgba8,
        )
        .map_err(|e| RenderError::Export(format!("PNG encoding failed: {e}")))?;
    Ok(buf)
}

/// Encode a composite as a PNG `data:` URI, as a browser preview shows it.
///
/// # Errors
///
/// Returns [`RenderError::Export`] if encoding fails.
pub fn encode_png_data_uri(composite: &CompositeImage) -> RenderResult<String> {
    Ok(encode_data_uri(PNG_MIME, &encode_png(composite)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_name_format() {
        assert_eq!(export_file_name(1_700_000_000_123), "qr-code-1700000000123.png");
    }

    #[test]
    fn test_timestamp_is_recent() {
        // 2020-01-01 in ms
        assert!(current_timestamp_ms() > 1_577_836_800_000);
    }

    #[test]
    fn test_png_export_produces_valid_bytes() {
        let png = encode_png(&CompositeImage::blank(40)).expect("png export");

        // PNG magic bytes: \x89PNG
        assert!(png.len() > 8);
        assert_eq!(&png[0..4], &[137, 80, 78, 71]);

        let decoded = image::load_from_memory(&png).expect("decode").to_rgba8();
        assert_eq!(decoded.dimensions(), (40, 40));
    }

    #[test]
    fn test_png_data_uri() {
        let uri = encode_png_data_uri(&CompositeImage::blank(2)).expect("data uri");
        assert!(uri.starts_with("data:image/png;base64,iVBORw0KGgo"));
    }
}
