//! Logo image loading.
//!
//! Supports decoding uploaded logo bytes and `data:` URIs, synchronously or
//! through the asynchronous [`LogoDecoder`] seam the compositor waits on.

use async_trait::async_trait;
use base64::Engine;
use image::RgbaImage;
use qr_core::LogoImage;

use crate::error::{RenderError, RenderResult};

/// Decode encoded image bytes into RGBA pixels.
///
/// # Errors
///
/// Returns [`RenderError::LogoDecode`] if the bytes are not a decodable image.
pub fn decode_logo_bytes(data: &[u8]) -> RenderResult<RgbaImage> {
    let img = image::load_from_memory(data)
        .map_err(|e| RenderError::LogoDecode(format!("Failed to decode image: {e}")))?;

    let rgba = img.to_rgba8();
    if rgba.width() == 0 || rgba.height() == 0 {
        return Err(RenderError::LogoDecode("Image has no pixels".to_string()));
    }
    Ok(rgba)
}

/// Turns an uploaded logo into drawable pixels.
///
/// Decoding may complete at any later time; implementations must not block
/// the caller's executor thread.
#[async_trait]
pub trait LogoDecoder: Send + Sync {
    /// Decode the logo.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::LogoDecode`] if the image cannot be decoded.
    async fn decode(&self, logo: &LogoImage) -> RenderResult<RgbaImage>;
}

/// [`LogoDecoder`] using the `image` crate on tokio's blocking pool.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageLogoDecoder;

#[async_trait]
impl LogoDecoder for ImageLogoDecoder {
    async fn decode(&self, logo: &LogoImage) -> RenderResult<RgbaImage> {
        let logo = logo.clone();
        tokio::task::spawn_blocking(move || decode_logo_bytes(logo.bytes()))
            .await
            .map_err(|e| RenderError::LogoDecode(format!("Decode task failed: {e}")))?
    }
}

/// Extract the payload of a `data:` URI.
///
/// Supports formats like: `data:image/png;base64,iVBORw0KGgo...` as well as
/// percent-encoded payloads.
///
/// # Errors
///
/// Returns [`RenderError::Resource`] if the URI is malformed.
pub fn decode_data_uri(uri: &str) -> RenderResult<Vec<u8>> {
    let uri_data = uri
        .strip_prefix("data:")
        .ok_or_else(|| RenderError::Resource("Not a data URI".to_string()))?;

    // Find the comma separating metadata from data
    let comma_pos = uri_data
        .find(',')
        .ok_or_else(|| RenderError::Resource("Invalid data URI: missing comma".to_string()))?;

    let metadata = &uri_data[..comma_pos];
    let encoded_data = &uri_data[comma_pos + 1..];

    if metadata.contains(";base64") {
        base64::engine::general_purpose::STANDARD
            .decode(encoded_data.trim())
            .map_err(|e| RenderError::Resource(format!("Failed to decode base64: {e}")))
    } else {
        percent_decode(encoded_data)
    }
}

/// Build a base64 `data:` URI, the form a browser preview would display.
#[must_use]
pub fn encode_data_uri(mime: &str, data: &[u8]) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(data);
    format!("data:{mime};base64,{encoded}")
}

/// Simple URL decoding (percent-encoding).
fn percent_decode(input: &str) -> RenderResult<Vec<u8>> {
    let bytes = input.as_bytes();
    let mut result = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'%' {
            let decoded = bytes
                .get(i + 1..i + 3)
                .and_then(|hex| std::str::from_utf8(hex).ok())
                .and_then(|hex| u8::from_str_radix(hex, 16).ok())
                .ok_or_else(|| RenderError::Resource("Invalid URL encoding".to_string()))?;
            result.push(decoded);
            i += 3;
        } else {
            result.push(bytes[i]);
            i += 1;
        }
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Minimal valid PNG (1x1 red pixel)
    const PNG_BASE64: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mP8z8DwHwAFBQIAX8jx0gAAAABJRU5ErkJggg==";

    #[test]
    fn test_data_uri_parsing() {
        let data_uri = format!("data:image/png;base64,{PNG_BASE64}");
        let bytes = decode_data_uri(&data_uri).expect("valid data URI");
        let rgba = decode_logo_bytes(&bytes).expect("decodable PNG");
        assert_eq!(rgba.dimensions(), (1, 1));
    }

    #[test]
    fn test_invalid_data_uri() {
        assert!(decode_data_uri("not a data uri").is_err());
        assert!(decode_data_uri("data:image/png").is_err()); // Missing comma
        assert!(decode_data_uri("data:image/png;base64,@@@").is_err());
    }

    #[test]
    fn test_percent_encoded_data_uri() {
        let bytes = decode_data_uri("data:text/plain,a%20b%2Cc").expect("valid");
        assert_eq!(bytes, b"a b,c");
        assert!(decode_data_uri("data:text/plain,bad%2").is_err());
    }

    #[test]
    fn test_data_uri_roundtrip() {
        let bytes = decode_data_uri(&format!("data:image/png;base64,{PNG_BASE64}")).unwrap();
        let uri = encode_data_uri("image/png", &bytes);
        assert!(uri.starts_with("data:image/png;base64,"));
        assert_eq!(decode_data_uri(&uri).unwrap(), bytes);
    }

    #[test]
    fn test_garbage_bytes_fail_to_decode() {
        let err = decode_logo_bytes(b"definitely not an image").unwrap_err();
        assert!(matches!(err, RenderError::LogoDecode(_)));
    }

    #[tokio::test]
    async fn test_async_decoder_decodes_on_blocking_pool() {
        let bytes = decode_data_uri(&format!("data:image/png;base64,{PNG_BASE64}")).unwrap();
        let logo = LogoImage::new(bytes).unwrap();
        let rgba = ImageLogoDecoder.decode(&logo).await.expect("decode");
        assert_eq!(rgba.dimensions(), (1, 1));
    }

    #[tokio::test]
    async fn test_async_decoder_reports_failure() {
        let logo = LogoImage::new(b"garbage".to_vec()).unwrap();
        let err = ImageLogoDecoder.decode(&logo).await.unwrap_err();
        assert!(err.is_logo_failure());
    }
}
