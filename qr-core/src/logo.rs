//! Logo settings and uploaded logo images.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// Upload size the UI advertises ("PNG, JPG up to 2MB"). Advisory only.
pub const ADVISORY_MAX_LOGO_BYTES: usize = 2 * 1024 * 1024;

/// Shape the logo is drawn in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogoShape {
    /// Logo drawn as-is inside its square.
    #[default]
    Square,
    /// Logo clipped to the circle inscribed in its square.
    Rounded,
}

impl LogoShape {
    /// Lowercase name used on the command line and in JSON.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Square => "square",
            Self::Rounded => "rounded",
        }
    }
}

impl fmt::Display for LogoShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogoShape {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "square" => Ok(Self::Square),
            "rounded" | "round" | "circle" => Ok(Self::Rounded),
            other => Err(CoreError::InvalidShape(other.to_string())),
        }
    }
}

/// Logo side length as a fraction of the QR bitmap's side length.
///
/// Always within [`LogoScale::MIN`]..=[`LogoScale::MAX`].
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f32", into = "f32")]
pub struct LogoScale(f32);

impl LogoScale {
    /// Smallest logo scale (10%).
    pub const MIN: f32 = 0.10;
    /// Largest logo scale (50%).
    pub const MAX: f32 = 0.50;
    /// Scale used before the user touches the slider.
    pub const DEFAULT: Self = Self(0.20);

    /// Create a scale from a fraction.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidScale`] if `value` is not finite or lies
    /// outside `0.10..=0.50`.
    pub fn new(value: f32) -> CoreResult<Self> {
        if value.is_finite() && (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(CoreError::InvalidScale(value))
        }
    }

    /// Create a scale from a whole percentage, the slider's unit.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidScale`] unless `percent` is in `10..=50`.
    pub fn from_percent(percent: u8) -> CoreResult<Self> {
        Self::new(f32::from(percent) / 100.0)
    }

    /// The scale as a fraction.
    #[must_use]
    pub const fn value(self) -> f32 {
        self.0
    }

    /// The scale as a rounded percentage, for display.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn percent(self) -> u32 {
        (self.0 * 100.0).round() as u32
    }
}

impl Default for LogoScale {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<f32> for LogoScale {
    type Error = CoreError;

    fn try_from(value: f32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<LogoScale> for f32 {
    fn from(scale: LogoScale) -> Self {
        scale.0
    }
}

/// Encoded image formats recognised by magic bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogoFormat {
    /// PNG with alpha support.
    Png,
    /// JPEG (no alpha).
    Jpeg,
    /// WebP.
    WebP,
    /// GIF (first frame is used).
    Gif,
    /// Anything else; decoding may still succeed.
    Unknown,
}

impl LogoFormat {
    /// Detect format from magic bytes.
    #[must_use]
    pub fn from_magic_bytes(data: &[u8]) -> Self {
        if data.len() < 4 {
            return Self::Unknown;
        }

        // PNG: 89 50 4E 47
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
            return Self::Png;
        }

        // JPEG: FF D8 FF
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Self::Jpeg;
        }

        // WebP: RIFF....WEBP
        if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
            return Self::WebP;
        }

        if data.starts_with(b"GIF8") {
            return Self::Gif;
        }

        Self::Unknown
    }
}

/// Encoded bytes of an uploaded logo.
///
/// Cloning is cheap; the bytes are shared.
#[derive(Clone, PartialEq, Eq)]
pub struct LogoImage {
    bytes: Arc<[u8]>,
    format: LogoFormat,
}

impl LogoImage {
    /// Wrap uploaded bytes.
    ///
    /// The format and size are only checked for advisories, which are
    /// logged; nothing beyond emptiness is rejected.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::EmptyLogo`] if `bytes` is empty.
    pub fn new(bytes: impl Into<Arc<[u8]>>) -> CoreResult<Self> {
        let bytes: Arc<[u8]> = bytes.into();
        if bytes.is_empty() {
            return Err(CoreError::EmptyLogo);
        }

        let format = LogoFormat::from_magic_bytes(&bytes);
        let image = Self { bytes, format };
        if format == LogoFormat::Unknown {
            tracing::warn!("Logo upload has an unrecognised format; decoding may fail");
        }
        if image.exceeds_advisory_limit() {
            tracing::warn!(
                "Logo upload is {} bytes, above the advertised {} byte limit",
                image.len(),
                ADVISORY_MAX_LOGO_BYTES
            );
        }

        Ok(image)
    }

    /// The encoded image bytes.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Format sniffed from the magic bytes.
    #[must_use]
    pub const fn format(&self) -> LogoFormat {
        self.format
    }

    /// Size of the encoded image in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Always false; empty uploads are rejected by [`LogoImage::new`].
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Whether the upload is larger than the advertised limit.
    #[must_use]
    pub fn exceeds_advisory_limit(&self) -> bool {
        self.bytes.len() > ADVISORY_MAX_LOGO_BYTES
    }
}

impl fmt::Debug for LogoImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogoImage")
            .field("format", &self.format)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Everything the compositor needs to overlay a logo.
#[derive(Debug, Clone, PartialEq)]
pub struct LogoAsset {
    /// Encoded logo image.
    pub image: LogoImage,
    /// Drawing shape.
    pub shape: LogoShape,
    /// Whether a white border is drawn beneath the logo.
    pub border: bool,
    /// Logo side as a fraction of the QR side.
    pub scale: LogoScale,
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_MAGIC: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

    #[test]
    fn test_shape_parse_and_display() {
        assert_eq!("square".parse::<LogoShape>().unwrap(), LogoShape::Square);
        assert_eq!("Rounded".parse::<LogoShape>().unwrap(), LogoShape::Rounded);
        assert_eq!("circle".parse::<LogoShape>().unwrap(), LogoShape::Rounded);
        assert!("hexagon".parse::<LogoShape>().is_err());
        assert_eq!(LogoShape::Rounded.to_string(), "rounded");
    }

    #[test]
    fn test_shape_serde() {
        let json = serde_json::to_string(&LogoShape::Rounded).unwrap();
        assert_eq!(json, "\"rounded\"");
    }

    #[test]
    fn test_scale_bounds() {
        assert!(LogoScale::new(0.10).is_ok());
        assert!(LogoScale::new(0.50).is_ok());
        assert!(LogoScale::new(0.09).is_err());
        assert!(LogoScale::new(0.51).is_err());
        assert!(LogoScale::new(f32::NAN).is_err());
    }

    #[test]
    fn test_scale_from_percent() {
        assert_eq!(LogoScale::from_percent(10).unwrap().value(), 0.10);
        assert_eq!(LogoScale::from_percent(50).unwrap().value(), 0.50);
        assert_eq!(LogoScale::from_percent(35).unwrap().percent(), 35);
        assert!(LogoScale::from_percent(9).is_err());
        assert!(LogoScale::from_percent(51).is_err());
    }

    #[test]
    fn test_scale_serde_rejects_out_of_range() {
        let scale: LogoScale = serde_json::from_str("0.25").unwrap();
        assert_eq!(scale.percent(), 25);
        assert!(serde_json::from_str::<LogoScale>("0.9").is_err());
    }

    #[test]
    fn test_format_detection_from_magic_bytes() {
        assert_eq!(LogoFormat::from_magic_bytes(&PNG_MAGIC), LogoFormat::Png);
        assert_eq!(
            LogoFormat::from_magic_bytes(&[0xFF, 0xD8, 0xFF, 0xE0]),
            LogoFormat::Jpeg
        );
        assert_eq!(
            LogoFormat::from_magic_bytes(b"RIFF\x00\x00\x00\x00WEBP"),
            LogoFormat::WebP
        );
        assert_eq!(LogoFormat::from_magic_bytes(b"GIF89a"), LogoFormat::Gif);
        assert_eq!(LogoFormat::from_magic_bytes(b"abc"), LogoFormat::Unknown);
    }

    #[test]
    fn test_logo_image_rejects_empty() {
        assert!(matches!(LogoImage::new(Vec::new()), Err(CoreError::EmptyLogo)));
    }

    #[test]
    fn test_logo_image_oversize_is_advisory_only() {
        let mut bytes = PNG_MAGIC.to_vec();
        bytes.resize(ADVISORY_MAX_LOGO_BYTES + 1, 0);
        let image = LogoImage::new(bytes).expect("oversize uploads are accepted");
        assert!(image.exceeds_advisory_limit());
        assert_eq!(image.format(), LogoFormat::Png);
    }

    #[test]
    fn test_logo_image_at_advisory_limit_is_within_it() {
        let mut bytes = PNG_MAGIC.to_vec();
        bytes.resize(ADVISORY_MAX_LOGO_BYTES, 0);
        let image = LogoImage::new(bytes).unwrap();
        assert!(!image.exceeds_advisory_limit());
        assert_eq!(image.len(), ADVISORY_MAX_LOGO_BYTES);
    }
}
