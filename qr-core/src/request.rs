//! QR generation requests.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// Smallest QR side length in pixels.
pub const MIN_QR_SIZE: u32 = 100;

/// Largest QR side length in pixels.
pub const MAX_QR_SIZE: u32 = 400;

/// Side length used before the user touches the size slider.
pub const DEFAULT_QR_SIZE: u32 = 200;

/// Check that a QR side length is within the supported range.
///
/// # Errors
///
/// Returns [`CoreError::InvalidSize`] if `size` is outside
/// [`MIN_QR_SIZE`]..=[`MAX_QR_SIZE`].
pub fn validate_size(size: u32) -> CoreResult<u32> {
    if (MIN_QR_SIZE..=MAX_QR_SIZE).contains(&size) {
        Ok(size)
    } else {
        Err(CoreError::InvalidSize {
            size,
            min: MIN_QR_SIZE,
            max: MAX_QR_SIZE,
        })
    }
}

/// A validated request to render a QR symbol.
///
/// The text is never blank and the size is always in range, so holding one
/// of these is proof that a composite may be produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    text: String,
    size: u32,
}

impl GenerationRequest {
    /// Build a request from user input.
    ///
    /// The text is encoded verbatim; it only has to contain something other
    /// than whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::EmptyText`] for blank text and
    /// [`CoreError::InvalidSize`] for an out-of-range size.
    pub fn new(text: impl Into<String>, size: u32) -> CoreResult<Self> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(CoreError::EmptyText);
        }
        let size = validate_size(size)?;
        Ok(Self { text, size })
    }

    /// Text to encode.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// QR side length in pixels.
    #[must_use]
    pub const fn size(&self) -> u32 {
        self.size
    }
}
