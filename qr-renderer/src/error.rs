//! Renderer error types.

use std::time::Duration;

use thiserror::Error;

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Errors that can occur while rendering, compositing or encoding.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The QR symbol could not be encoded (usually: text too long).
    #[error("QR symbol generation failed: {0}")]
    Symbol(String),

    /// The logo image could not be decoded.
    #[error("Failed to decode logo: {0}")]
    LogoDecode(String),

    /// The logo decode did not complete within the configured timeout.
    #[error("Logo decode timed out after {0:?}")]
    DecodeTimeout(Duration),

    /// A raster surface had unusable dimensions.
    #[error("Surface error: {0}")]
    Surface(String),

    /// Malformed data URI or other resource input.
    #[error("Failed to load resource: {0}")]
    Resource(String),

    /// Encoding the composite failed.
    #[error("Export failed: {0}")]
    Export(String),
}

impl RenderError {
    /// Whether this error came from the logo decode step.
    ///
    /// These are recoverable: the composite can still be produced without the
    /// logo.
    #[must_use]
    pub const fn is_logo_failure(&self) -> bool {
        matches!(self, Self::LogoDecode(_) | Self::DecodeTimeout(_))
    }
}
