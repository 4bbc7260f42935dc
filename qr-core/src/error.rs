//! Error types for studio model operations.

use thiserror::Error;

/// Result type for core model operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur while validating or mutating studio state.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Text is empty or whitespace-only; nothing can be encoded.
    #[error("QR text is empty")]
    EmptyText,

    /// QR side length outside the supported range.
    #[error("QR size {size}px is outside {min}..={max}px")]
    InvalidSize {
        /// Requested size in pixels.
        size: u32,
        /// Smallest accepted size.
        min: u32,
        /// Largest accepted size.
        max: u32,
    },

    /// Logo scale outside the supported range (or not a finite number).
    #[error("Logo scale {0} is outside 0.10..=0.50")]
    InvalidScale(f32),

    /// Unrecognised logo shape name.
    #[error("Unknown logo shape: {0}")]
    InvalidShape(String),

    /// Logo upload carried no bytes.
    #[error("Logo image is empty")]
    EmptyLogo,

    /// Event serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
