//! Error types for the preview/export controllers and the shell.

use thiserror::Error;

use qr_core::CoreError;
use qr_renderer::RenderError;

/// Result type for studio operations.
pub type StudioResult<T> = Result<T, StudioError>;

/// Errors surfaced by the controllers and the command-line host.
#[derive(Debug, Error)]
pub enum StudioError {
    /// An event carried an invalid value.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Rendering, decoding or encoding failed.
    #[error(transparent)]
    Render(#[from] RenderError),

    /// Export requested while the text is empty; no QR exists yet.
    #[error("Nothing to export: enter some text first")]
    NothingToExport,

    /// Export requested while another export is still running.
    #[error("An export is already in progress")]
    ExportBusy,

    /// Shell input that is not a known command.
    #[error("Invalid command: {0}")]
    InvalidCommand(String),

    /// Reading a logo or writing an export failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
