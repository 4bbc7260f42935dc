//! # QR Studio
//!
//! Preview and export controllers for the QR Studio generator, plus the
//! configuration for the `qr-studio` command-line host.
//!
//! ## Usage
//!
//! ```bash
//! qr-studio generate --text https://example.com --logo logo.png --shape rounded
//! qr-studio shell
//! ```
//!
//! ## Architecture
//!
//! - `CliArgs` - Command-line arguments parsed with clap
//! - `StudioConfig` - Output directory and logo decode timeout
//! - `PreviewController` - Owns the `StudioState` and keeps the preview current
//! - `ExportController` - Re-derives the composite from a read-only state view and encodes PNG
//! - `Shell` - Line-oriented front end driving both controllers

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

mod error;
mod export;
mod generate;
mod preview;
mod shell;

pub use error::{StudioError, StudioResult};
pub use export::{ExportArtifact, ExportController};
pub use generate::generate;
pub use preview::{PendingPreview, PreviewController, PreviewOutcome, PreviewState};
pub use shell::{load_logo_source, Shell, ShellCommand, ShellReply};

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use qr_core::{LogoShape, DEFAULT_QR_SIZE};
use qr_renderer::{Compositor, CompositorConfig};

/// Default logo decode timeout in milliseconds.
pub const DEFAULT_DECODE_TIMEOUT_MS: u64 = 5_000;

/// Command-line arguments for qr-studio.
#[derive(Debug, Clone, Parser)]
#[command(name = "qr-studio")]
#[command(about = "Generate QR codes with an optional centred logo")]
#[command(version)]
pub struct CliArgs {
    /// Directory that exported PNGs are written to
    #[arg(long, env = "QR_STUDIO_OUT_DIR", default_value = ".", global = true)]
    pub out_dir: PathBuf,

    /// How long to wait for a logo to decode before falling back to the plain QR
    #[arg(
        long,
        env = "QR_STUDIO_DECODE_TIMEOUT_MS",
        default_value_t = DEFAULT_DECODE_TIMEOUT_MS,
        global = true
    )]
    pub decode_timeout_ms: u64,

    /// What to do
    #[command(subcommand)]
    pub command: Command,
}

/// qr-studio subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Render one QR code and write it as `qr-code-<ms>.png`
    Generate(GenerateArgs),
    /// Interactive session reading commands from stdin
    Shell,
}

/// Arguments for `qr-studio generate`.
#[derive(Debug, Clone, Args)]
pub struct GenerateArgs {
    /// Text or URL to encode
    #[arg(long)]
    pub text: String,

    /// QR side length in pixels (100-400)
    #[arg(long, default_value_t = DEFAULT_QR_SIZE)]
    pub size: u32,

    /// Logo image file, or a `data:` URI
    #[arg(long)]
    pub logo: Option<String>,

    /// Logo shape: square or rounded
    #[arg(long, default_value = "square")]
    pub shape: LogoShape,

    /// Draw the logo without its white border
    #[arg(long)]
    pub no_border: bool,

    /// Logo side as a percentage of the QR side (10-50)
    #[arg(long, default_value_t = 20)]
    pub scale_percent: u8,
}

/// Studio configuration.
#[derive(Debug, Clone)]
pub struct StudioConfig {
    /// Directory that exported PNGs are written to.
    pub out_dir: PathBuf,
    /// Upper bound on a single logo decode.
    pub decode_timeout: Duration,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl StudioConfig {
    /// Create a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            out_dir: PathBuf::from("."),
            decode_timeout: Duration::from_millis(DEFAULT_DECODE_TIMEOUT_MS),
        }
    }

    /// A compositor honouring the configured decode timeout.
    #[must_use]
    pub fn compositor(&self) -> Compositor {
        Compositor::new(CompositorConfig {
            decode_timeout: self.decode_timeout,
        })
    }
}

impl From<CliArgs> for StudioConfig {
    fn from(args: CliArgs) -> Self {
        Self {
            out_dir: args.out_dir,
            decode_timeout: Duration::from_millis(args.decode_timeout_ms),
        }
    }
}
