//! # QR Studio Renderer
//!
//! Raster pipeline for QR Studio: symbol rendering, logo decoding,
//! compositing and PNG export.
//!
//! ## Pipeline
//!
//! ```text
//! ┌────────────────┐   ┌──────────────┐   ┌───────────────┐
//! │ SymbolRenderer │──▶│  Compositor  │──▶│  encode_png   │
//! │  (qrcode, H)   │   │  pad + logo  │   │ qr-code-*.png │
//! └────────────────┘   └──────▲───────┘   └───────────────┘
//!                             │ async
//!                      ┌──────┴───────┐
//!                      │ LogoDecoder  │
//!                      └──────────────┘
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod compositor;
pub mod error;
pub mod export;
pub mod logo;
pub mod surface;
pub mod symbol;

pub use compositor::{Compositor, CompositorConfig, LogoPlacement, BORDER_THICKNESS, PADDING};
pub use error::{RenderError, RenderResult};
pub use export::{current_timestamp_ms, encode_png, encode_png_data_uri, export_file_name};
pub use logo::{decode_data_uri, decode_logo_bytes, encode_data_uri, ImageLogoDecoder, LogoDecoder};
pub use surface::{CompositeImage, QrBitmap};
pub use symbol::{ErrorCorrection, QrCodeRenderer, SymbolRenderer, SymbolStyle};
