//! # QR Studio Core
//!
//! The data model behind the QR Studio generator: what the user has typed,
//! which logo they uploaded and how it should be drawn.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                  qr-core                    │
//! ├─────────────────────────────────────────────┤
//! │  StudioEvent  ──apply──▶  StudioState       │
//! │  - text / size           - request()        │
//! │  - logo upload/remove    - logo_asset()     │
//! │  - shape/border/scale    - summary()        │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! Rendering lives in `qr-renderer`; this crate performs no I/O.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod event;
pub mod logo;
pub mod request;
pub mod state;

pub use error::{CoreError, CoreResult};
pub use event::StudioEvent;
pub use logo::{LogoAsset, LogoFormat, LogoImage, LogoScale, LogoShape};
pub use request::{GenerationRequest, DEFAULT_QR_SIZE, MAX_QR_SIZE, MIN_QR_SIZE};
pub use state::{StudioState, StudioSummary};

/// QR studio core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
