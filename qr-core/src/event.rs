//! State-changing actions exposed by the presentation shell.

use serde::{Deserialize, Serialize};

use crate::logo::{LogoScale, LogoShape};

/// Every action that can change what the preview shows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum StudioEvent {
    /// Text or URL field edited.
    TextChanged(String),

    /// Size slider moved (pixels).
    SizeChanged(u32),

    /// Logo file picked.
    LogoUploaded {
        /// Encoded image bytes, exactly as read from the file.
        bytes: Vec<u8>,
    },

    /// Remove-logo button pressed.
    LogoRemoved,

    /// Shape selector changed.
    ShapeChanged(LogoShape),

    /// Border checkbox toggled.
    BorderToggled(bool),

    /// Logo size slider moved.
    ScaleChanged(LogoScale),
}

impl StudioEvent {
    /// Whether this event only matters when a logo is present.
    ///
    /// Logo settings are still recorded without a logo, but they cannot
    /// change the rendered output.
    #[must_use]
    pub const fn is_logo_setting(&self) -> bool {
        matches!(
            self,
            Self::ShapeChanged(_) | Self::BorderToggled(_) | Self::ScaleChanged(_)
        )
    }

    /// Short name for logging.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::TextChanged(_) => "text_changed",
            Self::SizeChanged(_) => "size_changed",
            Self::LogoUploaded { .. } => "logo_uploaded",
            Self::LogoRemoved => "logo_removed",
            Self::ShapeChanged(_) => "shape_changed",
            Self::BorderToggled(_) => "border_toggled",
            Self::ScaleChanged(_) => "scale_changed",
        }
    }
}
