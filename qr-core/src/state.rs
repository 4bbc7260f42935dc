//! Studio state management.

use serde::Serialize;

use crate::error::CoreResult;
use crate::event::StudioEvent;
use crate::logo::{LogoAsset, LogoFormat, LogoImage, LogoScale, LogoShape};
use crate::request::{validate_size, GenerationRequest, DEFAULT_QR_SIZE};

/// The six pieces of user-editable state.
///
/// Only [`StudioState::apply`] mutates it; everything else reads through
/// accessors, so a failed event leaves the state exactly as it was.
#[derive(Debug, Clone, PartialEq)]
pub struct StudioState {
    text: String,
    size: u32,
    logo: Option<LogoImage>,
    shape: LogoShape,
    border: bool,
    scale: LogoScale,
}

impl StudioState {
    /// Create state with the UI's initial values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            text: String::new(),
            size: DEFAULT_QR_SIZE,
            logo: None,
            shape: LogoShape::Square,
            border: true,
            scale: LogoScale::DEFAULT,
        }
    }

    /// Apply an event.
    ///
    /// # Errors
    ///
    /// Returns an error if the event carries an invalid value (size out of
    /// range, empty logo). The state is unchanged in that case.
    pub fn apply(&mut self, event: &StudioEvent) -> CoreResult<()> {
        match event {
            StudioEvent::TextChanged(text) => self.text.clone_from(text),
            StudioEvent::SizeChanged(size) => self.size = validate_size(*size)?,
            StudioEvent::LogoUploaded { bytes } => {
                self.logo = Some(LogoImage::new(bytes.as_slice())?);
            }
            StudioEvent::LogoRemoved => self.logo = None,
            StudioEvent::ShapeChanged(shape) => self.shape = *shape,
            StudioEvent::BorderToggled(border) => self.border = *border,
            StudioEvent::ScaleChanged(scale) => self.scale = *scale,
        }
        tracing::debug!(event = event.name(), "Studio state updated");
        Ok(())
    }

    /// Current text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Current QR side length in pixels.
    #[must_use]
    pub const fn size(&self) -> u32 {
        self.size
    }

    /// Uploaded logo, if any.
    #[must_use]
    pub const fn logo(&self) -> Option<&LogoImage> {
        self.logo.as_ref()
    }

    /// Whether a logo is uploaded.
    #[must_use]
    pub const fn has_logo(&self) -> bool {
        self.logo.is_some()
    }

    /// Selected logo shape.
    #[must_use]
    pub const fn shape(&self) -> LogoShape {
        self.shape
    }

    /// Whether the logo border is enabled.
    #[must_use]
    pub const fn border(&self) -> bool {
        self.border
    }

    /// Selected logo scale.
    #[must_use]
    pub const fn scale(&self) -> LogoScale {
        self.scale
    }

    /// The generation request for the current input.
    ///
    /// `None` while the text is blank: nothing is rendered in that state.
    #[must_use]
    pub fn request(&self) -> Option<GenerationRequest> {
        GenerationRequest::new(self.text.as_str(), self.size).ok()
    }

    /// The logo together with its current settings, if a logo is uploaded.
    #[must_use]
    pub fn logo_asset(&self) -> Option<LogoAsset> {
        self.logo.as_ref().map(|image| LogoAsset {
            image: image.clone(),
            shape: self.shape,
            border: self.border,
            scale: self.scale,
        })
    }

    /// A serializable snapshot for status displays.
    #[must_use]
    pub fn summary(&self) -> StudioSummary {
        StudioSummary {
            text: self.text.clone(),
            size: self.size,
            logo_bytes: self.logo.as_ref().map(LogoImage::len),
            logo_format: self.logo.as_ref().map(LogoImage::format),
            shape: self.shape,
            border: self.border,
            scale_percent: self.scale.percent(),
        }
    }
}

impl Default for StudioState {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of [`StudioState`] without the logo bytes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudioSummary {
    /// Current text.
    pub text: String,
    /// QR side length in pixels.
    pub size: u32,
    /// Size of the uploaded logo, if any.
    pub logo_bytes: Option<usize>,
    /// Sniffed format of the uploaded logo, if any.
    pub logo_format: Option<LogoFormat>,
    /// Selected logo shape.
    pub shape: LogoShape,
    /// Whether the logo border is enabled.
    pub border: bool,
    /// Logo scale as a percentage.
    pub scale_percent: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;

    fn logo_event() -> StudioEvent {
        StudioEvent::LogoUploaded {
            bytes: vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A],
        }
    }

    #[test]
    fn test_initial_state_matches_ui_defaults() {
        let state = StudioState::new();
        assert_eq!(state.text(), "");
        assert_eq!(state.size(), 200);
        assert!(!state.has_logo());
        assert_eq!(state.shape(), LogoShape::Square);
        assert!(state.border());
        assert_eq!(state.scale().percent(), 20);
        assert!(state.request().is_none());
    }

    #[test]
    fn test_request_requires_non_blank_text() {
        let mut state = StudioState::new();
        state.apply(&StudioEvent::TextChanged("   ".into())).unwrap();
        assert!(state.request().is_none());

        state
            .apply(&StudioEvent::TextChanged("https://example.com".into()))
            .unwrap();
        let request = state.request().expect("request");
        assert_eq!(request.text(), "https://example.com");
        assert_eq!(request.size(), 200);
    }

    #[test]
    fn test_invalid_size_leaves_state_untouched() {
        let mut state = StudioState::new();
        state.apply(&StudioEvent::SizeChanged(300)).unwrap();
        let err = state.apply(&StudioEvent::SizeChanged(401)).unwrap_err();
        assert!(matches!(err, CoreError::InvalidSize { size: 401, .. }));
        assert_eq!(state.size(), 300);
    }

    #[test]
    fn test_logo_asset_carries_current_settings() {
        let mut state = StudioState::new();
        assert!(state.logo_asset().is_none());

        state.apply(&logo_event()).unwrap();
        state
            .apply(&StudioEvent::ShapeChanged(LogoShape::Rounded))
            .unwrap();
        state.apply(&StudioEvent::BorderToggled(false)).unwrap();
        state
            .apply(&StudioEvent::ScaleChanged(LogoScale::from_percent(40).unwrap()))
            .unwrap();

        let asset = state.logo_asset().expect("logo asset");
        assert_eq!(asset.shape, LogoShape::Rounded);
        assert!(!asset.border);
        assert_eq!(asset.scale.percent(), 40);
    }

    #[test]
    fn test_remove_then_readd_restores_identical_state() {
        let mut original = StudioState::new();
        original
            .apply(&StudioEvent::TextChanged("hello".into()))
            .unwrap();
        original.apply(&logo_event()).unwrap();

        let mut toggled = original.clone();
        toggled.apply(&StudioEvent::LogoRemoved).unwrap();
        assert!(toggled.logo_asset().is_none());
        toggled.apply(&logo_event()).unwrap();

        assert_eq!(toggled, original);
    }

    #[test]
    fn test_logo_settings_survive_without_logo() {
        let mut state = StudioState::new();
        state
            .apply(&StudioEvent::ShapeChanged(LogoShape::Rounded))
            .unwrap();
        state.apply(&logo_event()).unwrap();
        state.apply(&StudioEvent::LogoRemoved).unwrap();
        assert_eq!(state.shape(), LogoShape::Rounded);
    }

    #[test]
    fn test_summary_serializes_without_bytes() {
        let mut state = StudioState::new();
        state.apply(&logo_event()).unwrap();
        let json = serde_json::to_value(state.summary()).unwrap();
        assert_eq!(json["logo_bytes"], 8);
        assert_eq!(json["logo_format"], "png");
        assert_eq!(json["scale_percent"], 20);
    }
}
