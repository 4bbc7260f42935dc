//! Export controller.
//!
//! Re-derives the composite from the current state rather than trusting the
//! preview, which may still be waiting on a logo decode.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use qr_core::StudioState;
use qr_renderer::{
    current_timestamp_ms, encode_png, export_file_name, Compositor, QrCodeRenderer,
    SymbolRenderer, PADDING,
};

use crate::error::{StudioError, StudioResult};

/// An encoded PNG ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    /// `qr-code-<unix-ms>.png`
    pub file_name: String,
    /// PNG bytes.
    pub png: Vec<u8>,
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Why the logo was left out, if it was.
    pub logo_fallback: Option<String>,
}

impl ExportArtifact {
    /// Write the PNG into `dir`, creating the directory if needed.
    ///
    /// An existing file with the same name is overwritten.
    ///
    /// # Errors
    ///
    /// Returns [`StudioError::Io`] if the directory or file cannot be written.
    pub async fn save_to(&self, dir: impl AsRef<Path>) -> StudioResult<PathBuf> {
        let dir = dir.as_ref();
        tokio::fs::create_dir_all(dir).await?;
        let path = dir.join(&self.file_name);
        tokio::fs::write(&path, &self.png).await?;
        tracing::info!(path = %path.display(), bytes = self.png.len(), "Export saved");
        Ok(path)
    }
}

/// Releases the busy flag when dropped.
struct BusyGuard {
    flag: Arc<AtomicBool>,
}

impl BusyGuard {
    fn acquire(flag: &Arc<AtomicBool>) -> StudioResult<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| StudioError::ExportBusy)?;
        Ok(Self {
            flag: Arc::clone(flag),
        })
    }
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Produces PNG exports from a read-only view of the studio state.
///
/// Clones share the busy flag, so only one export runs at a time across all
/// of them.
#[derive(Clone)]
pub struct ExportController {
    renderer: Arc<dyn SymbolRenderer>,
    compositor: Compositor,
    busy: Arc<AtomicBool>,
}

impl std::fmt::Debug for ExportController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExportController")
            .field("compositor", &self.compositor)
            .field("busy", &self.is_busy())
            .finish_non_exhaustive()
    }
}

impl ExportController {
    /// Create a controller with the default QR renderer.
    #[must_use]
    pub fn new(compositor: Compositor) -> Self {
        Self::with_renderer(Arc::new(QrCodeRenderer::new()), compositor)
    }

    /// Create a controller with a custom QR renderer.
    #[must_use]
    pub fn with_renderer(renderer: Arc<dyn SymbolRenderer>, compositor: Compositor) -> Self {
        Self {
            renderer,
            compositor,
            busy: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Whether an export is running.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Compose and encode the current state as a PNG.
    ///
    /// A logo that fails to decode or times out is left out and the reason
    /// is recorded in [`ExportArtifact::logo_fallback`]. The busy flag is
    /// released on every exit path.
    ///
    /// # Errors
    ///
    /// - [`StudioError::ExportBusy`] if another export is running
    /// - [`StudioError::NothingToExport`] if the text is empty
    /// - [`StudioError::Render`] if the QR cannot be encoded or PNG encoding fails
    pub async fn export(&self, state: &StudioState) -> StudioResult<ExportArtifact> {
        let _busy = BusyGuard::acquire(&self.busy)?;

        let request = state.request().ok_or(StudioError::NothingToExport)?;
        let qr = self.renderer.render_request(&request)?;

        let (composite, logo_fallback) = match state.logo_asset() {
            None => (Compositor::base_surface(&qr, PADDING), None),
            Some(logo) => match self.compositor.compose(&qr, PADDING, Some(&logo)).await {
                Ok(composite) => (composite, None),
                Err(e) if e.is_logo_failure() => {
                    tracing::warn!(error = %e, "Exporting without logo");
                    (Compositor::base_surface(&qr, PADDING), Some(e.to_string()))
                }
                Err(e) => return Err(e.into()),
            },
        };

        let png = encode_png(&composite)?;
        let file_name = export_file_name(current_timestamp_ms());
        tracing::info!(
            file = %file_name,
            width = composite.width(),
            height = composite.height(),
            bytes = png.len(),
            "Export encoded"
        );

        Ok(ExportArtifact {
            file_name,
            png,
            width: composite.width(),
            height: composite.height(),
            logo_fallback,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qr_core::StudioEvent;

    fn state_with_text(text: &str) -> StudioState {
        let mut state = StudioState::new();
        state.apply(&StudioEvent::TextChanged(text.into())).unwrap();
        state
    }

    #[test]
    fn test_busy_guard_is_exclusive() {
        let flag = Arc::new(AtomicBool::new(false));
        let guard = BusyGuard::acquire(&flag).unwrap();
        assert!(matches!(
            BusyGuard::acquire(&flag),
            Err(StudioError::ExportBusy)
        ));
        drop(guard);
        assert!(!flag.load(Ordering::Acquire));
        assert!(BusyGuard::acquire(&flag).is_ok());
    }

    #[tokio::test]
    async fn test_empty_text_is_nothing_to_export() {
        let controller = ExportController::new(Compositor::default());
        let err = controller.export(&StudioState::new()).await.unwrap_err();
        assert!(matches!(err, StudioError::NothingToExport));
        assert!(!controller.is_busy());
    }

    #[tokio::test]
    async fn test_export_without_logo() {
        let controller = ExportController::new(Compositor::default());
        let artifact = controller
            .export(&state_with_text("https://example.com"))
            .await
            .unwrap();
        assert_eq!((artifact.width, artifact.height), (240, 240));
        assert!(artifact.file_name.starts_with("qr-code-"));
        assert!(artifact.file_name.ends_with(".png"));
        assert_eq!(&artifact.png[..4], &[0x89, b'P', b'N', b'G']);
        assert!(artifact.logo_fallback.is_none());
        assert!(!controller.is_busy());
    }

    #[tokio::test]
    async fn test_broken_logo_is_recorded_as_fallback() {
        let mut state = state_with_text("hello");
        state
            .apply(&StudioEvent::LogoUploaded {
                bytes: b"garbage".to_vec(),
            })
            .unwrap();

        let artifact = ExportController::new(Compositor::default())
            .export(&state)
            .await
            .unwrap();
        assert!(artifact
            .logo_fallback
            .as_deref()
            .is_some_and(|reason| reason.contains("decode")));
    }
}
