//! Preview controller.
//!
//! Owns the [`StudioState`] and re-derives the preview after every event.
//! QR rendering happens inline; only the logo decode runs in the background.
//! Every recompute takes a new generation number, and a background result is
//! stored only if its generation is still the latest when it completes.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use qr_core::{StudioEvent, StudioState};
use qr_renderer::{CompositeImage, Compositor, QrCodeRenderer, SymbolRenderer, PADDING};
use tokio::task::JoinHandle;

use crate::error::StudioResult;

/// What the preview pane currently shows.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PreviewState {
    /// No text entered; nothing to show.
    #[default]
    Empty,
    /// A finished composite.
    Ready {
        /// The composite image.
        image: Arc<CompositeImage>,
        /// Generation that produced it.
        generation: u64,
        /// Whether the logo made it into the image.
        with_logo: bool,
    },
}

impl PreviewState {
    /// The composite, if one is shown.
    #[must_use]
    pub fn image(&self) -> Option<&CompositeImage> {
        match self {
            Self::Empty => None,
            Self::Ready { image, .. } => Some(image),
        }
    }

    /// Whether the preview is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

/// How a recompute ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewOutcome {
    /// Text is empty; the preview was cleared.
    Cleared,
    /// The new composite is on display.
    Applied,
    /// A newer recompute started first; this result was discarded.
    Superseded,
    /// The logo failed to decode or timed out; the QR-only composite is on display.
    Fallback,
}

enum Pending {
    Settled(PreviewOutcome),
    Running(JoinHandle<PreviewOutcome>),
}

/// Handle to a recompute started by [`PreviewController::apply`].
///
/// Dropping it does not cancel the work; the result is still stored if it is
/// current when it lands.
pub struct PendingPreview {
    generation: u64,
    inner: Pending,
}

impl std::fmt::Debug for PendingPreview {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingPreview")
            .field("generation", &self.generation)
            .field("settled", &self.is_settled())
            .finish()
    }
}

impl PendingPreview {
    const fn settled_with(generation: u64, outcome: PreviewOutcome) -> Self {
        Self {
            generation,
            inner: Pending::Settled(outcome),
        }
    }

    /// Generation number of this recompute.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether the outcome is already known.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        match &self.inner {
            Pending::Settled(_) => true,
            Pending::Running(handle) => handle.is_finished(),
        }
    }

    /// Wait for the recompute to finish.
    pub async fn settled(self) -> PreviewOutcome {
        match self.inner {
            Pending::Settled(outcome) => outcome,
            Pending::Running(handle) => handle.await.unwrap_or_else(|e| {
                tracing::error!(generation = self.generation, "Preview task failed: {}", e);
                PreviewOutcome::Superseded
            }),
        }
    }
}

/// Store `next` if `generation` is still the latest.
///
/// The check and the write happen under the same lock, so a stale result can
/// never overwrite a newer one.
fn store_if_current(
    slot: &RwLock<PreviewState>,
    latest: &AtomicU64,
    generation: u64,
    next: PreviewState,
) -> bool {
    let mut guard = slot.write().unwrap_or_else(|poisoned| {
        tracing::error!("Preview lock poisoned; recovering");
        poisoned.into_inner()
    });
    if latest.load(Ordering::SeqCst) != generation {
        return false;
    }
    *guard = next;
    true
}

/// Single owner of the studio state and the preview derived from it.
pub struct PreviewController {
    state: StudioState,
    preview: Arc<RwLock<PreviewState>>,
    generation: Arc<AtomicU64>,
    renderer: Arc<dyn SymbolRenderer>,
    compositor: Compositor,
}

impl std::fmt::Debug for PreviewController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreviewController")
            .field("state", &self.state)
            .field("generation", &self.generation())
            .field("compositor", &self.compositor)
            .finish_non_exhaustive()
    }
}

impl PreviewController {
    /// Create a controller with the default QR renderer.
    #[must_use]
    pub fn new(compositor: Compositor) -> Self {
        Self::with_renderer(Arc::new(QrCodeRenderer::new()), compositor)
    }

    /// Create a controller with a custom QR renderer.
    #[must_use]
    pub fn with_renderer(renderer: Arc<dyn SymbolRenderer>, compositor: Compositor) -> Self {
        Self {
            state: StudioState::new(),
            preview: Arc::new(RwLock::new(PreviewState::Empty)),
            generation: Arc::new(AtomicU64::new(0)),
            renderer,
            compositor,
        }
    }

    /// Read-only view of the current state.
    #[must_use]
    pub const fn state(&self) -> &StudioState {
        &self.state
    }

    /// Snapshot of the current preview.
    #[must_use]
    pub fn preview(&self) -> PreviewState {
        match self.preview.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => {
                tracing::error!("Preview lock poisoned; recovering");
                poisoned.into_inner().clone()
            }
        }
    }

    /// Latest generation number handed out.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Apply an event and recompute the preview.
    ///
    /// Text, size and logo-less previews are finished before this returns.
    /// With a logo, the decode continues in a spawned task, so this must be
    /// called from within a Tokio runtime.
    ///
    /// Shape, border and scale changes are recorded but do not recompute
    /// while no logo is uploaded; the returned handle then carries the
    /// current generation.
    ///
    /// # Errors
    ///
    /// Returns [`StudioError::Core`](crate::StudioError::Core) if the event is
    /// invalid (state and preview are untouched), or
    /// [`StudioError::Render`](crate::StudioError::Render) if the text cannot be
    /// encoded (state keeps the new text, preview is cleared).
    pub fn apply(&mut self, event: &StudioEvent) -> StudioResult<PendingPreview> {
        self.state.apply(event)?;

        if event.is_logo_setting() && !self.state.has_logo() {
            let generation = self.generation();
            let outcome = if self.preview().is_empty() {
                PreviewOutcome::Cleared
            } else {
                PreviewOutcome::Applied
            };
            tracing::debug!(generation, event = event.name(), "No logo; preview unchanged");
            return Ok(PendingPreview::settled_with(generation, outcome));
        }

        self.refresh()
    }

    /// Recompute the preview from the current state.
    ///
    /// # Errors
    ///
    /// Returns [`StudioError::Render`](crate::StudioError::Render) if the text
    /// cannot be encoded; the preview is cleared in that case.
    pub fn refresh(&mut self) -> StudioResult<PendingPreview> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let Some(request) = self.state.request() else {
            store_if_current(&self.preview, &self.generation, generation, PreviewState::Empty);
            tracing::debug!(generation, "Preview cleared");
            return Ok(PendingPreview::settled_with(generation, PreviewOutcome::Cleared));
        };

        let qr = match self.renderer.render_request(&request) {
            Ok(qr) => qr,
            Err(e) => {
                store_if_current(&self.preview, &self.generation, generation, PreviewState::Empty);
                return Err(e.into());
            }
        };

        let Some(logo) = self.state.logo_asset() else {
            let image = Compositor::base_surface(&qr, PADDING);
            store_if_current(
                &self.preview,
                &self.generation,
                generation,
                PreviewState::Ready {
                    image: Arc::new(image),
                    generation,
                    with_logo: false,
                },
            );
            tracing::debug!(generation, size = request.size(), "Preview applied");
            return Ok(PendingPreview::settled_with(generation, PreviewOutcome::Applied));
        };

        let compositor = self.compositor.clone();
        let slot = Arc::clone(&self.preview);
        let latest = Arc::clone(&self.generation);

        let handle = tokio::spawn(async move {
            let (image, with_logo, outcome) =
                match compositor.compose(&qr, PADDING, Some(&logo)).await {
                    Ok(image) => (image, true, PreviewOutcome::Applied),
                    Err(e) => {
                        tracing::warn!(generation, error = %e, "Logo not drawn; showing QR only");
                        (
                            Compositor::base_surface(&qr, PADDING),
                            false,
                            PreviewOutcome::Fallback,
                        )
                    }
                };

            let next = PreviewState::Ready {
                image: Arc::new(image),
                generation,
                with_logo,
            };
            if store_if_current(&slot, &latest, generation, next) {
                tracing::debug!(generation, ?outcome, "Preview applied");
                outcome
            } else {
                tracing::debug!(generation, "Preview superseded");
                PreviewOutcome::Superseded
            }
        });

        Ok(PendingPreview {
            generation,
            inner: Pending::Running(handle),
        })
    }
}
