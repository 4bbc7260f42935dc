//! One-shot generation: the `qr-studio generate` command.

use std::path::PathBuf;

use qr_core::{LogoScale, StudioEvent};

use crate::error::StudioResult;
use crate::export::ExportController;
use crate::preview::PreviewController;
use crate::shell::load_logo_source;
use crate::{GenerateArgs, StudioConfig};

impl GenerateArgs {
    /// The UI events these arguments stand for, in the order a user would
    /// perform them.
    ///
    /// # Errors
    ///
    /// Returns an error if the scale is out of range or the logo cannot be read.
    pub async fn events(&self) -> StudioResult<Vec<StudioEvent>> {
        let mut events = vec![
            StudioEvent::TextChanged(self.text.clone()),
            StudioEvent::SizeChanged(self.size),
            StudioEvent::ShapeChanged(self.shape),
            StudioEvent::BorderToggled(!self.no_border),
            StudioEvent::ScaleChanged(LogoScale::from_percent(self.scale_percent)?),
        ];
        if let Some(source) = &self.logo {
            events.push(StudioEvent::LogoUploaded {
                bytes: load_logo_source(source).await?,
            });
        }
        Ok(events)
    }
}

/// Render one QR code and write it into `config.out_dir`.
///
/// Returns the path of the written PNG.
///
/// # Errors
///
/// Returns [`StudioError::NothingToExport`](crate::StudioError::NothingToExport)
/// for blank text, a core error for out-of-range values, or an I/O error if the
/// logo cannot be read or the PNG cannot be written.
pub async fn generate(args: &GenerateArgs, config: &StudioConfig) -> StudioResult<PathBuf> {
    let compositor = config.compositor();
    let mut preview = PreviewController::new(compositor.clone());
    let export = ExportController::new(compositor);

    let mut last = None;
    for event in args.events().await? {
        last = Some(preview.apply(&event)?);
    }
    if let Some(pending) = last {
        let outcome = pending.settled().await;
        tracing::debug!(?outcome, "Preview settled");
    }

    let artifact = export.export(preview.state()).await?;
    if let Some(reason) = &artifact.logo_fallback {
        tracing::warn!("Logo left out of {}: {}", artifact.file_name, reason);
    }
    artifact.save_to(&config.out_dir).await
}
