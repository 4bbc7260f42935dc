//! Line-oriented front end for the controllers.

use std::path::PathBuf;
use std::str::FromStr;

use qr_core::{CoreError, LogoScale, LogoShape, StudioEvent};
use qr_renderer::{decode_data_uri, encode_png, encode_png_data_uri};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::{StudioError, StudioResult};
use crate::export::ExportController;
use crate::preview::{PendingPreview, PreviewController, PreviewState};
use crate::StudioConfig;

const HELP: &str = "\
Commands:
  text <TEXT>            set the text or URL to encode (empty clears)
  size <100-400>         set the QR side length in pixels
  logo <PATH|DATA-URI>   upload a logo image
  remove-logo            remove the logo
  shape <square|rounded> set the logo shape
  border <on|off>        toggle the white border around the logo
  scale <10-50>          set the logo size as a percentage of the QR
  preview [PATH]         write the preview PNG to PATH, or print it as a data URI
  download               export qr-code-<ms>.png into the output directory
  status                 print the current settings as JSON
  help                   show this message
  quit                   leave the shell";

/// Read logo bytes from a `data:` URI or a file path.
///
/// # Errors
///
/// Returns [`StudioError::Render`] for a malformed data URI and
/// [`StudioError::Io`] if the file cannot be read.
pub async fn load_logo_source(source: &str) -> StudioResult<Vec<u8>> {
    if source.starts_with("data:") {
        Ok(decode_data_uri(source)?)
    } else {
        Ok(tokio::fs::read(source).await?)
    }
}

/// One parsed shell command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    /// `text <TEXT>`
    Text(String),
    /// `size <N>`
    Size(u32),
    /// `logo <PATH|DATA-URI>`
    Logo(String),
    /// `remove-logo`
    RemoveLogo,
    /// `shape <square|rounded>`
    Shape(LogoShape),
    /// `border <on|off>`
    Border(bool),
    /// `scale <PERCENT>`
    Scale(u8),
    /// `preview [PATH]`
    Preview(Option<PathBuf>),
    /// `download`
    Download,
    /// `status`
    Status,
    /// `help`
    Help,
    /// `quit`
    Quit,
}

fn required<'a>(name: &str, arg: &'a str) -> StudioResult<&'a str> {
    if arg.is_empty() {
        Err(StudioError::InvalidCommand(format!("{name} needs an argument")))
    } else {
        Ok(arg)
    }
}

fn number<T: FromStr>(name: &str, arg: &str) -> StudioResult<T> {
    required(name, arg)?
        .parse()
        .map_err(|_| StudioError::InvalidCommand(format!("{name}: not a number: {arg}")))
}

impl FromStr for ShellCommand {
    type Err = StudioError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim_end_matches(['\r', '\n']);
        let (name, arg) = line.trim_start().split_once(' ').unwrap_or((line.trim(), ""));
        let trimmed = arg.trim();

        match name.to_ascii_lowercase().as_str() {
            // Text is taken verbatim after the first space.
            "text" => Ok(Self::Text(arg.to_string())),
            "size" => Ok(Self::Size(number(name, trimmed)?)),
            "logo" => Ok(Self::Logo(required(name, trimmed)?.to_string())),
            "remove-logo" => Ok(Self::RemoveLogo),
            "shape" => Ok(Self::Shape(required(name, trimmed)?.parse()?)),
            "border" => match trimmed.to_ascii_lowercase().as_str() {
                "on" | "true" | "yes" => Ok(Self::Border(true)),
                "off" | "false" | "no" => Ok(Self::Border(false)),
                other => Err(StudioError::InvalidCommand(format!(
                    "border expects on or off, got {other:?}"
                ))),
            },
            "scale" => Ok(Self::Scale(number(name, trimmed.trim_end_matches('%'))?)),
            "preview" => Ok(Self::Preview(
                (!trimmed.is_empty()).then(|| PathBuf::from(trimmed)),
            )),
            "download" => Ok(Self::Download),
            "status" => Ok(Self::Status),
            "help" | "?" => Ok(Self::Help),
            "quit" | "exit" => Ok(Self::Quit),
            other => Err(StudioError::InvalidCommand(format!(
                "unknown command {other:?} (try `help`)"
            ))),
        }
    }
}

/// Result of executing a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellReply {
    /// Text to print.
    Output(String),
    /// The session should end.
    Quit,
}

/// An interactive session over one preview and one export controller.
#[derive(Debug)]
pub struct Shell {
    preview: PreviewController,
    export: ExportController,
    out_dir: PathBuf,
    pending: Option<PendingPreview>,
}

impl Shell {
    /// Create a session from configuration.
    #[must_use]
    pub fn new(config: &StudioConfig) -> Self {
        let compositor = config.compositor();
        Self::with_controllers(
            PreviewController::new(compositor.clone()),
            ExportController::new(compositor),
            config.out_dir.clone(),
        )
    }

    /// Create a session from existing controllers.
    #[must_use]
    pub fn with_controllers(
        preview: PreviewController,
        export: ExportController,
        out_dir: PathBuf,
    ) -> Self {
        Self {
            preview,
            export,
            out_dir,
            pending: None,
        }
    }

    /// The preview controller.
    #[must_use]
    pub const fn preview(&self) -> &PreviewController {
        &self.preview
    }

    async fn event_for(command: ShellCommand) -> StudioResult<Option<StudioEvent>> {
        let event = match command {
            ShellCommand::Text(text) => StudioEvent::TextChanged(text),
            ShellCommand::Size(size) => StudioEvent::SizeChanged(size),
            ShellCommand::Logo(source) => StudioEvent::LogoUploaded {
                bytes: load_logo_source(&source).await?,
            },
            ShellCommand::RemoveLogo => StudioEvent::LogoRemoved,
            ShellCommand::Shape(shape) => StudioEvent::ShapeChanged(shape),
            ShellCommand::Border(border) => StudioEvent::BorderToggled(border),
            ShellCommand::Scale(percent) => {
                StudioEvent::ScaleChanged(LogoScale::from_percent(percent)?)
            }
            _ => return Ok(None),
        };
        Ok(Some(event))
    }

    /// Execute one command.
    ///
    /// # Errors
    ///
    /// Returns the underlying controller or I/O error; the session stays
    /// usable afterwards.
    pub async fn execute(&mut self, command: ShellCommand) -> StudioResult<ShellReply> {
        let reply = match command {
            ShellCommand::Preview(path) => self.write_preview(path).await?,
            ShellCommand::Download => {
                let artifact = self.export.export(self.preview.state()).await?;
                let path = artifact.save_to(&self.out_dir).await?;
                let mut reply = format!(
                    "saved {} ({}x{})",
                    path.display(),
                    artifact.width,
                    artifact.height
                );
                if let Some(reason) = artifact.logo_fallback {
                    reply.push_str(&format!(" without logo: {reason}"));
                }
                reply
            }
            ShellCommand::Status => serde_json::to_string_pretty(&self.preview.state().summary())
                .map_err(CoreError::from)?,
            ShellCommand::Help => HELP.to_string(),
            ShellCommand::Quit => return Ok(ShellReply::Quit),
            command => {
                let Some(event) = Self::event_for(command).await? else {
                    return Ok(ShellReply::Output(String::new()));
                };
                let pending = self.preview.apply(&event)?;
                let reply = if pending.is_settled() {
                    format!("preview updated (generation {})", pending.generation())
                } else {
                    format!("preview updating (generation {})", pending.generation())
                };
                self.pending = Some(pending);
                reply
            }
        };
        Ok(ShellReply::Output(reply))
    }

    async fn write_preview(&mut self, path: Option<PathBuf>) -> StudioResult<String> {
        if let Some(pending) = self.pending.take() {
            let outcome = pending.settled().await;
            tracing::debug!(?outcome, "Waited for preview");
        }

        let PreviewState::Ready {
            image, with_logo, ..
        } = self.preview.preview()
        else {
            return Ok("preview is empty: enter some text first".to_string());
        };

        match path {
            Some(path) => {
                tokio::fs::write(&path, encode_png(&image)?).await?;
                Ok(format!(
                    "wrote {} ({}x{}{})",
                    path.display(),
                    image.width(),
                    image.height(),
                    if with_logo { ", with logo" } else { "" }
                ))
            }
            None => Ok(encode_png_data_uri(&image)?),
        }
    }

    /// Run commands from `input` until `quit` or end of input.
    ///
    /// Errors are written to `output` and the loop continues.
    ///
    /// # Errors
    ///
    /// Returns [`StudioError::Io`] only if reading input or writing output fails.
    pub async fn run<R, W>(&mut self, input: R, mut output: W) -> StudioResult<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = input.lines();
        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            let result = match line.parse::<ShellCommand>() {
                Ok(command) => self.execute(command).await,
                Err(e) => Err(e),
            };
            match result {
                Ok(ShellReply::Quit) => break,
                Ok(ShellReply::Output(text)) if text.is_empty() => {}
                Ok(ShellReply::Output(text)) => {
                    output.write_all(text.as_bytes()).await?;
                    output.write_all(b"\n").await?;
                }
                Err(e) => {
                    tracing::debug!(error = %e, "Shell command failed");
                    output.write_all(format!("error: {e}\n").as_bytes()).await?;
                }
            }
            output.flush().await?;
        }
        Ok(())
    }
}
