//! The input controller: the widget's state and its event handlers.
//!
//! The controller owns the selected file, the selected format and the error
//! message, and renders them through [`InputController::view`]. All handlers
//! take `&mut self`, so
//! a controller can never run two conversions at once: a second convert
//! press waits for the first to finish.
//!
//! ```rust,no_run
//! use imgconv::{InputController, SelectedFile, TargetFormat};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let mut widget = InputController::new().with_output_dir("downloads");
//! widget.on_file_chosen(Some(SelectedFile::from_path("photo.png")));
//! widget.on_format_chosen(Some(TargetFormat::Webp));
//! assert!(widget.view().convert_enabled);
//!
//! match widget.on_convert().await {
//!     Some(out) => println!("saved {}", out.download.file_name),
//!     None => eprintln!("{}", widget.error().unwrap_or_default()),
//! }
//! # }
//! ```

use crate::config::ConversionConfig;
use crate::convert;
use crate::error::{ConvertError, INVALID_FILE_MESSAGE};
use crate::format::{TargetFormat, UnknownFormat};
use crate::output::ConversionOutput;
use crate::pipeline::deliver::Download;
use crate::pipeline::input::SelectedFile;
use serde::Serialize;
use std::path::PathBuf;
use tracing::{debug, warn};

pub const TITLE: &str = "Image Type Converter";
pub const FILE_PLACEHOLDER: &str = "Click to upload file";
pub const FORMAT_PLACEHOLDER: &str = "Select conversion type";
pub const CONVERT_LABEL: &str = "Convert & Download";
/// File-picker filter. Only a hint: selection is still checked.
pub const ACCEPT_FILTER: &str = "image/*";

/// One entry of the format dropdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormatOption {
    pub value: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

/// Everything needed to draw the widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewModel {
    pub title: &'static str,
    pub accept: &'static str,
    /// Chosen file's display name, or the placeholder prompt.
    pub file_label: String,
    /// Present only when there is an error to show.
    pub error: Option<String>,
    pub format_placeholder: &'static str,
    pub format_options: Vec<FormatOption>,
    pub convert_label: &'static str,
    pub convert_enabled: bool,
}

/// The widget: selection state plus the convert action.
#[derive(Debug, Default)]
pub struct InputController {
    selected_file: Option<SelectedFile>,
    selected_format: Option<TargetFormat>,
    error: Option<String>,
    config: ConversionConfig,
    output_dir: Option<PathBuf>,
    last_download: Option<Download>,
}

impl InputController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: ConversionConfig) -> Self {
        self.config = config;
        self
    }

    /// Write downloads into `dir`. Without it, downloads stay in memory.
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    // ── Events ───────────────────────────────────────────────────────────

    /// The user picked a file (or dismissed the picker with `None`).
    pub fn on_file_chosen(&mut self, file: Option<SelectedFile>) {
        match file {
            Some(file) if file.is_image() => {
                debug!("Selected '{}' ({})", file.name(), file.mime());
                self.selected_file = Some(file);
                self.error = None;
            }
            other => {
                if let Some(ref f) = other {
                    warn!("Rejected '{}': declared type '{}'", f.name(), f.mime());
                }
                self.selected_file = None;
                self.error = Some(INVALID_FILE_MESSAGE.to_string());
            }
        }
    }

    /// The user picked a dropdown entry (`None` is the placeholder).
    pub fn on_format_chosen(&mut self, format: Option<TargetFormat>) {
        self.selected_format = format;
    }

    /// Like [`on_format_chosen`](Self::on_format_chosen), from a raw dropdown value.
    pub fn on_format_value(&mut self, value: &str) -> Result<(), UnknownFormat> {
        let format = TargetFormat::parse_selection(value)?;
        self.on_format_chosen(format);
        Ok(())
    }

    /// The user pressed convert.
    ///
    /// Returns the conversion output on success. On failure the error
    /// message is set and `None` is returned; the widget stays usable.
    pub async fn on_convert(&mut self) -> Option<ConversionOutput> {
        // second line of defence behind the disabled button
        let result = convert::convert_selection(
            self.selected_file.as_ref(),
            self.selected_format,
            self.output_dir.as_deref(),
            &self.config,
        )
        .await;

        match result {
            Ok(output) => {
                self.last_download = Some(output.download.clone());
                Some(output)
            }
            Err(e) => {
                self.set_error(&e);
                None
            }
        }
    }

    // ── Queries ──────────────────────────────────────────────────────────

    /// Convert is enabled only with both a file and a format.
    pub fn can_convert(&self) -> bool {
        self.selected_file.is_some() && self.selected_format.is_some()
    }

    pub fn selected_file(&self) -> Option<&SelectedFile> {
        self.selected_file.as_ref()
    }

    pub fn selected_format(&self) -> Option<TargetFormat> {
        self.selected_format
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Artifact of the most recent successful convert.
    pub fn last_download(&self) -> Option<&Download> {
        self.last_download.as_ref()
    }

    pub fn view(&self) -> ViewModel {
        ViewModel {
            title: TITLE,
            accept: ACCEPT_FILTER,
            file_label: self
                .selected_file
                .as_ref()
                .map(|f| f.name().to_string())
                .unwrap_or_else(|| FILE_PLACEHOLDER.to_string()),
            error: self.error.clone().filter(|e| !e.is_empty()),
            format_placeholder: FORMAT_PLACEHOLDER,
            format_options: TargetFormat::ALL
                .iter()
                .map(|&f| FormatOption {
                    value: f.as_str(),
                    label: f.label(),
                    selected: self.selected_format == Some(f),
                })
                .collect(),
            convert_label: CONVERT_LABEL,
            convert_enabled: self.can_convert(),
        }
    }

    fn set_error(&mut self, err: &ConvertError) {
        self.error = Some(err.user_message().to_string());
    }
}
