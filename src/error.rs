//! Error types for the imgconv library.
//!
//! [`ConvertError`] carries the full cause of a failure so it can be logged
//! and matched on by library callers. The widget, however, only ever shows
//! one of three fixed strings; [`ConvertError::user_message`] performs that
//! collapse:
//!
//! | Cause | Message shown |
//! |-------|---------------|
//! | [`ConvertError::InvalidFileType`] | [`INVALID_FILE_MESSAGE`] |
//! | [`ConvertError::MissingSelection`] | [`MISSING_SELECTION_MESSAGE`] |
//! | anything raised inside the pipeline | [`CONVERSION_FAILED_MESSAGE`] |

use std::path::PathBuf;
use thiserror::Error;

/// Shown when the picked file's declared MIME type is not `image/*`.
pub const INVALID_FILE_MESSAGE: &str = "Please select a valid image file";

/// Shown when convert is requested without both a file and a format.
pub const MISSING_SELECTION_MESSAGE: &str = "Please select both a file and conversion format";

/// Shown for every failure inside the conversion pipeline.
pub const CONVERSION_FAILED_MESSAGE: &str = "Error converting image";

/// All errors returned by the imgconv library.
#[derive(Debug, Error)]
pub enum ConvertError {
    // ── Selection errors ──────────────────────────────────────────────────
    /// Declared MIME type does not start with `image/`.
    #[error("Invalid file type '{mime}' for '{name}': expected an image/* file")]
    InvalidFileType { name: String, mime: String },

    /// Convert was requested before both a file and a format were chosen.
    #[error("Both a file and a target format must be selected")]
    MissingSelection,

    // ── Load errors ───────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("Image file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// Reading the file's bytes failed for another reason.
    #[error("Failed to read '{path}': {source}")]
    LoadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Pipeline errors ───────────────────────────────────────────────────
    /// The codec rejected the bytes (corrupt or mislabelled file).
    #[error("Failed to decode '{name}': {detail}")]
    DecodeFailed { name: String, detail: String },

    /// Decoding did not finish within the configured timeout.
    #[error("Decoding '{name}' timed out after {secs}s")]
    DecodeTimeout { name: String, secs: u64 },

    /// The decoded image has no pixels, so there is nothing to rasterize.
    #[error("Image has zero area ({width}x{height})")]
    EmptySurface { width: u32, height: u32 },

    /// The codec failed to encode the surface.
    #[error("Failed to encode {format}: {detail}")]
    EncodeFailed { format: String, detail: String },

    /// The codec returned successfully but produced no bytes.
    #[error("Encoder produced no output for {format}")]
    EmptyOutput { format: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the downloaded file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ConvertError {
    /// The message the widget displays for this error.
    pub fn user_message(&self) -> &'static str {
        match self {
            ConvertError::InvalidFileType { .. } => INVALID_FILE_MESSAGE,
            ConvertError::MissingSelection => MISSING_SELECTION_MESSAGE,
            _ => CONVERSION_FAILED_MESSAGE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_file_type_maps_to_invalid_message() {
        let e = ConvertError::InvalidFileType {
            name: "notes.txt".into(),
            mime: "text/plain".into(),
        };
        assert_eq!(e.user_message(), "Please select a valid image file");
        assert!(e.to_string().contains("text/plain"));
    }

    #[test]
    fn missing_selection_message() {
        let e = ConvertError::MissingSelection;
        assert_eq!(
            e.user_message(),
            "Please select both a file and conversion format"
        );
    }

    #[test]
    fn pipeline_errors_collapse_to_generic_message() {
        let errors = [
            ConvertError::DecodeFailed {
                name: "a.png".into(),
                detail: "bad header".into(),
            },
            ConvertError::DecodeTimeout {
                name: "a.png".into(),
                secs: 5,
            },
            ConvertError::EmptySurface {
                width: 0,
                height: 4,
            },
            ConvertError::EmptyOutput {
                format: "webp".into(),
            },
            ConvertError::Internal("join".into()),
        ];
        for e in errors {
            assert_eq!(e.user_message(), "Error converting image", "for {e:?}");
        }
    }

    #[test]
    fn decode_failed_display_keeps_detail() {
        let e = ConvertError::DecodeFailed {
            name: "photo.jpg".into(),
            detail: "unexpected EOF".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("photo.jpg"), "got: {msg}");
        assert!(msg.contains("unexpected EOF"), "got: {msg}");
    }
}
