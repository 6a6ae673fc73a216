//! Results returned by the conversion entry points.

use crate::format::TargetFormat;
use crate::pipeline::deliver::Download;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Everything one successful conversion produced.
#[derive(Debug, Clone)]
pub struct ConversionOutput {
    /// The artifact to hand to the user.
    pub download: Download,
    pub stats: ConversionStats,
    /// Where the download was written, when delivered to a directory.
    pub saved_to: Option<PathBuf>,
}

/// Timing and size figures for one conversion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionStats {
    pub input_bytes: usize,
    pub output_bytes: usize,
    pub load_duration_ms: u64,
    pub decode_duration_ms: u64,
    pub encode_duration_ms: u64,
    pub total_duration_ms: u64,
}

/// What [`crate::convert::inspect`] learns about a file without converting it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageInfo {
    pub name: String,
    /// MIME type the file was declared with.
    pub declared_mime: String,
    /// MIME type of the format actually found in the bytes, if recognised.
    pub detected_mime: Option<String>,
    pub width: u32,
    pub height: u32,
    pub size_bytes: usize,
}

/// Serialisable summary of a delivered conversion (CLI `--json`).
#[derive(Debug, Clone, Serialize)]
pub struct ConversionReport {
    pub source: String,
    pub file_name: String,
    pub format: TargetFormat,
    pub mime_type: String,
    pub width: u32,
    pub height: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    pub stats: ConversionStats,
}

impl ConversionReport {
    pub fn new(source: &str, output: &ConversionOutput) -> Self {
        let d = &output.download;
        Self {
            source: source.to_string(),
            file_name: d.file_name.clone(),
            format: d.format,
            mime_type: d.mime_type().to_string(),
            width: d.dimensions.0,
            height: d.dimensions.1,
            path: output.saved_to.clone(),
            stats: output.stats.clone(),
        }
    }
}
