//! Conversion entry points.
//!
//! Every entry point funnels into one pipeline run:
//!
//! ```text
//! Loading ──▶ Decoding ──▶ Rasterizing ──▶ Encoding ──▶ Downloaded
//!    └───────────┴─────────────┴──────────────┴──▶ Failed
//! ```
//!
//! Failures are caught once, at the outer boundary: the full cause is logged
//! and returned as a [`ConvertError`], whose
//! [`user_message`](ConvertError::user_message) is the generic
//! "Error converting image". There are no retries and no cancellation; a
//! started run goes to completion or failure.

use crate::config::ConversionConfig;
use crate::error::ConvertError;
use crate::format::TargetFormat;
use crate::output::{ConversionOutput, ConversionStats, ImageInfo};
use crate::pipeline::deliver::{self, Download};
use crate::pipeline::input::{self, SelectedFile};
use crate::pipeline::{decode, encode, raster};
use crate::progress::{ConversionStage, ProgressCallback};
use image::GenericImageView;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};

/// Convert a selected image into `format`, keeping the result in memory.
///
/// # Errors
/// - [`ConvertError::InvalidFileType`] if the declared MIME type is not `image/*`
/// - any pipeline failure (load, decode, rasterize, encode)
pub async fn convert(
    file: &SelectedFile,
    format: TargetFormat,
    config: &ConversionConfig,
) -> Result<ConversionOutput, ConvertError> {
    run(file, format, config, None).await
}

/// Convert and write `img.<format>` into `output_dir`.
///
/// Uses atomic write (temp file + rename) to prevent partial files.
pub async fn convert_to_dir(
    file: &SelectedFile,
    format: TargetFormat,
    output_dir: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, ConvertError> {
    run(file, format, config, Some(output_dir.as_ref())).await
}

/// Convert a possibly incomplete selection.
///
/// Missing file or format is rejected with
/// [`ConvertError::MissingSelection`] before anything runs.
pub async fn convert_selection(
    file: Option<&SelectedFile>,
    format: Option<TargetFormat>,
    output_dir: Option<&Path>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, ConvertError> {
    let (Some(file), Some(format)) = (file, format) else {
        return Err(ConvertError::MissingSelection);
    };
    run(file, format, config, output_dir).await
}

/// Convert image bytes already in memory.
///
/// # Example
/// ```rust,no_run
/// use imgconv::{convert_bytes, ConversionConfig, TargetFormat};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let bytes: Vec<u8> = std::fs::read("photo.png")?;
/// let output = convert_bytes("photo.png", "image/png", bytes, TargetFormat::Webp,
///     &ConversionConfig::default()).await?;
/// assert_eq!(output.download.file_name, "img.webp");
/// # Ok(())
/// # }
/// ```
pub async fn convert_bytes(
    name: impl Into<String>,
    mime: impl Into<String>,
    bytes: impl Into<Arc<[u8]>>,
    format: TargetFormat,
    config: &ConversionConfig,
) -> Result<ConversionOutput, ConvertError> {
    let file = SelectedFile::from_bytes(name, mime, bytes);
    convert(&file, format, config).await
}

/// Synchronous wrapper around [`convert`].
///
/// Creates a temporary tokio runtime internally.
pub fn convert_sync(
    file: &SelectedFile,
    format: TargetFormat,
    config: &ConversionConfig,
) -> Result<ConversionOutput, ConvertError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| ConvertError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(convert(file, format, config))
}

/// Report a file's declared and detected type and its dimensions.
///
/// Decodes the image but encodes nothing.
pub async fn inspect(
    file: &SelectedFile,
    config: &ConversionConfig,
) -> Result<ImageInfo, ConvertError> {
    let bytes = input::load_bytes(file).await?;
    let detected_mime = image::guess_format(&bytes)
        .ok()
        .map(|f| f.to_mime_type().to_string());
    let size_bytes = bytes.len();

    let image = decode::decode(
        config.resolve_codec(),
        file.name(),
        bytes,
        config.decode_timeout_secs,
    )
    .await?;
    let (width, height) = image.dimensions();

    Ok(ImageInfo {
        name: file.name().to_string(),
        declared_mime: file.mime().to_string(),
        detected_mime,
        width,
        height,
        size_bytes,
    })
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// Reports stage transitions to the configured callback and remembers
/// the current one for error reporting.
struct StageTracker<'a> {
    callback: Option<&'a ProgressCallback>,
    current: ConversionStage,
}

impl<'a> StageTracker<'a> {
    fn new(callback: Option<&'a ProgressCallback>) -> Self {
        Self {
            callback,
            current: ConversionStage::Idle,
        }
    }

    fn enter(&mut self, stage: ConversionStage) {
        debug!("Stage: {} → {}", self.current, stage);
        self.current = stage;
        if let Some(cb) = self.callback {
            cb.on_stage(stage);
        }
    }

    fn fail(&mut self, err: &ConvertError) {
        if let Some(cb) = self.callback {
            cb.on_conversion_error(self.current, &err.to_string());
        }
        self.enter(ConversionStage::Failed);
    }
}

/// Outer boundary: run the pipeline, log and report any failure once.
async fn run(
    file: &SelectedFile,
    format: TargetFormat,
    config: &ConversionConfig,
    output_dir: Option<&Path>,
) -> Result<ConversionOutput, ConvertError> {
    if !file.is_image() {
        return Err(ConvertError::InvalidFileType {
            name: file.name().to_string(),
            mime: file.mime().to_string(),
        });
    }

    info!("Starting conversion: '{}' → {}", file.name(), format);
    if let Some(ref cb) = config.progress_callback {
        cb.on_conversion_start(file.name(), format.as_str());
    }

    let mut tracker = StageTracker::new(config.progress_callback.as_ref());
    match run_pipeline(file, format, config, output_dir, &mut tracker).await {
        Ok(output) => {
            if let Some(ref cb) = config.progress_callback {
                cb.on_conversion_complete(&output.download.file_name, output.download.len());
            }
            Ok(output)
        }
        Err(e) => {
            error!(
                "Conversion of '{}' to {} failed while {}: {}",
                file.name(),
                format,
                tracker.current,
                e
            );
            tracker.fail(&e);
            Err(e)
        }
    }
}

async fn run_pipeline(
    file: &SelectedFile,
    format: TargetFormat,
    config: &ConversionConfig,
    output_dir: Option<&Path>,
    tracker: &mut StageTracker<'_>,
) -> Result<ConversionOutput, ConvertError> {
    let total_start = Instant::now();
    let codec = config.resolve_codec();

    // ── Step 1: Load bytes ───────────────────────────────────────────────
    tracker.enter(ConversionStage::Loading);
    let load_start = Instant::now();
    let bytes = input::load_bytes(file).await?;
    let input_bytes = bytes.len();
    let load_duration_ms = load_start.elapsed().as_millis() as u64;

    // ── Step 2: Decode (completes before anything is drawn) ──────────────
    tracker.enter(ConversionStage::Decoding);
    let decode_start = Instant::now();
    let image = decode::decode(
        Arc::clone(&codec),
        file.name(),
        bytes,
        config.decode_timeout_secs,
    )
    .await?;
    let decode_duration_ms = decode_start.elapsed().as_millis() as u64;

    // ── Step 3: Rasterize at natural size ────────────────────────────────
    tracker.enter(ConversionStage::Rasterizing);
    let surface = raster::rasterize(&image)?;
    drop(image);
    let dimensions = surface.dimensions();

    // ── Step 4: Encode at default settings ───────────────────────────────
    tracker.enter(ConversionStage::Encoding);
    let encode_start = Instant::now();
    let data = encode::encode(codec, surface, format, config.encode).await?;
    let encode_duration_ms = encode_start.elapsed().as_millis() as u64;

    // ── Step 5: Deliver as img.<format> ──────────────────────────────────
    let download = Download {
        file_name: format.file_name(&config.output_stem),
        format,
        dimensions,
        bytes: data,
    };
    let saved_to = match output_dir {
        Some(dir) => Some(deliver::deliver_to_dir(&download, dir).await?),
        None => None,
    };
    tracker.enter(ConversionStage::Downloaded);

    let stats = ConversionStats {
        input_bytes,
        output_bytes: download.len(),
        load_duration_ms,
        decode_duration_ms,
        encode_duration_ms,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    };

    info!(
        "Conversion complete: {} ({}x{}, {} → {} bytes) in {}ms",
        download.file_name,
        dimensions.0,
        dimensions.1,
        stats.input_bytes,
        stats.output_bytes,
        stats.total_duration_ms
    );

    Ok(ConversionOutput {
        download,
        stats,
        saved_to,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::ConversionProgressCallback;
    use image::{DynamicImage, Rgba, RgbaImage};
    use std::io::Cursor;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        stages: Mutex<Vec<ConversionStage>>,
        failed_in: Mutex<Option<ConversionStage>>,
    }

    impl ConversionProgressCallback for Recorder {
        fn on_stage(&self, stage: ConversionStage) {
            self.stages.lock().unwrap().push(stage);
        }

        fn on_conversion_error(&self, stage: ConversionStage, _error: &str) {
            *self.failed_in.lock().unwrap() = Some(stage);
        }
    }

    fn png(width: u32, height: u32) -> Vec<u8> {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, Rgba([40, 80, 120, 255])));
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .unwrap();
        buf
    }

    #[tokio::test]
    async fn successful_run_walks_every_stage() {
        let rec = Arc::new(Recorder::default());
        let config = ConversionConfig::builder()
            .progress_callback(rec.clone())
            .build()
            .unwrap();

        let out = convert_bytes("a.png", "image/png", png(5, 3), TargetFormat::Jpeg, &config)
            .await
            .unwrap();
        assert_eq!(out.download.file_name, "img.jpeg");
        assert_eq!(out.download.dimensions, (5, 3));
        assert!(out.saved_to.is_none());
        assert_eq!(
            *rec.stages.lock().unwrap(),
            vec![
                ConversionStage::Loading,
                ConversionStage::Decoding,
                ConversionStage::Rasterizing,
                ConversionStage::Encoding,
                ConversionStage::Downloaded,
            ]
        );
    }

    #[tokio::test]
    async fn decode_failure_is_reported_from_decoding() {
        let rec = Arc::new(Recorder::default());
        let config = ConversionConfig::builder()
            .progress_callback(rec.clone())
            .build()
            .unwrap();

        let err = convert_bytes("bad.png", "image/png", b"nope".to_vec(), TargetFormat::Png, &config)
            .await
            .unwrap_err();
        assert_eq!(err.user_message(), "Error converting image");
        assert_eq!(*rec.failed_in.lock().unwrap(), Some(ConversionStage::Decoding));
        assert_eq!(
            rec.stages.lock().unwrap().last(),
            Some(&ConversionStage::Failed)
        );
    }

    #[tokio::test]
    async fn non_image_mime_never_starts() {
        let rec = Arc::new(Recorder::default());
        let config = ConversionConfig::builder()
            .progress_callback(rec.clone())
            .build()
            .unwrap();

        let err = convert_bytes("a.txt", "text/plain", png(2, 2), TargetFormat::Png, &config)
            .await
            .unwrap_err();
        assert!(matches!(err, ConvertError::InvalidFileType { .. }));
        assert!(rec.stages.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_selection_is_rejected() {
        let config = ConversionConfig::default();
        let file = SelectedFile::from_bytes("a.png", "image/png", png(1, 1));

        let err = convert_selection(None, Some(TargetFormat::Png), None, &config)
            .await
            .unwrap_err();
        assert!(matches!(err, ConvertError::MissingSelection));

        let err = convert_selection(Some(&file), None, None, &config)
            .await
            .unwrap_err();
        assert_eq!(
            err.user_message(),
            "Please select both a file and conversion format"
        );
    }

    #[tokio::test]
    async fn custom_stem_names_download() {
        let config = ConversionConfig::builder()
            .output_stem("converted")
            .build()
            .unwrap();
        let out = convert_bytes("a.png", "image/png", png(2, 2), TargetFormat::Webp, &config)
            .await
            .unwrap();
        assert_eq!(out.download.file_name, "converted.webp");
    }

    #[tokio::test]
    async fn inspect_reports_detected_type() {
        // declared as JPEG, actually PNG
        let file = SelectedFile::from_bytes("liar.jpg", "image/jpeg", png(9, 4));
        let info = inspect(&file, &ConversionConfig::default()).await.unwrap();
        assert_eq!(info.declared_mime, "image/jpeg");
        assert_eq!(info.detected_mime.as_deref(), Some("image/png"));
        assert_eq!((info.width, info.height), (9, 4));
    }

    #[test]
    fn sync_wrapper_runs_without_runtime() {
        let file = SelectedFile::from_bytes("a.png", "image/png", png(3, 3));
        let out = convert_sync(&file, TargetFormat::Png, &ConversionConfig::default()).unwrap();
        assert_eq!(out.download.dimensions, (3, 3));
    }
}
