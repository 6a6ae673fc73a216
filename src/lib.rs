//! # imgconv
//!
//! Convert an image into PNG, WebP or JPEG.
//!
//! The crate models a small converter widget: the user picks an image file,
//! picks a target format and gets back a re-encoded copy named
//! `img.<format>`. Decoding and encoding go through a pluggable
//! [`ImageCodec`]; the default [`NativeCodec`] uses the `image` and `webp`
//! crates.
//!
//! ## Pipeline Overview
//!
//! ```text
//! image file
//!  │
//!  ├─ 1. Load       read bytes (file on disk or in memory)
//!  ├─ 2. Decode     codec decode on the blocking pool, optional timeout
//!  ├─ 3. Rasterize  RGBA8 surface at natural dimensions
//!  ├─ 4. Encode     PNG / WebP (q 80) / JPEG (q 92, alpha over black)
//!  └─ 5. Deliver    img.<format>, written atomically or as a data: URL
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use imgconv::{convert_to_dir, ConversionConfig, SelectedFile, TargetFormat};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let file = SelectedFile::from_path("photo.png");
//!     let output = convert_to_dir(&file, TargetFormat::Webp, "out",
//!         &ConversionConfig::default()).await?;
//!     println!("wrote {:?} ({} bytes)", output.saved_to, output.stats.output_bytes);
//!     Ok(())
//! }
//! ```
//!
//! For the widget's own state handling (selection checks, enabled button,
//! user-facing error strings) drive an [`InputController`] instead.
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `imgconv` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! imgconv = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod codec;
pub mod config;
pub mod controller;
pub mod convert;
pub mod error;
pub mod format;
pub mod output;
pub mod pipeline;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use codec::{CodecError, EncodeSettings, ImageCodec, NativeCodec, PngCompression};
pub use config::{ConversionConfig, ConversionConfigBuilder};
pub use controller::{FormatOption, InputController, ViewModel};
pub use convert::{convert, convert_bytes, convert_selection, convert_sync, convert_to_dir, inspect};
pub use error::{
    ConvertError, CONVERSION_FAILED_MESSAGE, INVALID_FILE_MESSAGE, MISSING_SELECTION_MESSAGE,
};
pub use format::{TargetFormat, UnknownFormat};
pub use output::{ConversionOutput, ConversionReport, ConversionStats, ImageInfo};
pub use pipeline::deliver::Download;
pub use pipeline::input::SelectedFile;
pub use pipeline::raster::RasterSurface;
pub use progress::{
    ConversionProgressCallback, ConversionStage, NoopProgressCallback, ProgressCallback,
};
