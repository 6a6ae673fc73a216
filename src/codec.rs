//! The codec seam: everything pixel-level the pipeline delegates.
//!
//! The conversion pipeline only orchestrates; decoding bytes into pixels and
//! encoding pixels into a target format are delegated to an [`ImageCodec`].
//! [`NativeCodec`] is the default and mirrors what a browser does with an
//! `<img>` element and `canvas.toBlob`: it accepts any format the `image`
//! crate recognises and encodes with the browser default settings.
//!
//! Supply a different codec through
//! [`crate::config::ConversionConfigBuilder::codec`], e.g. to stub it out in
//! tests or to route through a hardware encoder.

use crate::format::TargetFormat;
use crate::pipeline::raster::RasterSurface;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::metadata::Orientation;
use image::{DynamicImage, ExtendedColorType, ImageDecoder, ImageEncoder, ImageReader};
use serde::{Deserialize, Serialize};
use std::io::Cursor;
use thiserror::Error;

/// Failure reported by a codec. The pipeline wraps it into
/// [`crate::error::ConvertError`] with the stage it happened in.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error(transparent)]
    Image(#[from] image::ImageError),

    #[error("{0}")]
    Other(String),
}

/// Decode/encode capability set used by the pipeline.
///
/// Implementations must be `Send + Sync`: the pipeline calls them from
/// tokio's blocking pool.
pub trait ImageCodec: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &str {
        "custom"
    }

    /// Decode encoded bytes into an image at its natural dimensions.
    fn decode(&self, bytes: &[u8]) -> Result<DynamicImage, CodecError>;

    /// Encode the rasterized surface into `format`.
    fn encode(
        &self,
        surface: &RasterSurface,
        format: TargetFormat,
        settings: &EncodeSettings,
    ) -> Result<Vec<u8>, CodecError>;
}

/// PNG deflate effort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PngCompression {
    Fast,
    #[default]
    Default,
    Best,
}

/// Encoder parameters. Never exposed in the widget; the defaults match what
/// browsers use for `canvas.toBlob` when no quality argument is passed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EncodeSettings {
    /// JPEG quality, 1–100. Browser default: 92.
    pub jpeg_quality: u8,
    /// Lossy WebP quality, 0–100. Browser default: 80.
    pub webp_quality: f32,
    pub png_compression: PngCompression,
}

impl Default for EncodeSettings {
    fn default() -> Self {
        Self {
            jpeg_quality: 92,
            webp_quality: 80.0,
            png_compression: PngCompression::Default,
        }
    }
}

/// Default codec backed by the `image` and `webp` crates.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeCodec;

impl ImageCodec for NativeCodec {
    fn name(&self) -> &str {
        "native"
    }

    fn decode(&self, bytes: &[u8]) -> Result<DynamicImage, CodecError> {
        // content decides the decoder, like an <img> element
        let mut decoder = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(image::ImageError::IoError)?
            .into_decoder()?;
        // unreadable EXIF is ignored, not fatal
        let orientation = decoder.orientation().unwrap_or(Orientation::NoTransforms);
        let mut image = DynamicImage::from_decoder(decoder)?;
        image.apply_orientation(orientation);
        Ok(image)
    }

    fn encode(
        &self,
        surface: &RasterSurface,
        format: TargetFormat,
        settings: &EncodeSettings,
    ) -> Result<Vec<u8>, CodecError> {
        let (width, height) = surface.dimensions();
        let mut buf = Vec::with_capacity((width as usize * height as usize) / 2);

        match format {
            TargetFormat::Png => {
                let compression = match settings.png_compression {
                    PngCompression::Fast => CompressionType::Fast,
                    PngCompression::Default => CompressionType::Default,
                    PngCompression::Best => CompressionType::Best,
                };
                PngEncoder::new_with_quality(&mut buf, compression, FilterType::Adaptive)
                    .write_image(surface.as_raw(), width, height, ExtendedColorType::Rgba8)?;
            }
            TargetFormat::Jpeg => {
                let rgb = surface.flatten_over_black();
                JpegEncoder::new_with_quality(&mut buf, settings.jpeg_quality.clamp(1, 100))
                    .encode_image(&rgb)?;
            }
            TargetFormat::Webp => {
                let encoder = webp::Encoder::from_rgba(surface.as_raw(), width, height);
                let memory = encoder
                    .encode_simple(false, settings.webp_quality.clamp(0.0, 100.0))
                    .map_err(|e| CodecError::Other(format!("libwebp: {e:?}")))?;
                buf.extend_from_slice(&memory);
            }
        }

        Ok(buf)
    }
}
