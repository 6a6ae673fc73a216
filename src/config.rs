//! Configuration types for image conversion.
//!
//! Everything the pipeline can be told lives in [`ConversionConfig`], built
//! via [`ConversionConfigBuilder`]. The widget never exposes quality knobs to
//! its user; the defaults reproduce what a browser's `canvas.toBlob` does
//! when called without a quality argument. Library callers may tune them.

use crate::codec::{EncodeSettings, ImageCodec, NativeCodec, PngCompression};
use crate::error::ConvertError;
use crate::progress::ProgressCallback;
use std::fmt;
use std::sync::Arc;

/// File stem of every download.
pub const DEFAULT_OUTPUT_STEM: &str = "img";

/// Configuration for a conversion.
///
/// Built via [`ConversionConfig::builder()`] or using
/// [`ConversionConfig::default()`].
///
/// # Example
/// ```rust
/// use imgconv::ConversionConfig;
///
/// let config = ConversionConfig::builder()
///     .jpeg_quality(85)
///     .decode_timeout_secs(30)
///     .build()
///     .unwrap();
/// assert_eq!(config.encode.jpeg_quality, 85);
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// Encoder parameters. Default: JPEG 92, WebP 80, PNG default deflate.
    pub encode: EncodeSettings,

    /// Abort decoding after this many seconds. Default: None (wait forever).
    ///
    /// A browser image decode has no timeout either; set one when the input
    /// comes from an untrusted source.
    pub decode_timeout_secs: Option<u64>,

    /// Stem of the downloaded file name. Default: `"img"`.
    pub output_stem: String,

    /// Pre-constructed codec. If None, [`NativeCodec`] is used.
    pub codec: Option<Arc<dyn ImageCodec>>,

    /// Optional observer for stage transitions.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            encode: EncodeSettings::default(),
            decode_timeout_secs: None,
            output_stem: DEFAULT_OUTPUT_STEM.to_string(),
            codec: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("encode", &self.encode)
            .field("decode_timeout_secs", &self.decode_timeout_secs)
            .field("output_stem", &self.output_stem)
            .field("codec", &self.codec.as_ref().map(|c| c.name().to_string()))
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn ConversionProgressCallback>"),
            )
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }

    /// The configured codec, or the native one.
    pub fn resolve_codec(&self) -> Arc<dyn ImageCodec> {
        match self.codec {
            Some(ref codec) => Arc::clone(codec),
            None => Arc::new(NativeCodec),
        }
    }
}

/// Builder for [`ConversionConfig`].
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl fmt::Debug for ConversionConfigBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfigBuilder")
            .field("config", &self.config)
            .finish()
    }
}

impl ConversionConfigBuilder {
    pub fn jpeg_quality(mut self, quality: u8) -> Self {
        self.config.encode.jpeg_quality = quality;
        self
    }

    pub fn webp_quality(mut self, quality: f32) -> Self {
        self.config.encode.webp_quality = quality;
        self
    }

    pub fn png_compression(mut self, compression: PngCompression) -> Self {
        self.config.encode.png_compression = compression;
        self
    }

    pub fn decode_timeout_secs(mut self, secs: u64) -> Self {
        self.config.decode_timeout_secs = Some(secs);
        self
    }

    pub fn output_stem(mut self, stem: impl Into<String>) -> Self {
        self.config.output_stem = stem.into();
        self
    }

    pub fn codec(mut self, codec: Arc<dyn ImageCodec>) -> Self {
        self.config.codec = Some(codec);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, ConvertError> {
        let c = &self.config;
        if !(1..=100).contains(&c.encode.jpeg_quality) {
            return Err(ConvertError::InvalidConfig(format!(
                "JPEG quality must be 1–100, got {}",
                c.encode.jpeg_quality
            )));
        }
        if !(0.0..=100.0).contains(&c.encode.webp_quality) {
            return Err(ConvertError::InvalidConfig(format!(
                "WebP quality must be 0–100, got {}",
                c.encode.webp_quality
            )));
        }
        if c.decode_timeout_secs == Some(0) {
            return Err(ConvertError::InvalidConfig(
                "Decode timeout must be ≥ 1 second".into(),
            ));
        }
        if c.output_stem.is_empty() || c.output_stem.contains(['/', '\\']) {
            return Err(ConvertError::InvalidConfig(format!(
                "Output stem must be a plain file name, got {:?}",
                c.output_stem
            )));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = ConversionConfig::default();
        assert_eq!(c.output_stem, "img");
        assert_eq!(c.decode_timeout_secs, None);
        assert_eq!(c.encode, EncodeSettings::default());
        assert_eq!(c.resolve_codec().name(), "native");
    }

    #[test]
    fn builder_rejects_out_of_range_quality() {
        assert!(ConversionConfig::builder().jpeg_quality(0).build().is_err());
        assert!(ConversionConfig::builder().jpeg_quality(101).build().is_err());
        assert!(ConversionConfig::builder().webp_quality(-1.0).build().is_err());
        assert!(ConversionConfig::builder().webp_quality(100.0).build().is_ok());
    }

    #[test]
    fn builder_rejects_bad_stem_and_timeout() {
        assert!(ConversionConfig::builder().output_stem("").build().is_err());
        assert!(ConversionConfig::builder().output_stem("a/b").build().is_err());
        assert!(ConversionConfig::builder().decode_timeout_secs(0).build().is_err());
    }

    #[test]
    fn debug_hides_trait_objects() {
        let c = ConversionConfig::builder()
            .codec(Arc::new(NativeCodec))
            .build()
            .unwrap();
        let s = format!("{c:?}");
        assert!(s.contains("native"), "got: {s}");
    }
}
