//! Encoding: `RasterSurface` → target-format bytes via the configured codec.
//!
//! Like `canvas.toBlob`, an encoder that "succeeds" with nothing to show is
//! still a failure: an empty buffer is reported as
//! [`ConvertError::EmptyOutput`] rather than downloaded as a 0-byte file.

use crate::codec::{EncodeSettings, ImageCodec};
use crate::error::ConvertError;
use crate::format::TargetFormat;
use crate::pipeline::raster::RasterSurface;
use std::sync::Arc;
use tracing::debug;

/// Encode `surface` on the blocking pool.
pub async fn encode(
    codec: Arc<dyn ImageCodec>,
    surface: RasterSurface,
    format: TargetFormat,
    settings: EncodeSettings,
) -> Result<Vec<u8>, ConvertError> {
    let bytes = tokio::task::spawn_blocking(move || codec.encode(&surface, format, &settings))
        .await
        .map_err(|e| ConvertError::Internal(format!("Encode task panicked: {}", e)))?
        .map_err(|e| ConvertError::EncodeFailed {
            format: format.to_string(),
            detail: e.to_string(),
        })?;

    if bytes.is_empty() {
        return Err(ConvertError::EmptyOutput {
            format: format.to_string(),
        });
    }

    debug!("Encoded {} → {} bytes", format, bytes.len());
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{CodecError, NativeCodec};
    use image::{DynamicImage, Rgba, RgbaImage};

    struct SilentCodec;

    impl ImageCodec for SilentCodec {
        fn decode(&self, _bytes: &[u8]) -> Result<DynamicImage, CodecError> {
            Err(CodecError::Other("unused".into()))
        }

        fn encode(
            &self,
            _surface: &RasterSurface,
            _format: TargetFormat,
            _settings: &EncodeSettings,
        ) -> Result<Vec<u8>, CodecError> {
            Ok(Vec::new())
        }
    }

    fn surface() -> RasterSurface {
        RasterSurface::from_rgba(RgbaImage::from_pixel(8, 8, Rgba([0, 128, 255, 255])))
    }

    #[tokio::test]
    async fn empty_output_is_an_error() {
        let err = encode(
            Arc::new(SilentCodec),
            surface(),
            TargetFormat::Png,
            EncodeSettings::default(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ConvertError::EmptyOutput { ref format } if format == "png"));
    }

    #[tokio::test]
    async fn jpeg_output_has_jpeg_magic() {
        let bytes = encode(
            Arc::new(NativeCodec),
            surface(),
            TargetFormat::Jpeg,
            EncodeSettings::default(),
        )
        .await
        .unwrap();
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
    }
}
