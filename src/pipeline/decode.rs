//! Decoding: encoded bytes → `DynamicImage` via the configured codec.
//!
//! Decoding is CPU-bound, so it runs on tokio's blocking pool. The join
//! handle is the completion signal: the caller awaits it, which guarantees
//! rasterization never starts before the decode finished.

use crate::codec::ImageCodec;
use crate::error::ConvertError;
use image::{DynamicImage, GenericImageView};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Decode `bytes` on the blocking pool, optionally bounded by a timeout.
pub async fn decode(
    codec: Arc<dyn ImageCodec>,
    name: &str,
    bytes: Arc<[u8]>,
    timeout_secs: Option<u64>,
) -> Result<DynamicImage, ConvertError> {
    let handle = tokio::task::spawn_blocking(move || codec.decode(&bytes));

    let joined = match timeout_secs {
        Some(secs) => tokio::time::timeout(Duration::from_secs(secs), handle)
            .await
            .map_err(|_| ConvertError::DecodeTimeout {
                name: name.to_string(),
                secs,
            })?,
        None => handle.await,
    };

    let image = joined
        .map_err(|e| ConvertError::Internal(format!("Decode task panicked: {}", e)))?
        .map_err(|e| ConvertError::DecodeFailed {
            name: name.to_string(),
            detail: e.to_string(),
        })?;

    let (width, height) = image.dimensions();
    debug!("Decoded '{}' → {}x{} px ({:?})", name, width, height, image.color());
    Ok(image)
}
