//! Delivery: hand the encoded bytes to the user as a download.
//!
//! In a browser this is an object URL plus a throwaway `<a download>`
//! element. Here a [`Download`] is either written into a directory
//! (temp file, then rename; a half-written `img.webp` is never visible)
//! or rendered as a `data:` URL.

use crate::error::ConvertError;
use crate::format::TargetFormat;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// The artifact produced by one successful conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Download {
    /// Always `<stem>.<format>`; the source file name is discarded.
    pub file_name: String,
    pub format: TargetFormat,
    /// Natural pixel dimensions, identical to the source image.
    pub dimensions: (u32, u32),
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

impl Download {
    pub fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// `data:<mime>;base64,<payload>` for embedding or clipboard use.
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type(), STANDARD.encode(&self.bytes))
    }
}

/// Write `download` into `dir` under its file name, replacing any previous
/// file of the same name. Returns the final path.
pub async fn deliver_to_dir(download: &Download, dir: &Path) -> Result<PathBuf, ConvertError> {
    let path = dir.join(&download.file_name);
    let write_err = |source: std::io::Error| ConvertError::OutputWriteFailed {
        path: path.clone(),
        source,
    };

    tokio::fs::create_dir_all(dir).await.map_err(write_err)?;

    let tmp_path = dir.join(format!(".{}.part", download.file_name));
    tokio::fs::write(&tmp_path, &download.bytes)
        .await
        .map_err(write_err)?;
    debug!("Wrote {} bytes to {}", download.len(), tmp_path.display());

    if let Err(e) = tokio::fs::rename(&tmp_path, &path).await {
        let _ = tokio::fs::remove_file(&tmp_path).await;
        return Err(write_err(e));
    }

    info!("Downloaded {}", path.display());
    Ok(path)
}
