//! Input: the user's file selection and loading its bytes.
//!
//! A selected file carries a *declared* MIME type, which is what the file
//! picker reports and what the controller validates. For files on disk it is
//! derived from the extension, never from the content: a mislabelled file
//! passes selection and only fails later, when the codec rejects it.

use crate::error::ConvertError;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// MIME type declared for extensions no image format claims.
pub const UNKNOWN_MIME: &str = "application/octet-stream";

/// Where a selected file's bytes come from.
#[derive(Clone)]
pub enum FileSource {
    /// A file on disk, read when the conversion starts.
    Path(PathBuf),
    /// Bytes already in memory (uploads, clipboard, tests).
    Memory(Arc<[u8]>),
}

impl fmt::Debug for FileSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileSource::Path(path) => f.debug_tuple("Path").field(path).finish(),
            FileSource::Memory(bytes) => f
                .debug_tuple("Memory")
                .field(&format_args!("<{} bytes>", bytes.len()))
                .finish(),
        }
    }
}

/// An opaque handle to a user-chosen file.
#[derive(Debug, Clone)]
pub struct SelectedFile {
    name: String,
    mime: String,
    source: FileSource,
}

impl SelectedFile {
    /// Select a file on disk; the declared MIME type comes from its extension.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mime = declared_mime(&path);
        Self::from_path_with_mime(path, mime)
    }

    /// Select a file on disk with an explicitly declared MIME type.
    pub fn from_path_with_mime(path: impl Into<PathBuf>, mime: impl Into<String>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self {
            name,
            mime: mime.into(),
            source: FileSource::Path(path),
        }
    }

    /// Select in-memory bytes under a display name and declared MIME type.
    pub fn from_bytes(
        name: impl Into<String>,
        mime: impl Into<String>,
        bytes: impl Into<Arc<[u8]>>,
    ) -> Self {
        Self {
            name: name.into(),
            mime: mime.into(),
            source: FileSource::Memory(bytes.into()),
        }
    }

    /// Display name shown in the file-picker affordance.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared MIME type.
    pub fn mime(&self) -> &str {
        &self.mime
    }

    pub fn source(&self) -> &FileSource {
        &self.source
    }

    /// `true` when the declared MIME type starts with `image/`.
    pub fn is_image(&self) -> bool {
        self.mime.starts_with("image/")
    }
}

/// Derive the declared MIME type of a path from its extension.
pub fn declared_mime(path: &Path) -> String {
    path.extension()
        .and_then(image::ImageFormat::from_extension)
        .map(|f| f.to_mime_type().to_string())
        .unwrap_or_else(|| UNKNOWN_MIME.to_string())
}

/// Load the file's bytes into memory.
pub async fn load_bytes(file: &SelectedFile) -> Result<Arc<[u8]>, ConvertError> {
    match &file.source {
        FileSource::Memory(bytes) => Ok(Arc::clone(bytes)),
        FileSource::Path(path) => {
            let bytes = tokio::fs::read(path).await.map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => ConvertError::FileNotFound { path: path.clone() },
                std::io::ErrorKind::PermissionDenied => {
                    ConvertError::PermissionDenied { path: path.clone() }
                }
                _ => ConvertError::LoadFailed {
                    path: path.clone(),
                    source: e,
                },
            })?;
            debug!("Loaded {} bytes from {}", bytes.len(), path.display());
            Ok(Arc::from(bytes))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declared_mime_follows_extension() {
        assert_eq!(declared_mime(Path::new("a/photo.png")), "image/png");
        assert_eq!(declared_mime(Path::new("photo.JPG")), "image/jpeg");
        assert_eq!(declared_mime(Path::new("photo.webp")), "image/webp");
        assert_eq!(declared_mime(Path::new("notes.txt")), UNKNOWN_MIME);
        assert_eq!(declared_mime(Path::new("no_extension")), UNKNOWN_MIME);
    }

    #[test]
    fn name_is_file_name_only() {
        let f = SelectedFile::from_path("/tmp/some/dir/cat.gif");
        assert_eq!(f.name(), "cat.gif");
        assert_eq!(f.mime(), "image/gif");
        assert!(f.is_image());
    }

    #[test]
    fn is_image_checks_prefix_only() {
        assert!(SelectedFile::from_bytes("x", "image/anything", Vec::<u8>::new()).is_image());
        assert!(!SelectedFile::from_bytes("x", "application/pdf", Vec::<u8>::new()).is_image());
        assert!(!SelectedFile::from_bytes("x", "", Vec::<u8>::new()).is_image());
        // prefix match is case-sensitive, as the picker reports lowercase types
        assert!(!SelectedFile::from_bytes("x", "IMAGE/PNG", Vec::<u8>::new()).is_image());
    }

    #[test]
    fn debug_shows_length_not_bytes() {
        let f = SelectedFile::from_bytes("a.png", "image/png", vec![0xABu8; 4096]);
        let s = format!("{f:?}");
        assert!(s.contains("<4096 bytes>"), "got: {s}");
        assert!(!s.contains("171"), "got: {s}");
    }

    #[tokio::test]
    async fn load_missing_file() {
        let f = SelectedFile::from_path("/definitely/not/here.png");
        assert!(matches!(
            load_bytes(&f).await,
            Err(ConvertError::FileNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn load_memory_shares_bytes() {
        let f = SelectedFile::from_bytes("a.png", "image/png", vec![1u8, 2, 3]);
        let bytes = load_bytes(&f).await.unwrap();
        assert_eq!(&*bytes, &[1, 2, 3]);
    }
}
