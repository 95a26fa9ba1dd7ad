/// Shared data structures for the application state
///
/// These structs represent the data model that flows between
/// the file loader, the OCR engine and the UI layer.

use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SelectionError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{0} is not a supported image file")]
    NotAnImage(String),
    #[error("Task join error: {0}")]
    Join(String),
}

/// A picked image file: name, MIME type and the raw bytes
///
/// The bytes are shared, so cloning an `ImageFile` for a background job is cheap.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageFile {
    /// Filename only (e.g., "receipt.png")
    pub name: String,
    /// MIME type, always starting with "image/"
    pub mime: String,
    /// File contents
    pub bytes: Arc<Vec<u8>>,
}

impl ImageFile {
    /// Build an image file from memory, checking the MIME type
    pub fn new(
        name: impl Into<String>,
        mime: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Result<Self, SelectionError> {
        let name = name.into();
        let mime = mime.into();

        if !mime.starts_with("image/") {
            return Err(SelectionError::NotAnImage(name));
        }

        Ok(Self {
            name,
            mime,
            bytes: Arc::new(bytes),
        })
    }

    /// Load an image file from disk without blocking the UI
    pub async fn load(path: std::path::PathBuf) -> Result<Self, SelectionError> {
        tokio::task::spawn_blocking(move || Self::load_blocking(&path))
            .await
            .map_err(|e| SelectionError::Join(e.to_string()))?
    }

    /// Blocking version of [`ImageFile::load`]
    pub fn load_blocking(path: &Path) -> Result<Self, SelectionError> {
        let name = path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();

        // Same job as the file picker's type filter: decide by extension
        let mime = mime_for_path(path).ok_or_else(|| SelectionError::NotAnImage(name.clone()))?;

        let bytes = std::fs::read(path).map_err(|source| SelectionError::Io {
            path: path.display().to_string(),
            source,
        })?;

        if bytes.is_empty() {
            return Err(SelectionError::NotAnImage(name));
        }

        log::info!("📂 Read {} ({}, {}KB)", name, mime, bytes.len() / 1024);

        Self::new(name, mime, bytes)
    }

    /// Size of the payload in bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }
}

/// MIME type for an image path, or `None` if the extension isn't an image format
pub fn mime_for_path(path: &Path) -> Option<&'static str> {
    let format = image::ImageFormat::from_path(path).ok()?;
    let mime = format.to_mime_type();
    mime.starts_with("image/").then_some(mime)
}

/// Extensions offered by the file picker
pub const IMAGE_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "bmp", "tif", "tiff", "webp", "pnm", "pbm", "pgm", "ppm",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_non_image_mime() {
        let result = ImageFile::new("notes.txt", "text/plain", b"hello".to_vec());
        assert!(matches!(result, Err(SelectionError::NotAnImage(name)) if name == "notes.txt"));
    }

    #[test]
    fn test_mime_for_path() {
        assert_eq!(mime_for_path(Path::new("receipt.png")), Some("image/png"));
        assert_eq!(mime_for_path(Path::new("scan.JPG")), Some("image/jpeg"));
        assert_eq!(mime_for_path(Path::new("notes.txt")), None);
        assert_eq!(mime_for_path(Path::new("no_extension")), None);
    }

    #[test]
    fn test_load_blocking_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("receipt.png");
        std::fs::write(&path, [1u8, 2, 3, 4]).unwrap();

        let file = ImageFile::load_blocking(&path).unwrap();
        assert_eq!(file.name, "receipt.png");
        assert_eq!(file.mime, "image/png");
        assert_eq!(file.len(), 4);
    }

    #[test]
    fn test_load_blocking_rejects_text_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "hello").unwrap();

        assert!(matches!(
            ImageFile::load_blocking(&path),
            Err(SelectionError::NotAnImage(_))
        ));
    }

    #[test]
    fn test_load_blocking_rejects_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.png");
        std::fs::write(&path, b"").unwrap();

        assert!(matches!(
            ImageFile::load_blocking(&path),
            Err(SelectionError::NotAnImage(_))
        ));
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let result = ImageFile::load("/nonexistent/path.png".into()).await;
        assert!(matches!(result, Err(SelectionError::Io { .. })));
    }
}
