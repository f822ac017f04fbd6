//! Persistence of captured edge images.

use crate::detector::{Bitmap, Surface};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;

/// Errors raised while persisting a capture.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem failure.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    /// PNG encoding failed.
    #[error("failed to encode image: {0}")]
    Encode(#[from] image::ImageError),
    /// The metadata sidecar could not be serialized.
    #[error("failed to write capture metadata: {0}")]
    Metadata(String),
    /// The store cannot write the requested mime type.
    #[error("unsupported mime type: {0}")]
    UnsupportedFormat(String),
    /// The backing store is not reachable.
    #[error("image store unavailable: {0}")]
    Unavailable(String),
}

/// Descriptive fields attached to every capture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureMetadata {
    /// Display title, also used to name files.
    pub title: String,
    /// Free-form description.
    pub description: String,
    /// Encoding requested from the store.
    pub mime_type: String,
}

impl Default for CaptureMetadata {
    fn default() -> Self {
        Self {
            title: "Edge Finder Capture".to_string(),
            description: "Edge Finder Capture".to_string(),
            mime_type: "image/png".to_string(),
        }
    }
}

/// Somewhere completed captures can be handed off to.
pub trait ImageStore: Send + Sync {
    /// Persists `bitmap`, returning a human-readable location.
    fn save(&self, bitmap: &Bitmap, metadata: &CaptureMetadata) -> Result<String, StoreError>;
}

/// Sidecar written next to each PNG.
#[derive(Debug, Serialize, Deserialize)]
struct CaptureRecord {
    title: String,
    description: String,
    mime_type: String,
    width: u32,
    height: u32,
    captured_at: DateTime<Utc>,
}

/// Writes captures as timestamped PNG files into a directory, each with a
/// `.toml` sidecar carrying its metadata.
#[derive(Debug)]
pub struct PngDirectoryStore {
    directory: PathBuf,
    saved: AtomicU64,
}

impl PngDirectoryStore {
    /// Creates a store rooted at `directory`. The directory is created on
    /// first save.
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            saved: AtomicU64::new(0),
        }
    }

    /// Target directory.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn file_stem(title: &str, captured_at: &DateTime<Utc>, index: u64) -> String {
        let slug: String = title
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
            .collect();
        let slug = slug.trim_matches('-');
        let slug = if slug.is_empty() { "capture" } else { slug };
        format!("{}-{}-{:04}", slug, captured_at.format("%Y%m%d-%H%M%S%.3f"), index)
    }
}

impl ImageStore for PngDirectoryStore {
    fn save(&self, bitmap: &Bitmap, metadata: &CaptureMetadata) -> Result<String, StoreError> {
        if metadata.mime_type != "image/png" {
            return Err(StoreError::UnsupportedFormat(metadata.mime_type.clone()));
        }

        std::fs::create_dir_all(&self.directory)?;

        let captured_at = Utc::now();
        let index = self.saved.fetch_add(1, Ordering::Relaxed);
        let stem = Self::file_stem(&metadata.title, &captured_at, index);
        let png_path = self.directory.join(format!("{stem}.png"));

        bitmap
            .image()
            .save_with_format(&png_path, image::ImageFormat::Png)?;

        let record = CaptureRecord {
            title: metadata.title.clone(),
            description: metadata.description.clone(),
            mime_type: metadata.mime_type.clone(),
            width: bitmap.width(),
            height: bitmap.height(),
            captured_at,
        };
        let sidecar =
            toml::to_string(&record).map_err(|e| StoreError::Metadata(e.to_string()))?;
        std::fs::write(self.directory.join(format!("{stem}.toml")), sidecar)?;

        tracing::debug!(path = %png_path.display(), "capture written");
        Ok(png_path.display().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detector::EDGE_COLOR;

    #[test]
    fn test_png_round_trip_with_sidecar() {
        let dir = tempfile::tempdir().unwrap();
        let store = PngDirectoryStore::new(dir.path().join("nested"));

        let mut bitmap = Bitmap::new(3, 2);
        bitmap.plot(1, 0, EDGE_COLOR);

        let location = store.save(&bitmap, &CaptureMetadata::default()).unwrap();
        assert!(location.ends_with(".png"));

        let decoded = image::open(&location).unwrap().to_rgb8();
        assert_eq!(decoded.dimensions(), (3, 2));
        assert_eq!(*decoded.get_pixel(1, 0), EDGE_COLOR);

        let sidecar = std::fs::read_to_string(location.replace(".png", ".toml")).unwrap();
        let record: CaptureRecord = toml::from_str(&sidecar).unwrap();
        assert_eq!(record.title, "Edge Finder Capture");
        assert_eq!(record.mime_type, "image/png");
        assert_eq!((record.width, record.height), (3, 2));
    }

    #[test]
    fn test_file_names_are_unique() {
        let dir = tempfile::tempdir().unwrap();
        let store = PngDirectoryStore::new(dir.path());
        let bitmap = Bitmap::new(1, 1);

        let first = store.save(&bitmap, &CaptureMetadata::default()).unwrap();
        let second = store.save(&bitmap, &CaptureMetadata::default()).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_non_png_mime_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = PngDirectoryStore::new(dir.path());
        let metadata = CaptureMetadata {
            mime_type: "image/jpeg".to_string(),
            ..Default::default()
        };

        assert!(matches!(
            store.save(&Bitmap::new(1, 1), &metadata),
            Err(StoreError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_file_stem_slug() {
        let at = Utc::now();
        let stem = PngDirectoryStore::file_stem("Edge Finder Capture", &at, 3);
        assert!(stem.starts_with("edge-finder-capture-"));
        assert!(stem.ends_with("-0003"));
        assert!(PngDirectoryStore::file_stem("!!", &at, 0).starts_with("capture-"));
    }

    #[test]
    fn test_unwritable_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, b"not a directory").unwrap();
        let store = PngDirectoryStore::new(blocker.join("captures"));

        assert!(matches!(
            store.save(&Bitmap::new(1, 1), &CaptureMetadata::default()),
            Err(StoreError::Io(_))
        ));
    }
}
