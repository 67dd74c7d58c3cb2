//! Storage backends for accepted uploads.

use crate::FilesError;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// A single file handed to the media store.
#[derive(Debug, Clone)]
pub struct MediaUpload {
    /// Remote folder the object is placed in.
    pub folder: String,
    /// Object key within the folder.
    pub public_id: String,
    /// Incoming transformation, in the store's own syntax.
    pub transformation: Option<String>,
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// What the media store reports back for a stored object.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
pub struct StoredMedia {
    /// Fully-qualified public id (folder included); the handle used for deletion.
    pub public_id: String,
    /// HTTPS URL the object is served from.
    pub secure_url: String,
}

/// External image host.
///
/// Implementations must be cheap to share behind an `Arc`; one instance serves every request.
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Uploads one object and returns where it is served from.
    async fn upload(&self, upload: MediaUpload) -> Result<StoredMedia, FilesError>;

    /// Removes the object identified by `public_id`.
    async fn destroy(&self, public_id: &str) -> Result<(), FilesError>;
}

/// Writes files into one local directory, replacing any existing file of the same name.
#[derive(Debug, Clone)]
pub struct LocalDiskStore {
    dir: PathBuf,
}

impl LocalDiskStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Writes `bytes` to `<dir>/<file_name>`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns `FilesError::Io` if the directory cannot be created or the file cannot be
    /// written.
    pub async fn write(&self, file_name: &str, bytes: &[u8]) -> Result<PathBuf, FilesError> {
        tokio::fs::create_dir_all(&self.dir).await.map_err(|e| {
            FilesError::Io(std::io::Error::new(
                e.kind(),
                format!(
                    "Failed to create upload directory {}: {}",
                    self.dir.display(),
                    e
                ),
            ))
        })?;

        let path = self.dir.join(file_name);
        tokio::fs::write(&path, bytes).await.map_err(|e| {
            FilesError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to write upload to {}: {}", path.display(), e),
            ))
        })?;

        Ok(path)
    }
}
