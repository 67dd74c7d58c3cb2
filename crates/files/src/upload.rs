//! Applying an [`UploadPolicy`] to an incoming file part.

use crate::policy::{Destination, UploadKind, UploadPolicy};
use crate::store::{LocalDiskStore, MediaStore, MediaUpload};
use crate::FilesError;
use chrono::Utc;
use std::sync::Arc;
use tokio::task::JoinHandle;

const FALLBACK_FILENAME: &str = "upload";

/// A file part as received from the client, fully buffered.
#[derive(Debug, Clone)]
pub struct IncomingFile {
    /// Filename the client supplied, if any.
    pub original_filename: Option<String>,
    /// Declared `Content-Type` of the part, if any.
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl IncomingFile {
    /// Declared type, or a best-effort guess from the leading bytes when none was declared.
    pub fn resolved_content_type(&self) -> Option<String> {
        self.content_type
            .as_deref()
            .map(str::trim)
            .filter(|ct| !ct.is_empty())
            .map(str::to_string)
            .or_else(|| infer::get(&self.bytes).map(|kind| kind.mime_type().to_string()))
    }
}

/// Outcome of a successful ingest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredUpload {
    pub kind: UploadKind,
    /// URL (media store) or filesystem path (local disk) the file is served from.
    pub path: String,
    /// Media-store handle for later deletion; `None` for local files.
    pub public_id: Option<String>,
    pub original_filename: String,
    pub content_type: String,
    pub size_bytes: u64,
}

/// Applies upload policies and hands accepted files to their destination.
#[derive(Clone)]
pub struct Uploader {
    media_store: Arc<dyn MediaStore>,
}

impl Uploader {
    pub fn new(media_store: Arc<dyn MediaStore>) -> Self {
        Self { media_store }
    }

    pub fn media_store(&self) -> Arc<dyn MediaStore> {
        Arc::clone(&self.media_store)
    }

    /// Ingests one file part under `policy`.
    ///
    /// Returns `Ok(None)` when the part's type is not on the allow-list; nothing is stored and
    /// no remote call is made.
    ///
    /// # Errors
    ///
    /// Returns `FilesError::TooLarge` when the part exceeds the policy ceiling (checked before
    /// the type filter), or the destination's error when storing fails.
    pub async fn ingest(
        &self,
        policy: &UploadPolicy,
        file: IncomingFile,
    ) -> Result<Option<StoredUpload>, FilesError> {
        if file.bytes.len() > policy.max_bytes() {
            return Err(FilesError::TooLarge {
                limit: policy.max_bytes(),
            });
        }

        let Some(content_type) = file
            .resolved_content_type()
            .filter(|ct| policy.accepts(ct))
        else {
            tracing::debug!(
                filename = ?file.original_filename,
                content_type = ?file.content_type,
                "dropping upload with unsupported type"
            );
            return Ok(None);
        };

        let original_filename = file
            .original_filename
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(FALLBACK_FILENAME)
            .to_string();

        let object_key = policy.object_key(&original_filename, Utc::now());
        let size_bytes = file.bytes.len() as u64;

        let (path, public_id) = match policy.destination() {
            Destination::MediaStore { folder } => {
                let stored = self
                    .media_store
                    .upload(MediaUpload {
                        folder: folder.clone(),
                        public_id: object_key,
                        transformation: policy.transformation().map(str::to_string),
                        file_name: original_filename.clone(),
                        content_type: content_type.clone(),
                        bytes: file.bytes,
                    })
                    .await?;
                (stored.secure_url, Some(stored.public_id))
            }
            Destination::LocalDisk { dir } => {
                let path = LocalDiskStore::new(dir)
                    .write(&object_key, &file.bytes)
                    .await?;
                (path.display().to_string(), None)
            }
        };

        tracing::info!(
            kind = ?policy.kind(),
            path = %path,
            size = size_bytes,
            "upload stored"
        );

        Ok(Some(StoredUpload {
            kind: policy.kind(),
            path,
            public_id,
            original_filename,
            content_type,
            size_bytes,
        }))
    }
}

/// Best-effort removal of a hosted object.
///
/// The delete runs on a detached task. Failure is logged and otherwise ignored, so callers
/// observe the same thing whether the remote delete succeeded or not. The returned handle
/// exists for callers that want to wait (tests, shutdown); dropping it is fine.
pub fn delete_upload(store: Arc<dyn MediaStore>, public_id: impl Into<String>) -> JoinHandle<()> {
    let public_id = public_id.into();
    tokio::spawn(async move {
        match store.destroy(&public_id).await {
            Ok(()) => tracing::info!(public_id = %public_id, "image deleted from media store"),
            Err(e) => tracing::error!(
                public_id = %public_id,
                "failed to delete image from media store: {}",
                e
            ),
        }
    })
}
