//! Carepoint upload ingestion
//!
//! This crate owns everything that happens to an uploaded file between the multipart parser
//! and the place its bytes end up:
//!
//! - [`UploadPolicy`] describes *what* is accepted for an upload slot (MIME allow-list, size
//!   ceiling) and *where* it goes (remote media store folder or local directory).
//! - [`Uploader`] applies a policy to one incoming file part.
//! - [`MediaStore`] is the seam to the external image host; [`CloudinaryStore`] is the
//!   production adapter.
//! - [`delete_upload`] is best-effort cleanup of hosted media.
//!
//! ## Filtering model
//!
//! A part whose MIME type is not on the policy's allow-list is dropped silently: the upload
//! resolves to `Ok(None)` and the request carries on as if no file were attached. Exceeding
//! the size ceiling is the only ingestion failure a client ever sees.
//!
//! ```text
//! image slot ──▶ media store  <folder>/<timestamp>-<original name>   (400x400 limit, centred)
//! audio slot ──▶ local disk   <audio dir>/symptoms                   (overwritten every time)
//! ```
//!
//! ## Example Usage
//!
//! ```no_run
//! use carepoint_files::{CloudinaryStore, MediaStoreConfig, UploadPolicy, Uploader};
//! use std::sync::Arc;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let cfg = MediaStoreConfig::new("demo", "123456", "secret")?;
//! let uploader = Uploader::new(Arc::new(CloudinaryStore::new(cfg)?));
//! let policy = UploadPolicy::image("gemini-folder");
//! # let _ = (uploader, policy);
//! # Ok(())
//! # }
//! ```

mod cloudinary;
mod constants;
mod policy;
mod store;
mod upload;

pub use cloudinary::{CloudinaryStore, MediaStoreConfig};
pub use constants::{
    AUDIO_FILE_NAME, AUDIO_MIME_TYPES, DEFAULT_CLOUDINARY_API_BASE, IMAGE_MIME_TYPES,
    IMAGE_TRANSFORMATION, MAX_UPLOAD_BYTES,
};
pub use policy::{Destination, UploadKind, UploadPolicy};
pub use store::{LocalDiskStore, MediaStore, MediaUpload, StoredMedia};
pub use upload::{delete_upload, IncomingFile, StoredUpload, Uploader};

/// Errors that can occur while ingesting or deleting uploads
#[derive(Debug, thiserror::Error)]
pub enum FilesError {
    /// The file part exceeded the policy's size ceiling
    #[error("File too large (max: {limit} bytes)")]
    TooLarge {
        /// Maximum allowed size in bytes
        limit: usize,
    },

    /// Media store credentials or endpoint are unusable
    #[error("Invalid media store configuration: {0}")]
    InvalidConfig(String),

    /// The media store answered with an error
    #[error("Media store rejected request ({status}): {message}")]
    MediaStoreRejected {
        /// HTTP status returned by the media store
        status: u16,
        /// Error message reported by the media store
        message: String,
    },

    /// The media store answered with something we could not interpret
    #[error("Unexpected media store response: {0}")]
    UnexpectedResponse(String),

    /// Transport-level failure talking to the media store
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// I/O error occurred
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
