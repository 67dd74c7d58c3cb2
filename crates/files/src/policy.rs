//! Upload policies: what an upload slot accepts and where accepted files go.

use crate::constants::{
    AUDIO_FILE_NAME, AUDIO_MIME_TYPES, IMAGE_MIME_TYPES, IMAGE_TRANSFORMATION, MAX_UPLOAD_BYTES,
};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

/// Kind of resource an upload slot produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    Image,
    Audio,
}

/// Where accepted bytes are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    /// A folder on the external media store.
    MediaStore { folder: String },
    /// A directory on local disk.
    LocalDisk { dir: PathBuf },
}

/// Upload configuration for one multipart file slot.
///
/// Built once per route by [`UploadPolicy::image`] or [`UploadPolicy::audio`] and shared
/// across requests; it carries no per-request state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadPolicy {
    kind: UploadKind,
    allowed_mime_types: &'static [&'static str],
    max_bytes: usize,
    destination: Destination,
}

impl UploadPolicy {
    /// Policy for profile images hosted on the media store under `folder`.
    ///
    /// Accepts PNG and JPEG up to [`MAX_UPLOAD_BYTES`]; object keys are
    /// `<timestamp>-<original filename>`.
    pub fn image(folder: impl Into<String>) -> Self {
        Self {
            kind: UploadKind::Image,
            allowed_mime_types: IMAGE_MIME_TYPES,
            max_bytes: MAX_UPLOAD_BYTES,
            destination: Destination::MediaStore {
                folder: folder.into(),
            },
        }
    }

    /// Policy for symptom recordings written to `dir`.
    ///
    /// Every accepted file is stored as `dir/symptoms`, so a later upload replaces an earlier
    /// one regardless of who sent it.
    pub fn audio(dir: impl Into<PathBuf>) -> Self {
        Self {
            kind: UploadKind::Audio,
            allowed_mime_types: AUDIO_MIME_TYPES,
            max_bytes: MAX_UPLOAD_BYTES,
            destination: Destination::LocalDisk { dir: dir.into() },
        }
    }

    pub fn kind(&self) -> UploadKind {
        self.kind
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    pub fn destination(&self) -> &Destination {
        &self.destination
    }

    pub fn allowed_mime_types(&self) -> &'static [&'static str] {
        self.allowed_mime_types
    }

    /// Transformation the media store applies on ingest, if any.
    pub fn transformation(&self) -> Option<&'static str> {
        match self.kind {
            UploadKind::Image => Some(IMAGE_TRANSFORMATION),
            UploadKind::Audio => None,
        }
    }

    /// Returns true if `mime_type` is on this policy's allow-list.
    ///
    /// Matching ignores case and any parameters after `;`.
    pub fn accepts(&self, mime_type: &str) -> bool {
        let essence = mime_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        self.allowed_mime_types.contains(&essence.as_str())
    }

    /// Object key for an accepted file.
    ///
    /// Images: ISO-8601 timestamp with `:` replaced by `-`, a dash, then the original
    /// filename verbatim. Audio: always [`AUDIO_FILE_NAME`].
    pub fn object_key(&self, original_filename: &str, now: DateTime<Utc>) -> String {
        match self.kind {
            UploadKind::Image => format!(
                "{}-{}",
                now.format("%Y-%m-%dT%H-%M-%S%.3fZ"),
                original_filename
            ),
            UploadKind::Audio => AUDIO_FILE_NAME.to_string(),
        }
    }

    /// Local path an audio upload lands on; `None` for media-store policies.
    pub fn local_path(&self, object_key: &str) -> Option<PathBuf> {
        match &self.destination {
            Destination::LocalDisk { dir } => Some(Path::new(dir).join(object_key)),
            Destination::MediaStore { .. } => None,
        }
    }
}
