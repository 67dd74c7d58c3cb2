//! Upload limits, allow-lists and fixed names.

/// MIME types accepted for profile images.
pub const IMAGE_MIME_TYPES: &[&str] = &["image/png", "image/jpg", "image/jpeg"];

/// MIME types accepted for symptom recordings.
pub const AUDIO_MIME_TYPES: &[&str] = &[
    "audio/mpeg",
    "audio/mp3",
    "audio/wav",
    "audio/x-wav",
    "audio/aiff",
    "audio/x-aiff",
    "audio/aac",
    "audio/x-aac",
    "audio/ogg",
    "audio/flac",
    "audio/x-flac",
    "audio/mp4",
    "audio/x-m4a",
];

/// Size ceiling for any uploaded part (5 MiB).
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Every audio upload is written under this name, replacing the previous one.
pub const AUDIO_FILE_NAME: &str = "symptoms";

/// Incoming transformation applied to hosted images: fit within 400x400, centred.
pub const IMAGE_TRANSFORMATION: &str = "c_limit,g_center,h_400,w_400";

pub const DEFAULT_CLOUDINARY_API_BASE: &str = "https://api.cloudinary.com";
