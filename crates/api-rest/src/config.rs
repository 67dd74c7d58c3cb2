//! REST server configuration, resolved once from the environment at startup.

use carepoint_core::constants::DEFAULT_DATA_DIR;
use carepoint_files::MediaStoreConfig;
use std::path::PathBuf;

pub const DEFAULT_REST_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_AUDIO_DIR: &str = "../audio/";
pub const DEFAULT_UPLOAD_FOLDER: &str = "gemini-folder";

#[derive(Debug, Clone)]
pub struct RestConfig {
    pub addr: String,
    pub data_dir: PathBuf,
    pub audio_dir: PathBuf,
    pub upload_folder: String,
    pub media_store: MediaStoreConfig,
}

impl RestConfig {
    /// Reads `CARE_REST_ADDR`, `DATA_DIR`, `AUDIO_DIR`, `UPLOAD_FOLDER`, `CLOUD_NAME`,
    /// `CLOUD_API_KEY`, `CLOUD_API_SECRET` and `CLOUD_API_BASE`.
    ///
    /// # Errors
    ///
    /// Fails if any media-store credential is missing or blank.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`RestConfig::from_env`], reading values through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &str| get(key).ok_or_else(|| anyhow::anyhow!("{} must be set", key));

        let mut media_store = MediaStoreConfig::new(
            required("CLOUD_NAME")?,
            required("CLOUD_API_KEY")?,
            required("CLOUD_API_SECRET")?,
        )?;
        if let Some(base) = get("CLOUD_API_BASE") {
            media_store = media_store.with_api_base(base);
        }

        Ok(Self {
            addr: get("CARE_REST_ADDR").unwrap_or_else(|| DEFAULT_REST_ADDR.into()),
            data_dir: get("DATA_DIR")
                .unwrap_or_else(|| DEFAULT_DATA_DIR.into())
                .into(),
            audio_dir: get("AUDIO_DIR")
                .unwrap_or_else(|| DEFAULT_AUDIO_DIR.into())
                .into(),
            upload_folder: get("UPLOAD_FOLDER").unwrap_or_else(|| DEFAULT_UPLOAD_FOLDER.into()),
            media_store,
        })
    }
}
