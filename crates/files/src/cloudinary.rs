//! Cloudinary adapter for [`MediaStore`].
//!
//! Talks to the signed REST upload API directly:
//!
//! - `POST {base}/v1_1/{cloud}/image/upload` (multipart, file + signed params)
//! - `POST {base}/v1_1/{cloud}/image/destroy` (form, signed `public_id`)
//!
//! Signing: every parameter except `file`, `api_key`, `resource_type`, `cloud_name` and
//! `signature_algorithm` is sorted by name, joined as `k=v&k=v`, the API secret appended, and
//! the result hashed with SHA-256.

use crate::constants::DEFAULT_CLOUDINARY_API_BASE;
use crate::store::{MediaStore, MediaUpload, StoredMedia};
use crate::FilesError;
use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fmt;

/// Credentials and endpoint for the media store, resolved once at startup.
#[derive(Clone)]
pub struct MediaStoreConfig {
    cloud_name: String,
    api_key: String,
    api_secret: String,
    api_base: String,
}

impl MediaStoreConfig {
    /// # Errors
    ///
    /// Returns `FilesError::InvalidConfig` if any credential is blank.
    pub fn new(
        cloud_name: impl Into<String>,
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
    ) -> Result<Self, FilesError> {
        let cfg = Self {
            cloud_name: cloud_name.into().trim().to_string(),
            api_key: api_key.into().trim().to_string(),
            api_secret: api_secret.into().trim().to_string(),
            api_base: DEFAULT_CLOUDINARY_API_BASE.to_string(),
        };

        for (name, value) in [
            ("cloud name", &cfg.cloud_name),
            ("api key", &cfg.api_key),
            ("api secret", &cfg.api_secret),
        ] {
            if value.is_empty() {
                return Err(FilesError::InvalidConfig(format!("{} cannot be empty", name)));
            }
        }

        Ok(cfg)
    }

    /// Overrides the API base URL (self-hosted proxies, test doubles).
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    pub fn cloud_name(&self) -> &str {
        &self.cloud_name
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    fn endpoint(&self, action: &str) -> String {
        format!(
            "{}/v1_1/{}/image/{}",
            self.api_base, self.cloud_name, action
        )
    }
}

impl fmt::Debug for MediaStoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MediaStoreConfig")
            .field("cloud_name", &self.cloud_name)
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .field("api_base", &self.api_base)
            .finish()
    }
}

/// Signs request parameters with the account secret.
fn sign(params: &BTreeMap<&str, String>, api_secret: &str) -> String {
    let to_sign = params
        .iter()
        .filter(|(_, v)| !v.is_empty())
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha256::new();
    hasher.update(to_sign.as_bytes());
    hasher.update(api_secret.as_bytes());
    hex::encode(hasher.finalize())
}

#[derive(serde::Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(serde::Deserialize)]
struct ErrorDetail {
    message: String,
}

#[derive(serde::Deserialize)]
struct DestroyBody {
    result: String,
}

/// [`MediaStore`] backed by Cloudinary.
#[derive(Debug, Clone)]
pub struct CloudinaryStore {
    cfg: MediaStoreConfig,
    client: reqwest::Client,
}

impl CloudinaryStore {
    /// # Errors
    ///
    /// Returns `FilesError::Http` if the HTTP client cannot be built.
    pub fn new(cfg: MediaStoreConfig) -> Result<Self, FilesError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("carepoint/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { cfg, client })
    }

    fn signed_params(&self, mut params: BTreeMap<&'static str, String>) -> Vec<(String, String)> {
        params.insert("timestamp", chrono::Utc::now().timestamp().to_string());
        let signature = sign(&params, &self.cfg.api_secret);

        let mut fields: Vec<(String, String)> = params
            .into_iter()
            .filter(|(_, v)| !v.is_empty())
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        fields.push(("api_key".into(), self.cfg.api_key.clone()));
        fields.push(("signature".into(), signature));
        fields.push(("signature_algorithm".into(), "sha256".into()));
        fields
    }

    async fn error_from(response: reqwest::Response) -> FilesError {
        let status = response.status().as_u16();
        let message = match response.json::<ErrorBody>().await {
            Ok(body) => body.error.message,
            Err(e) => format!("unreadable error body: {}", e),
        };
        FilesError::MediaStoreRejected { status, message }
    }
}

#[async_trait]
impl MediaStore for CloudinaryStore {
    async fn upload(&self, upload: MediaUpload) -> Result<StoredMedia, FilesError> {
        let mut params = BTreeMap::new();
        params.insert("folder", upload.folder);
        params.insert("public_id", upload.public_id);
        params.insert("transformation", upload.transformation.unwrap_or_default());

        let file_part = reqwest::multipart::Part::bytes(upload.bytes)
            .file_name(upload.file_name)
            .mime_str(&upload.content_type)?;

        let form = self
            .signed_params(params)
            .into_iter()
            .fold(reqwest::multipart::Form::new(), |form, (k, v)| form.text(k, v))
            .part("file", file_part);

        let response = self
            .client
            .post(self.cfg.endpoint("upload"))
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }

        response
            .json::<StoredMedia>()
            .await
            .map_err(|e| FilesError::UnexpectedResponse(e.to_string()))
    }

    async fn destroy(&self, public_id: &str) -> Result<(), FilesError> {
        let mut params = BTreeMap::new();
        params.insert("public_id", public_id.to_string());

        let response = self
            .client
            .post(self.cfg.endpoint("destroy"))
            .form(&self.signed_params(params))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }

        let body = response
            .json::<DestroyBody>()
            .await
            .map_err(|e| FilesError::UnexpectedResponse(e.to_string()))?;

        if body.result == "ok" {
            Ok(())
        } else {
            Err(FilesError::UnexpectedResponse(format!(
                "destroy of {} returned '{}'",
                public_id, body.result
            )))
        }
    }
}
