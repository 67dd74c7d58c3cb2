//! Reading form bodies that carry at most one file slot.
//!
//! Upload routes take `multipart/form-data`, but also accept the same text fields as JSON or
//! `application/x-www-form-urlencoded`, in which case no file is attached.

use crate::error::ApiError;
use axum::extract::{FromRequest, Multipart, Request};
use axum::http::header::CONTENT_TYPE;
use axum::{Form, Json};
use carepoint_files::IncomingFile;
use serde_json::Value;
use std::collections::HashMap;

/// Text fields plus the single file part, if one was sent.
#[derive(Debug, Default)]
pub(crate) struct UploadForm {
    fields: HashMap<String, String>,
    pub file: Option<IncomingFile>,
}

impl UploadForm {
    /// Value of a text field, or `""` when absent.
    pub fn text(&self, name: &str) -> &str {
        self.fields.get(name).map(String::as_str).unwrap_or_default()
    }
}

/// Reads `req` as an upload form, whatever its content type.
///
/// Multipart bodies go through [`read_upload_form`]. JSON objects and urlencoded bodies supply
/// text fields only; non-string JSON values are kept in their JSON rendering. Any other
/// content type yields an empty form and leaves the validators to report missing fields.
pub(crate) async fn read_request_form<S>(
    req: Request,
    state: &S,
    file_field: &str,
    max_bytes: usize,
) -> Result<UploadForm, ApiError>
where
    S: Send + Sync,
{
    let content_type = req
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_ascii_lowercase();

    if content_type.starts_with("multipart/form-data") {
        let multipart = Multipart::from_request(req, state).await?;
        return read_upload_form(multipart, file_field, max_bytes).await;
    }

    let fields = if content_type.starts_with("application/json") {
        let Json(body) = Json::<HashMap<String, Value>>::from_request(req, state).await?;
        body.into_iter()
            .map(|(name, value)| {
                let text = match value {
                    Value::String(text) => text,
                    Value::Null => String::new(),
                    other => other.to_string(),
                };
                (name, text)
            })
            .collect()
    } else if content_type.starts_with("application/x-www-form-urlencoded") {
        let Form(body) = Form::<HashMap<String, String>>::from_request(req, state).await?;
        body
    } else {
        tracing::debug!(content_type = %content_type, "no form body to read");
        HashMap::new()
    };

    Ok(UploadForm { fields, file: None })
}

/// Buffers `multipart`, keeping the first part named `file_field` as the file.
///
/// The file is read chunk by chunk and rejected with 413 as soon as it passes `max_bytes`.
/// Later parts with the same name and parts with other file names are discarded.
pub(crate) async fn read_upload_form(
    mut multipart: Multipart,
    file_field: &str,
    max_bytes: usize,
) -> Result<UploadForm, ApiError> {
    let mut form = UploadForm::default();

    while let Some(mut field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();

        if name == file_field && form.file.is_none() {
            let original_filename = field.file_name().map(str::to_string);
            let content_type = field.content_type().map(str::to_string);

            let mut bytes = Vec::new();
            while let Some(chunk) = field.chunk().await? {
                if bytes.len() + chunk.len() > max_bytes {
                    tracing::debug!(field = %name, max_bytes, "upload part exceeds ceiling");
                    return Err(ApiError::PayloadTooLarge);
                }
                bytes.extend_from_slice(&chunk);
            }

            form.file = Some(IncomingFile {
                original_filename,
                content_type,
                bytes,
            });
        } else if field.file_name().is_some() {
            tracing::debug!(field = %name, "ignoring unexpected file part");
            while field.chunk().await?.is_some() {}
        } else {
            let value = field.text().await?;
            form.fields.entry(name).or_insert(value);
        }
    }

    Ok(form)
}
