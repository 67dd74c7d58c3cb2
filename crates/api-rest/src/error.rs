//! The single mapping from handler failures to HTTP responses.

use api_shared::{FieldErrorRes, MessageRes, ValidationErrorsRes};
use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::rejection::{FormRejection, JsonRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use carepoint_core::FieldError;
use carepoint_files::FilesError;

#[derive(Debug)]
pub enum ApiError {
    /// 400 with `{"message": ...}`.
    BadRequest(String),
    /// 400 with `{"errors": [...]}`.
    Validation(Vec<FieldError>),
    /// 401 with `{"message": ...}`.
    Unauthorized(&'static str),
    /// 413 with a plain-text body.
    PayloadTooLarge,
    /// 500 with no body. The cause has already been logged.
    Internal,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    /// Logs `err` against `operation` and returns a bare 500.
    pub fn internal(operation: &str, err: impl std::fmt::Debug) -> Self {
        tracing::error!("{} error: {:?}", operation, err);
        Self::Internal
    }
}

impl From<FilesError> for ApiError {
    fn from(err: FilesError) -> Self {
        match err {
            FilesError::TooLarge { limit } => {
                tracing::debug!(limit, "rejecting oversize upload");
                Self::PayloadTooLarge
            }
            other => Self::internal("Upload", other),
        }
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return Self::PayloadTooLarge;
        }
        tracing::debug!("rejecting malformed multipart body: {}", err);
        Self::bad_request("Malformed multipart body")
    }
}

impl ApiError {
    /// Maps an extractor rejection onto the same envelope as every other failure.
    fn rejected(status: StatusCode, text: String) -> Self {
        if status == StatusCode::PAYLOAD_TOO_LARGE {
            return Self::PayloadTooLarge;
        }
        tracing::debug!(%status, "rejecting request body: {}", text);
        Self::BadRequest(text)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::rejected(rejection.status(), rejection.body_text())
    }
}

impl From<FormRejection> for ApiError {
    fn from(rejection: FormRejection) -> Self {
        Self::rejected(rejection.status(), rejection.body_text())
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(rejection: MultipartRejection) -> Self {
        Self::rejected(rejection.status(), rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, Json(MessageRes::new(message))).into_response()
            }
            Self::Validation(errors) => {
                let body = ValidationErrorsRes {
                    errors: errors
                        .into_iter()
                        .map(|e| FieldErrorRes {
                            field: e.field.to_string(),
                            message: e.message,
                        })
                        .collect(),
                };
                (StatusCode::BAD_REQUEST, Json(body)).into_response()
            }
            Self::Unauthorized(message) => {
                (StatusCode::UNAUTHORIZED, Json(MessageRes::new(message))).into_response()
            }
            Self::PayloadTooLarge => {
                (StatusCode::PAYLOAD_TOO_LARGE, "File too large").into_response()
            }
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        }
    }
}
