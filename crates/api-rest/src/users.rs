//! User controller: profile, account and medical-record endpoints.
//!
//! Every handler here requires a session. Path identifiers are checked for canonical form
//! before anything else happens, including reading an upload.

use crate::error::ApiError;
use crate::multipart::read_request_form;
use crate::session::Session;
use crate::state::AppState;
use api_shared::{MedicalDetails, MedicalRecordRes, MessageRes, UploadRes, UserRes};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path as AxumPath, Request, State};
use axum::response::Json;
use carepoint_core::validation::validate_update_profile;
use carepoint_core::{CoreError, ProfileImage, ShardableUuid};
use carepoint_files::{delete_upload, StoredUpload};

pub(crate) const INVALID_USER_ID: &str = "Invalid user ID";
pub(crate) const INVALID_RECORD_ID: &str = "Invalid record ID";
const PROFILE_LOOKUP_FAILED: &str = "An error occured while fetching user details";
const PROFILE_UPDATE_FAILED: &str = "An error occured while creating new user";
pub(crate) const EMAIL_IN_USE: &str = "Email address is already registered";
const USER_DELETED: &str = "User successfully deleted";
const RECORD_CREATED: &str = "Your medical records have been successfully saved. You can change this informtion anytime in the settings page";
const RECORD_UPDATED: &str = "Your medical records have been updated!";
const AUDIO_STORED: &str = "Symptoms recording uploaded";
const AUDIO_DROPPED: &str = "No supported audio file was uploaded";

pub(crate) fn parse_id(raw: &str, message: &'static str) -> Result<ShardableUuid, ApiError> {
    ShardableUuid::parse(raw).map_err(|e| {
        tracing::debug!("rejecting identifier: {}", e);
        ApiError::bad_request(message)
    })
}

/// Record details from a JSON body. A body sent without a JSON content type (including an
/// empty one) is read as an empty object; the details are never validated.
fn details_or_default(
    body: Result<Json<MedicalDetails>, JsonRejection>,
) -> Result<MedicalDetails, ApiError> {
    match body {
        Ok(Json(details)) => Ok(details),
        Err(JsonRejection::MissingJsonContentType(_)) => Ok(MedicalDetails::default()),
        Err(rejection) => Err(rejection.into()),
    }
}

/// Best-effort removal of a freshly stored image that will not be kept.
pub(crate) fn discard_upload(state: &AppState, stored: Option<StoredUpload>) {
    if let Some(public_id) = stored.and_then(|s| s.public_id) {
        delete_upload(state.uploader.media_store(), public_id);
    }
}

#[utoipa::path(
    get,
    path = "/users/{userId}/profile",
    params(("userId" = String, Path, description = "Canonical user id")),
    responses(
        (status = 200, description = "User profile", body = UserRes),
        (status = 400, description = "Malformed id or no such user", body = MessageRes),
        (status = 401, description = "No session", body = MessageRes),
        (status = 500, description = "Internal server error")
    )
)]
/// Returns one user's profile.
///
/// A well-formed id with no user behind it is a 400, the same as a malformed id.
#[axum::debug_handler]
pub(crate) async fn get_profile(
    State(state): State<AppState>,
    _session: Session,
    AxumPath(user_id): AxumPath<String>,
) -> Result<Json<UserRes>, ApiError> {
    let user_id = parse_id(&user_id, INVALID_USER_ID)?;

    match state.users.get_user_by_id(&user_id) {
        Ok(Some(user)) => Ok(Json(user.into())),
        Ok(None) => Err(ApiError::bad_request(PROFILE_LOOKUP_FAILED)),
        Err(e) => Err(ApiError::internal("Get profile", e)),
    }
}

#[utoipa::path(
    put,
    path = "/users/{userId}/update-profile",
    params(("userId" = String, Path, description = "Canonical user id")),
    request_body(
        content = Vec<u8>,
        content_type = "multipart/form-data",
        description = "Text fields `fullname`, `email`; optional file `profileImage` (PNG/JPEG, max 5 MiB). The text fields may also be sent as JSON or urlencoded, without a file."
    ),
    responses(
        (status = 200, description = "Updated profile", body = UserRes),
        (status = 400, description = "Malformed id, validation failure or no such user"),
        (status = 401, description = "No session", body = MessageRes),
        (status = 413, description = "Profile image too large"),
        (status = 500, description = "Internal server error")
    )
)]
/// Updates fullname and email, and the profile image when an accepted one is attached.
///
/// A file of any other type is ignored and the current image is kept. When a hosted image is
/// replaced, the old one is deleted from the media store in the background.
#[axum::debug_handler]
pub(crate) async fn update_profile(
    State(state): State<AppState>,
    _session: Session,
    AxumPath(user_id): AxumPath<String>,
    req: Request,
) -> Result<Json<UserRes>, ApiError> {
    let user_id = parse_id(&user_id, INVALID_USER_ID)?;

    let mut form =
        read_request_form(req, &state, "profileImage", state.image_policy.max_bytes()).await?;
    let stored = match form.file.take() {
        Some(file) => state.uploader.ingest(&state.image_policy, file).await?,
        None => None,
    };

    let input = match validate_update_profile(form.text("fullname"), form.text("email")) {
        Ok(input) => input,
        Err(errors) => {
            discard_upload(&state, stored);
            return Err(ApiError::Validation(errors));
        }
    };

    let image = stored.as_ref().map(|s| ProfileImage {
        path: s.path.clone(),
        public_id: s.public_id.clone(),
    });

    match state.users.update_profile(&user_id, input, image) {
        Ok(Some(updated)) => {
            if let Some(old) = updated.replaced_image_id {
                delete_upload(state.uploader.media_store(), old);
            }
            Ok(Json(updated.user.into()))
        }
        Ok(None) => {
            discard_upload(&state, stored);
            Err(ApiError::bad_request(PROFILE_UPDATE_FAILED))
        }
        Err(CoreError::EmailTaken) => {
            discard_upload(&state, stored);
            Err(ApiError::bad_request(EMAIL_IN_USE))
        }
        Err(e) => {
            discard_upload(&state, stored);
            Err(ApiError::internal("Update profile", e))
        }
    }
}

#[utoipa::path(
    delete,
    path = "/users/{userId}/delete-account",
    params(("userId" = String, Path, description = "Canonical user id")),
    responses(
        (status = 200, description = "Account deleted (or never existed)", body = MessageRes),
        (status = 400, description = "Malformed id", body = MessageRes),
        (status = 401, description = "No session", body = MessageRes),
        (status = 500, description = "Internal server error")
    )
)]
/// Deletes a user, their medical records and their hosted profile image.
///
/// Deleting an id that does not exist reports success as well. Every session of the deleted
/// user is ended.
#[axum::debug_handler]
pub(crate) async fn delete_user(
    State(state): State<AppState>,
    _session: Session,
    AxumPath(user_id): AxumPath<String>,
) -> Result<Json<MessageRes>, ApiError> {
    let user_id = parse_id(&user_id, INVALID_USER_ID)?;

    match state.users.delete_user(&user_id) {
        Ok(Some(deleted)) => {
            if let Some(public_id) = deleted.user.profile_image_id {
                delete_upload(state.uploader.media_store(), public_id);
            }
            state.sessions.remove_user(&user_id).await;
        }
        Ok(None) => tracing::debug!(user_id = %user_id, "delete of unknown user"),
        Err(e) => return Err(ApiError::internal("Delete user", e)),
    }

    Ok(Json(MessageRes::new(USER_DELETED)))
}

#[utoipa::path(
    post,
    path = "/users/{userId}/create-record",
    params(("userId" = String, Path, description = "Not consulted; the record is owned by the session user")),
    request_body = MedicalDetails,
    responses(
        (status = 200, description = "Record saved", body = MessageRes),
        (status = 401, description = "No session", body = MessageRes),
        (status = 500, description = "Internal server error")
    )
)]
/// Saves a medical record for the session user.
///
/// The nine detail fields are stored exactly as sent. The `userId` path segment is ignored.
#[axum::debug_handler]
pub(crate) async fn create_record(
    State(state): State<AppState>,
    session: Session,
    AxumPath(_user_id): AxumPath<String>,
    body: Result<Json<MedicalDetails>, JsonRejection>,
) -> Result<Json<MessageRes>, ApiError> {
    let details = details_or_default(body)?;

    match state.users.create_record(&session.user_id, details) {
        Ok(_) => Ok(Json(MessageRes::new(RECORD_CREATED))),
        Err(e) => Err(ApiError::internal("Create medical record", e)),
    }
}

#[utoipa::path(
    put,
    path = "/records/{recordId}/update-record",
    params(("recordId" = String, Path, description = "Canonical record id")),
    request_body = MedicalDetails,
    responses(
        (status = 200, description = "Record updated", body = MessageRes),
        (status = 400, description = "Malformed id", body = MessageRes),
        (status = 401, description = "No session", body = MessageRes),
        (status = 500, description = "Internal server error")
    )
)]
/// Replaces a record's details and assigns it to the session user.
///
/// The record's previous owner is not checked. An unknown record id still answers 200.
#[axum::debug_handler]
pub(crate) async fn update_record(
    State(state): State<AppState>,
    session: Session,
    AxumPath(record_id): AxumPath<String>,
    body: Result<Json<MedicalDetails>, JsonRejection>,
) -> Result<Json<MessageRes>, ApiError> {
    let record_id = parse_id(&record_id, INVALID_RECORD_ID)?;
    let details = details_or_default(body)?;

    match state
        .users
        .update_record(&record_id, &session.user_id, details)
    {
        Ok(Some(_)) => {}
        Ok(None) => tracing::warn!(record_id = %record_id, "update of unknown medical record"),
        Err(e) => return Err(ApiError::internal("Update medical record", e)),
    }

    Ok(Json(MessageRes::new(RECORD_UPDATED)))
}

#[utoipa::path(
    get,
    path = "/users/{userId}/records",
    params(("userId" = String, Path, description = "Canonical user id")),
    responses(
        (status = 200, description = "The user's records, oldest first", body = Vec<MedicalRecordRes>),
        (status = 400, description = "Malformed id", body = MessageRes),
        (status = 401, description = "No session", body = MessageRes)
    )
)]
#[axum::debug_handler]
pub(crate) async fn list_records(
    State(state): State<AppState>,
    _session: Session,
    AxumPath(user_id): AxumPath<String>,
) -> Result<Json<Vec<MedicalRecordRes>>, ApiError> {
    let user_id = parse_id(&user_id, INVALID_USER_ID)?;

    let records = state
        .users
        .list_records(&user_id)
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(Json(records))
}

#[utoipa::path(
    post,
    path = "/users/{userId}/upload-symptoms",
    params(("userId" = String, Path, description = "Canonical user id")),
    request_body(
        content = Vec<u8>,
        content_type = "multipart/form-data",
        description = "File `audio` in one of the supported audio formats, max 5 MiB"
    ),
    responses(
        (status = 200, description = "Upload outcome; `path` is null when the file was not accepted", body = UploadRes),
        (status = 400, description = "Malformed id", body = MessageRes),
        (status = 401, description = "No session", body = MessageRes),
        (status = 413, description = "Recording too large"),
        (status = 500, description = "Internal server error")
    )
)]
/// Stores a symptom recording on local disk.
///
/// Every accepted recording is written to the same file, so the latest upload wins.
#[axum::debug_handler]
pub(crate) async fn upload_symptoms(
    State(state): State<AppState>,
    _session: Session,
    AxumPath(user_id): AxumPath<String>,
    req: Request,
) -> Result<Json<UploadRes>, ApiError> {
    let user_id = parse_id(&user_id, INVALID_USER_ID)?;

    let form = read_request_form(req, &state, "audio", state.audio_policy.max_bytes()).await?;
    let stored = match form.file {
        Some(file) => state.uploader.ingest(&state.audio_policy, file).await?,
        None => None,
    };

    let res = match stored {
        Some(stored) => {
            tracing::info!(user_id = %user_id, path = %stored.path, "symptoms recording stored");
            UploadRes {
                message: AUDIO_STORED.into(),
                path: Some(stored.path),
            }
        }
        None => UploadRes {
            message: AUDIO_DROPPED.into(),
            path: None,
        },
    };
    Ok(Json(res))
}
