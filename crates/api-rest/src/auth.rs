//! Auth controller: registration, login, logout and password reset.

use crate::error::ApiError;
use crate::multipart::read_request_form;
use crate::session::{clear_session_cookie, session_cookie, Session};
use crate::state::AppState;
use crate::users::{discard_upload, EMAIL_IN_USE};
use api_shared::{ChangePasswordReq, ConfirmResetReq, LoginReq, MessageRes, ResetReq, UserRes};
use axum::extract::{Request, State};
use axum::http::header::SET_COOKIE;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use carepoint_core::validation::{validate_login, validate_password_reset, validate_signup};
use carepoint_core::{CoreError, EmailAddress, FieldError, NewUser, ProfileImage};

const BAD_CREDENTIALS: &str = "Invalid email or password";
const LOGGED_OUT: &str = "Logged out";
const RESET_SENT: &str = "If that email is registered, a reset token has been sent";
const RESET_RESENT: &str = "If that email is registered, a new reset token has been sent";
const TOKEN_OK: &str = "Token verified";
const TOKEN_INVALID: &str = "Invalid or expired token";
const PASSWORD_CHANGED: &str = "Password changed successfully";

fn parse_email(raw: &str) -> Result<EmailAddress, ApiError> {
    EmailAddress::parse(raw).map_err(|_| {
        ApiError::Validation(vec![FieldError {
            field: "email",
            message: "Enter a valid email address".into(),
        }])
    })
}

#[utoipa::path(
    post,
    path = "/auth/register",
    request_body(
        content = Vec<u8>,
        content_type = "multipart/form-data",
        description = "Text fields `fullname`, `email`, `password`; optional file `profileImage`"
    ),
    responses(
        (status = 201, description = "User created", body = UserRes),
        (status = 400, description = "Validation failure or email already registered"),
        (status = 413, description = "Profile image too large"),
        (status = 500, description = "Internal server error")
    )
)]
/// Registers a new user, optionally with a profile image.
#[axum::debug_handler]
pub(crate) async fn register(
    State(state): State<AppState>,
    req: Request,
) -> Result<(StatusCode, Json<UserRes>), ApiError> {
    let mut form =
        read_request_form(req, &state, "profileImage", state.image_policy.max_bytes()).await?;
    let stored = match form.file.take() {
        Some(file) => state.uploader.ingest(&state.image_policy, file).await?,
        None => None,
    };

    let input = match validate_signup(
        form.text("fullname"),
        form.text("email"),
        form.text("password"),
    ) {
        Ok(input) => input,
        Err(errors) => {
            discard_upload(&state, stored);
            return Err(ApiError::Validation(errors));
        }
    };

    let profile_image = stored.as_ref().map(|s| ProfileImage {
        path: s.path.clone(),
        public_id: s.public_id.clone(),
    });

    match state.auth.register(NewUser {
        input,
        profile_image,
    }) {
        Ok(user) => Ok((StatusCode::CREATED, Json(user.into()))),
        Err(CoreError::EmailTaken) => {
            discard_upload(&state, stored);
            Err(ApiError::bad_request(EMAIL_IN_USE))
        }
        Err(e) => {
            discard_upload(&state, stored);
            Err(ApiError::internal("Register", e))
        }
    }
}

#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginReq,
    responses(
        (status = 200, description = "Logged in; session cookie set", body = UserRes),
        (status = 400, description = "Validation failure"),
        (status = 401, description = "Bad credentials", body = MessageRes),
        (status = 500, description = "Internal server error")
    )
)]
/// Checks credentials and starts a session.
#[axum::debug_handler]
pub(crate) async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginReq>,
) -> Result<Response, ApiError> {
    let input = validate_login(&req.email, &req.password).map_err(ApiError::Validation)?;

    let user = match state.auth.login(&input) {
        Ok(user) => user,
        Err(CoreError::InvalidCredentials) => {
            return Err(ApiError::Unauthorized(BAD_CREDENTIALS));
        }
        Err(e) => return Err(ApiError::internal("Login", e)),
    };

    let token = state.sessions.create(user.id.clone()).await;
    let body: UserRes = user.into();
    Ok(([(SET_COOKIE, session_cookie(&token))], Json(body)).into_response())
}

#[utoipa::path(
    post,
    path = "/auth/logout",
    responses(
        (status = 200, description = "Session ended; cookie cleared", body = MessageRes),
        (status = 401, description = "No session", body = MessageRes)
    )
)]
#[axum::debug_handler]
pub(crate) async fn logout(State(state): State<AppState>, session: Session) -> Response {
    if let Some(started) = state.sessions.created_at(&session.token).await {
        tracing::info!(
            user_id = %session.user_id,
            started = %started,
            "session ended"
        );
    }
    state.sessions.remove(&session.token).await;

    (
        [(SET_COOKIE, clear_session_cookie())],
        Json(MessageRes::new(LOGGED_OUT)),
    )
        .into_response()
}

#[utoipa::path(
    post,
    path = "/auth/reset",
    request_body = ResetReq,
    responses(
        (status = 200, description = "Token issued if the email is registered", body = MessageRes),
        (status = 400, description = "Malformed email"),
        (status = 500, description = "Internal server error")
    )
)]
/// Issues a six-digit password reset token, valid for one hour.
///
/// The answer is the same whether or not the email is registered.
#[axum::debug_handler]
pub(crate) async fn reset_password(
    State(state): State<AppState>,
    Json(req): Json<ResetReq>,
) -> Result<Json<MessageRes>, ApiError> {
    let email = parse_email(&req.email)?;
    state
        .auth
        .request_reset(&email)
        .map_err(|e| ApiError::internal("Reset password", e))?;
    Ok(Json(MessageRes::new(RESET_SENT)))
}

#[utoipa::path(
    post,
    path = "/auth/confirm-reset",
    request_body = ConfirmResetReq,
    responses(
        (status = 200, description = "Token is valid", body = MessageRes),
        (status = 400, description = "Token invalid or expired", body = MessageRes),
        (status = 500, description = "Internal server error")
    )
)]
#[axum::debug_handler]
pub(crate) async fn check_reset_token(
    State(state): State<AppState>,
    Json(req): Json<ConfirmResetReq>,
) -> Result<Json<MessageRes>, ApiError> {
    let email =
        EmailAddress::parse(&req.email).map_err(|_| ApiError::bad_request(TOKEN_INVALID))?;

    match state.auth.check_reset_token(&email, &req.token) {
        Ok(()) => Ok(Json(MessageRes::new(TOKEN_OK))),
        Err(CoreError::InvalidResetToken) => Err(ApiError::bad_request(TOKEN_INVALID)),
        Err(e) => Err(ApiError::internal("Check reset token", e)),
    }
}

#[utoipa::path(
    post,
    path = "/auth/resend-token",
    request_body = ResetReq,
    responses(
        (status = 200, description = "Fresh token issued if the email is registered", body = MessageRes),
        (status = 400, description = "Malformed email"),
        (status = 500, description = "Internal server error")
    )
)]
/// Issues a fresh reset token; any earlier one stops working.
#[axum::debug_handler]
pub(crate) async fn resend_token(
    State(state): State<AppState>,
    Json(req): Json<ResetReq>,
) -> Result<Json<MessageRes>, ApiError> {
    let email = parse_email(&req.email)?;
    state
        .auth
        .resend_token(&email)
        .map_err(|e| ApiError::internal("Resend token", e))?;
    Ok(Json(MessageRes::new(RESET_RESENT)))
}

#[utoipa::path(
    post,
    path = "/auth/change-password",
    request_body = ChangePasswordReq,
    responses(
        (status = 200, description = "Password changed", body = MessageRes),
        (status = 400, description = "Validation failure or bad token"),
        (status = 500, description = "Internal server error")
    )
)]
/// Sets a new password using a valid reset token. The token cannot be reused.
#[axum::debug_handler]
pub(crate) async fn change_password(
    State(state): State<AppState>,
    Json(req): Json<ChangePasswordReq>,
) -> Result<Json<MessageRes>, ApiError> {
    let input = validate_password_reset(
        &req.email,
        &req.token,
        &req.password,
        &req.confirm_password,
    )
    .map_err(ApiError::Validation)?;

    match state.auth.change_password(&input) {
        Ok(()) => Ok(Json(MessageRes::new(PASSWORD_CHANGED))),
        Err(CoreError::InvalidResetToken) => Err(ApiError::bad_request(TOKEN_INVALID)),
        Err(e) => Err(ApiError::internal("Change password", e)),
    }
}
