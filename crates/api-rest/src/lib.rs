//! # API REST
//!
//! REST API implementation for Carepoint.
//!
//! Handles:
//! - HTTP endpoints with axum (auth, user profile, medical records, uploads)
//! - Cookie sessions for the protected routes
//! - Multipart upload extraction feeding `carepoint_files`
//! - OpenAPI/Swagger documentation
//!
//! Uses `api-shared` for request/response types and `carepoint-core` for all data operations.

#![warn(rust_2018_idioms)]

mod auth;
pub mod config;
pub mod error;
mod multipart;
pub mod session;
mod state;
mod users;

#[cfg(test)]
mod tests;

pub use config::RestConfig;
pub use error::ApiError;
pub use state::AppState;

use api_shared::{
    ChangePasswordReq, ConfirmResetReq, FieldErrorRes, HealthRes, HealthService, LoginReq,
    MedicalDetails, MedicalRecordRes, MessageRes, ResetReq, UploadRes, UserRes,
    ValidationErrorsRes,
};
use axum::extract::DefaultBodyLimit;
use axum::response::Json;
use axum::routing::{delete, get, post, put};
use axum::Router;
use carepoint_files::MAX_UPLOAD_BYTES;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Request body ceiling: one maximum-size upload plus room for the text fields.
const MAX_REQUEST_BODY_BYTES: usize = 2 * MAX_UPLOAD_BYTES;

#[derive(OpenApi)]
#[openapi(
    paths(
        health,
        auth::register,
        auth::login,
        auth::logout,
        auth::reset_password,
        auth::check_reset_token,
        auth::resend_token,
        auth::change_password,
        users::get_profile,
        users::update_profile,
        users::delete_user,
        users::create_record,
        users::update_record,
        users::list_records,
        users::upload_symptoms,
    ),
    components(schemas(
        HealthRes,
        MessageRes,
        FieldErrorRes,
        ValidationErrorsRes,
        UserRes,
        MedicalDetails,
        MedicalRecordRes,
        UploadRes,
        LoginReq,
        ResetReq,
        ConfirmResetReq,
        ChangePasswordReq,
    ))
)]
pub struct ApiDoc;

/// Builds the full route table.
///
/// Session-protected routes reject requests without a valid `sid` cookie with 401 before
/// any other check runs.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/reset", post(auth::reset_password))
        .route("/auth/confirm-reset", post(auth::check_reset_token))
        .route("/auth/resend-token", post(auth::resend_token))
        .route("/auth/change-password", post(auth::change_password))
        .route("/users/:userId/profile", get(users::get_profile))
        .route("/users/:userId/update-profile", put(users::update_profile))
        .route("/users/:userId/delete-account", delete(users::delete_user))
        .route("/users/:userId/create-record", post(users::create_record))
        .route("/users/:userId/records", get(users::list_records))
        .route("/users/:userId/upload-symptoms", post(users::upload_symptoms))
        .route("/records/:recordId/update-record", put(users::update_record))
        .merge(
            SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()),
        )
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for the REST API
///
/// Used for monitoring and load balancer health checks.
async fn health() -> Json<HealthRes> {
    Json(HealthService::check_health())
}
