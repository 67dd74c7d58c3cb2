//! # API Shared
//!
//! Request and response types shared by the Carepoint REST API and the operator CLI.
//!
//! Contains:
//! - Auth request bodies (`auth` module)
//! - User, profile and medical-record DTOs (`users` module)
//! - Shared services like `HealthService`
//!
//! Every type derives `utoipa::ToSchema` so the REST crate can publish it in the OpenAPI
//! document without restating field lists.

pub mod auth;
pub mod health;
pub mod users;

pub use auth::{ChangePasswordReq, ConfirmResetReq, LoginReq, ResetReq};
pub use health::{HealthRes, HealthService};
pub use users::{MedicalDetails, MedicalRecordRes, UploadRes, UserRes};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Plain `{"message": ...}` body used by most endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MessageRes {
    pub message: String,
}

impl MessageRes {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// One failed validation rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FieldErrorRes {
    pub field: String,
    pub message: String,
}

/// `{"errors": [...]}` body returned when validators reject a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ValidationErrorsRes {
    pub errors: Vec<FieldErrorRes>,
}
