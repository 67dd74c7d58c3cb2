//! User and medical-record DTOs.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

/// A user as returned to clients. Password material never appears here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserRes {
    pub id: String,
    pub fullname: String,
    pub email: String,
    pub profile_image: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Free-form medical details. Values are stored as sent; nothing is type-checked.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MedicalDetails {
    #[schema(value_type = Option<Object>)]
    pub age: Option<Value>,
    #[schema(value_type = Option<Object>)]
    pub gender: Option<Value>,
    #[schema(value_type = Option<Object>)]
    pub country: Option<Value>,
    #[schema(value_type = Option<Object>)]
    pub allergies: Option<Value>,
    #[schema(value_type = Option<Object>)]
    pub blood_group: Option<Value>,
    #[serde(alias = "terminalIlless")]
    #[schema(value_type = Option<Object>)]
    pub terminal_illness: Option<Value>,
    #[schema(value_type = Option<Object>)]
    pub acute_illness: Option<Value>,
    #[schema(value_type = Option<Object>)]
    pub current_medications: Option<Value>,
    #[schema(value_type = Option<Object>)]
    pub previous_surgery: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MedicalRecordRes {
    pub id: String,
    /// Owning user id.
    pub user: String,
    pub details: MedicalDetails,
    pub created_at: String,
    pub updated_at: String,
}

/// Response to a symptom recording upload. `path` is null when the part was not accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UploadRes {
    pub message: String,
    pub path: Option<String>,
}
