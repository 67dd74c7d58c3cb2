//! Stored documents and the domain values built from them.
//!
//! `StoredUser` is the on-disk shape and carries password material; it never leaves the
//! crate. Callers only ever see [`User`].

use api_shared::{MedicalDetails, MedicalRecordRes, UserRes};
use carepoint_uuid::ShardableUuid;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered user, without credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: ShardableUuid,
    pub fullname: String,
    pub email: String,
    /// URL (hosted image) or path the profile image is served from.
    pub profile_image: Option<String>,
    /// Media-store handle of the hosted profile image, used to delete it when replaced.
    pub profile_image_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A profile image that has already been stored somewhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileImage {
    pub path: String,
    pub public_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ResetToken {
    /// Hex SHA-256 of the issued token.
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    #[serde(default)]
    pub failed_attempts: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StoredUser {
    pub id: ShardableUuid,
    pub fullname: String,
    pub email: String,
    #[serde(default)]
    pub profile_image: Option<String>,
    #[serde(default)]
    pub profile_image_id: Option<String>,
    pub password_hash: String,
    #[serde(default)]
    pub reset_token: Option<ResetToken>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StoredUser {
    pub fn to_user(&self) -> User {
        User {
            id: self.id.clone(),
            fullname: self.fullname.clone(),
            email: self.email.clone(),
            profile_image: self.profile_image.clone(),
            profile_image_id: self.profile_image_id.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// A medical record document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicalRecord {
    pub id: ShardableUuid,
    /// Owning user.
    pub user: ShardableUuid,
    pub details: MedicalDetails,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserRes {
    fn from(user: User) -> Self {
        UserRes {
            id: user.id.to_string(),
            fullname: user.fullname,
            email: user.email,
            profile_image: user.profile_image,
            created_at: user.created_at.to_rfc3339(),
            updated_at: user.updated_at.to_rfc3339(),
        }
    }
}

impl From<MedicalRecord> for MedicalRecordRes {
    fn from(record: MedicalRecord) -> Self {
        MedicalRecordRes {
            id: record.id.to_string(),
            user: record.user.to_string(),
            details: record.details,
            created_at: record.created_at.to_rfc3339(),
            updated_at: record.updated_at.to_rfc3339(),
        }
    }
}
