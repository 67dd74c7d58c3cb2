//! User profiles and medical records.
//!
//! [`UserService`] is the collaborator behind the user controller. It performs pure data
//! operations only; sessions, HTTP status codes and media-store calls belong to the API
//! crates.

use crate::config::CoreConfig;
use crate::error::{CoreError, CoreResult};
use crate::models::{MedicalRecord, ProfileImage, User};
use crate::repositories::records::RecordStore;
use crate::repositories::users::UserStore;
use crate::validation::ProfileInput;
use api_shared::MedicalDetails;
use carepoint_uuid::ShardableUuid;
use chrono::Utc;
use std::sync::Arc;

/// Result of a profile update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileUpdated {
    pub user: User,
    /// Media-store handle of the image that was replaced, if it was hosted.
    pub replaced_image_id: Option<String>,
}

/// Result of deleting an account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserDeleted {
    pub user: User,
    pub records_removed: usize,
}

#[derive(Clone, Debug)]
pub struct UserService {
    users: UserStore,
    records: RecordStore,
}

impl UserService {
    pub fn new(cfg: Arc<CoreConfig>) -> Self {
        Self {
            users: UserStore::new(cfg.users_dir()),
            records: RecordStore::new(cfg.records_dir()),
        }
    }

    /// Returns the user with `id`, or `None` if there is no such user.
    pub fn get_user_by_id(&self, id: &ShardableUuid) -> CoreResult<Option<User>> {
        Ok(self.users.get(id)?.map(|u| u.to_user()))
    }

    /// All users, ordered by creation time.
    pub fn list_users(&self) -> Vec<User> {
        let mut users: Vec<User> = self.users.all().iter().map(|u| u.to_user()).collect();
        users.sort_by_key(|u| u.created_at);
        users
    }

    /// Replaces fullname and email and, when `image` is given, the profile image.
    ///
    /// Returns `Ok(None)` if the user does not exist.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::EmailTaken` if another user already has the new email.
    pub fn update_profile(
        &self,
        id: &ShardableUuid,
        input: ProfileInput,
        image: Option<ProfileImage>,
    ) -> CoreResult<Option<ProfileUpdated>> {
        let Some(mut stored) = self.users.get(id)? else {
            return Ok(None);
        };

        if let Some(other) = self.users.find_by_email(input.email.as_str()) {
            if &other.id != id {
                return Err(CoreError::EmailTaken);
            }
        }

        stored.fullname = input.fullname.into_inner();
        stored.email = input.email.as_str().to_string();

        let mut replaced_image_id = None;
        if let Some(image) = image {
            replaced_image_id = stored.profile_image_id.take();
            stored.profile_image = Some(image.path);
            stored.profile_image_id = image.public_id;
        }
        stored.updated_at = Utc::now();

        self.users.put(&stored)?;
        tracing::info!(user_id = %id, "profile updated");

        Ok(Some(ProfileUpdated {
            user: stored.to_user(),
            replaced_image_id,
        }))
    }

    /// Deletes the user and every record they own.
    ///
    /// Returns `Ok(None)` if there was no such user; that is not an error.
    pub fn delete_user(&self, id: &ShardableUuid) -> CoreResult<Option<UserDeleted>> {
        let Some(stored) = self.users.get(id)? else {
            return Ok(None);
        };

        let records_removed = self.records.delete_for_user(id)?;
        self.users.delete(id)?;
        tracing::info!(user_id = %id, records_removed, "user deleted");

        Ok(Some(UserDeleted {
            user: stored.to_user(),
            records_removed,
        }))
    }

    /// Stores a new medical record owned by `owner`. Details are stored as given.
    pub fn create_record(
        &self,
        owner: &ShardableUuid,
        details: MedicalDetails,
    ) -> CoreResult<MedicalRecord> {
        let now = Utc::now();
        let record = MedicalRecord {
            id: ShardableUuid::new(),
            user: owner.clone(),
            details,
            created_at: now,
            updated_at: now,
        };

        self.records.put(&record)?;
        tracing::info!(record_id = %record.id, user_id = %owner, "medical record created");
        Ok(record)
    }

    /// Replaces the details of record `id` and sets its owner to `owner`.
    ///
    /// The previous owner is not checked. Returns `Ok(None)` if the record does not exist.
    pub fn update_record(
        &self,
        id: &ShardableUuid,
        owner: &ShardableUuid,
        details: MedicalDetails,
    ) -> CoreResult<Option<MedicalRecord>> {
        let Some(mut record) = self.records.get(id)? else {
            return Ok(None);
        };

        record.user = owner.clone();
        record.details = details;
        record.updated_at = Utc::now();

        self.records.put(&record)?;
        tracing::info!(record_id = %id, user_id = %owner, "medical record updated");
        Ok(Some(record))
    }

    pub fn get_record(&self, id: &ShardableUuid) -> CoreResult<Option<MedicalRecord>> {
        self.records.get(id)
    }

    /// Records owned by `user`, oldest first.
    pub fn list_records(&self, user: &ShardableUuid) -> Vec<MedicalRecord> {
        self.records.for_user(user)
    }
}
