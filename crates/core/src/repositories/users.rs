use super::shared::{document_path, load_all, read_yaml, remove_document_dir, write_yaml};
use crate::constants::USER_FILENAME;
use crate::error::CoreResult;
use crate::models::StoredUser;
use carepoint_uuid::ShardableUuid;
use std::path::PathBuf;

/// User documents under `<data_dir>/users`.
#[derive(Clone, Debug)]
pub(crate) struct UserStore {
    base: PathBuf,
}

impl UserStore {
    pub fn new(base: PathBuf) -> Self {
        Self { base }
    }

    pub fn get(&self, id: &ShardableUuid) -> CoreResult<Option<StoredUser>> {
        read_yaml(&document_path(&self.base, id, USER_FILENAME))
    }

    pub fn put(&self, user: &StoredUser) -> CoreResult<()> {
        write_yaml(&document_path(&self.base, &user.id, USER_FILENAME), user)
    }

    pub fn delete(&self, id: &ShardableUuid) -> CoreResult<bool> {
        remove_document_dir(&self.base, id)
    }

    pub fn all(&self) -> Vec<StoredUser> {
        load_all(&self.base, USER_FILENAME)
    }

    /// Finds a user by email, ignoring case.
    ///
    /// This scans the whole store; there is no secondary index.
    pub fn find_by_email(&self, email: &str) -> Option<StoredUser> {
        self.all()
            .into_iter()
            .find(|u| u.email.eq_ignore_ascii_case(email))
    }
}
