use super::shared::{document_path, load_all, read_yaml, remove_document_dir, write_yaml};
use crate::constants::RECORD_FILENAME;
use crate::error::CoreResult;
use crate::models::MedicalRecord;
use carepoint_uuid::ShardableUuid;
use std::path::PathBuf;

/// Medical record documents under `<data_dir>/records`.
#[derive(Clone, Debug)]
pub(crate) struct RecordStore {
    base: PathBuf,
}

impl RecordStore {
    pub fn new(base: PathBuf) -> Self {
        Self { base }
    }

    pub fn get(&self, id: &ShardableUuid) -> CoreResult<Option<MedicalRecord>> {
        read_yaml(&document_path(&self.base, id, RECORD_FILENAME))
    }

    pub fn put(&self, record: &MedicalRecord) -> CoreResult<()> {
        write_yaml(&document_path(&self.base, &record.id, RECORD_FILENAME), record)
    }

    /// Records owned by `user`, oldest first.
    pub fn for_user(&self, user: &ShardableUuid) -> Vec<MedicalRecord> {
        let mut records: Vec<MedicalRecord> = load_all::<MedicalRecord>(&self.base, RECORD_FILENAME)
            .into_iter()
            .filter(|r| &r.user == user)
            .collect();
        records.sort_by_key(|r| r.created_at);
        records
    }

    /// Deletes every record owned by `user`, returning how many were removed.
    pub fn delete_for_user(&self, user: &ShardableUuid) -> CoreResult<usize> {
        let mut removed = 0;
        for record in self.for_user(user) {
            if remove_document_dir(&self.base, &record.id)? {
                removed += 1;
            }
        }
        Ok(removed)
    }
}
