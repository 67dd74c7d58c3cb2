//! Shared helpers for the sharded YAML document stores.

use crate::error::{CoreError, CoreResult};
use carepoint_uuid::ShardableUuid;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Path of the document for `id` under `base_dir`.
pub(crate) fn document_path(base_dir: &Path, id: &ShardableUuid, filename: &str) -> PathBuf {
    id.sharded_dir(base_dir).join(filename)
}

/// Reads and parses a YAML document, returning `None` when it does not exist.
pub(crate) fn read_yaml<T: DeserializeOwned>(path: &Path) -> CoreResult<Option<T>> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(CoreError::FileRead(e)),
    };

    serde_yaml::from_str(&contents)
        .map(Some)
        .map_err(CoreError::YamlDeserialization)
}

/// Serialises `value` to `path`, creating parent directories as needed.
pub(crate) fn write_yaml<T: Serialize>(path: &Path, value: &T) -> CoreResult<()> {
    let yaml = serde_yaml::to_string(value).map_err(CoreError::YamlSerialization)?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(CoreError::DirCreation)?;
    }

    fs::write(path, yaml).map_err(CoreError::FileWrite)
}

/// Removes the whole directory of `id`. Returns false if there was nothing to remove.
pub(crate) fn remove_document_dir(base_dir: &Path, id: &ShardableUuid) -> CoreResult<bool> {
    match fs::remove_dir_all(id.sharded_dir(base_dir)) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(CoreError::FileDelete(e)),
    }
}

/// Collects every `<base_dir>/<s1>/<s2>/<id>/<filename>` that exists.
///
/// Missing or unreadable shard directories are skipped; a store that has never been
/// written to yields an empty list.
pub(crate) fn sharded_documents(base_dir: &Path, filename: &str) -> Vec<PathBuf> {
    fn subdirs(path: &Path) -> Vec<PathBuf> {
        match fs::read_dir(path) {
            Ok(it) => it
                .flatten()
                .map(|entry| entry.path())
                .filter(|p| p.is_dir())
                .collect(),
            Err(_) => Vec::new(),
        }
    }

    let mut documents = Vec::new();
    for s1 in subdirs(base_dir) {
        for s2 in subdirs(&s1) {
            for id_dir in subdirs(&s2) {
                let doc = id_dir.join(filename);
                if doc.is_file() {
                    documents.push(doc);
                }
            }
        }
    }
    documents
}

/// Reads every document under `base_dir`, skipping (and logging) any that fail to parse.
pub(crate) fn load_all<T: DeserializeOwned>(base_dir: &Path, filename: &str) -> Vec<T> {
    sharded_documents(base_dir, filename)
        .into_iter()
        .filter_map(|path| match read_yaml::<T>(&path) {
            Ok(doc) => doc,
            Err(e) => {
                tracing::warn!("failed to load {}: {}", path.display(), e);
                None
            }
        })
        .collect()
}
