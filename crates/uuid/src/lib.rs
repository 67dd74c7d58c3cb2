//! Record identifiers and sharded-path utilities.
//!
//! Carepoint stores every user and medical record as a document under a sharded directory
//! derived from its identifier. Identifiers use one *canonical* representation:
//! **32 lowercase hexadecimal characters** (no hyphens), e.g. `550e8400e29b41d4a716446655440000`.
//!
//! Canonical form is required for identifiers supplied from outside (HTTP paths, CLI
//! arguments). [`ShardableUuid::parse`] rejects anything else, which is how the API tells a
//! malformed identifier apart from a missing record before touching storage.
//!
//! ## Sharded directory layout
//! For a canonical identifier `u`, documents live under
//! `parent_dir/<u[0..2]>/<u[2..4]>/<u>/`, for example
//! `carepoint_data/users/55/0e/550e8400e29b41d4a716446655440000/`.

mod shardable;

pub use shardable::{ShardableUuid, Uuid};

/// Error type for identifier operations.
#[derive(Debug, thiserror::Error)]
pub enum UuidError {
    /// Invalid input provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for identifier operations.
pub type UuidResult<T> = Result<T, UuidError>;
