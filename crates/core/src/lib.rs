//! # Carepoint Core
//!
//! Core business logic for the Carepoint patient backend.
//!
//! This crate contains pure data operations and file/folder management:
//! - User registration, login and password reset ([`AuthService`])
//! - Profile and medical-record management ([`UserService`])
//! - Sharded YAML document storage under the configured data directory
//! - Input validators shared by every API surface
//!
//! **No API concerns**: sessions, HTTP servers and media-store calls belong in `api-rest`
//! and `carepoint_files`.

pub mod auth;
pub mod config;
pub mod constants;
pub mod error;
pub mod models;
mod password;
mod repositories;
pub mod users;
pub mod validation;

pub use auth::{AuthService, NewUser};
pub use config::CoreConfig;
pub use error::{CoreError, CoreResult};
pub use models::{MedicalRecord, ProfileImage, User};
pub use users::{ProfileUpdated, UserDeleted, UserService};
pub use validation::FieldError;

pub use carepoint_types::{EmailAddress, NonEmptyText, TextError};
pub use carepoint_uuid::ShardableUuid;
