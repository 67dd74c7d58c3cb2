//! Constants used throughout the Carepoint core crate.
//!
//! Path and filename constants live here so the on-disk layout is defined in one place.

/// Default directory for application data when no explicit directory is configured.
pub const DEFAULT_DATA_DIR: &str = "carepoint_data";

/// Directory name for user documents.
pub const USERS_DIR_NAME: &str = "users";

/// Directory name for medical record documents.
pub const RECORDS_DIR_NAME: &str = "records";

/// Filename for a user document.
pub const USER_FILENAME: &str = "user.yaml";

/// Filename for a medical record document.
pub const RECORD_FILENAME: &str = "record.yaml";

/// Minimum accepted password length, in characters.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Number of decimal digits in a password-reset token.
pub const RESET_TOKEN_DIGITS: usize = 6;

/// How long a password-reset token stays valid.
pub const RESET_TOKEN_TTL_MINUTES: i64 = 60;

/// Wrong guesses allowed against one reset token before it is revoked.
pub const MAX_RESET_ATTEMPTS: u32 = 5;
