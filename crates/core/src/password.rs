//! Password and reset-token hashing.

use crate::constants::RESET_TOKEN_DIGITS;
use crate::error::{CoreError, CoreResult};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::Rng;
use sha2::{Digest, Sha256};

/// Hashes `password` with Argon2id and a fresh random salt (PHC string format).
pub(crate) fn hash_password(password: &str) -> CoreResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| CoreError::PasswordHash(e.to_string()))
}

/// Returns true if `password` matches the stored PHC `hash`. Unparseable hashes never match.
pub(crate) fn verify_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            tracing::warn!("stored password hash is unreadable: {}", e);
            false
        }
    }
}

/// A zero-padded decimal token, e.g. `042917`.
pub(crate) fn generate_reset_token() -> String {
    let upper = 10u32.pow(RESET_TOKEN_DIGITS as u32);
    let n = rand::thread_rng().gen_range(0..upper);
    format!("{:0width$}", n, width = RESET_TOKEN_DIGITS)
}

pub(crate) fn hash_reset_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}
