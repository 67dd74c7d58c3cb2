//! Registration, login and password reset.
//!
//! Reset tokens are six decimal digits, valid for one hour and single use. Only their
//! SHA-256 hash is stored, and a token is revoked after `MAX_RESET_ATTEMPTS` wrong guesses.
//! There is no mail integration: the token is written to the log, and returned to the caller
//! so an operator tool can relay it.

use crate::config::CoreConfig;
use crate::constants::{MAX_RESET_ATTEMPTS, RESET_TOKEN_TTL_MINUTES};
use crate::error::{CoreError, CoreResult};
use crate::models::{ProfileImage, ResetToken, StoredUser, User};
use crate::password::{generate_reset_token, hash_password, hash_reset_token, verify_password};
use crate::repositories::users::UserStore;
use crate::validation::{LoginInput, PasswordResetInput, SignupInput};
use carepoint_types::EmailAddress;
use carepoint_uuid::ShardableUuid;
use chrono::{Duration, Utc};
use std::sync::Arc;

/// A validated registration plus the already-stored profile image, if any.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub input: SignupInput,
    pub profile_image: Option<ProfileImage>,
}

#[derive(Clone, Debug)]
pub struct AuthService {
    users: UserStore,
}

impl AuthService {
    pub fn new(cfg: Arc<CoreConfig>) -> Self {
        Self {
            users: UserStore::new(cfg.users_dir()),
        }
    }

    /// Creates a user.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::EmailTaken` if the email is already registered.
    pub fn register(&self, new_user: NewUser) -> CoreResult<User> {
        let NewUser {
            input,
            profile_image,
        } = new_user;

        if self.users.find_by_email(input.email.as_str()).is_some() {
            return Err(CoreError::EmailTaken);
        }

        let now = Utc::now();
        let (profile_image, profile_image_id) = match profile_image {
            Some(image) => (Some(image.path), image.public_id),
            None => (None, None),
        };
        let stored = StoredUser {
            id: ShardableUuid::new(),
            fullname: input.fullname.into_inner(),
            email: input.email.as_str().to_string(),
            profile_image,
            profile_image_id,
            password_hash: hash_password(&input.password)?,
            reset_token: None,
            created_at: now,
            updated_at: now,
        };

        self.users.put(&stored)?;
        tracing::info!(user_id = %stored.id, "user registered");
        Ok(stored.to_user())
    }

    /// Checks credentials.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidCredentials` for an unknown email or a wrong password,
    /// without saying which.
    pub fn login(&self, input: &LoginInput) -> CoreResult<User> {
        let stored = self
            .users
            .find_by_email(input.email.as_str())
            .filter(|u| verify_password(&input.password, &u.password_hash))
            .ok_or(CoreError::InvalidCredentials)?;

        tracing::info!(user_id = %stored.id, "user logged in");
        Ok(stored.to_user())
    }

    /// Issues a fresh reset token for `email`, replacing any earlier one.
    ///
    /// Returns `Ok(None)` when no user has that email; callers should answer the same way in
    /// both cases.
    pub fn request_reset(&self, email: &EmailAddress) -> CoreResult<Option<String>> {
        let Some(mut stored) = self.users.find_by_email(email.as_str()) else {
            tracing::info!("password reset requested for unknown email");
            return Ok(None);
        };

        let token = generate_reset_token();
        stored.reset_token = Some(ResetToken {
            token_hash: hash_reset_token(&token),
            expires_at: Utc::now() + Duration::minutes(RESET_TOKEN_TTL_MINUTES),
            failed_attempts: 0,
        });
        self.users.put(&stored)?;

        tracing::info!(user_id = %stored.id, token = %token, "password reset token issued");
        Ok(Some(token))
    }

    /// Same as [`AuthService::request_reset`]; the previous token stops working.
    pub fn resend_token(&self, email: &EmailAddress) -> CoreResult<Option<String>> {
        self.request_reset(email)
    }

    /// # Errors
    ///
    /// Returns `CoreError::InvalidResetToken` unless `token` is the current, unexpired
    /// token for `email`.
    pub fn check_reset_token(&self, email: &EmailAddress, token: &str) -> CoreResult<()> {
        self.user_with_valid_token(email, token).map(|_| ())
    }

    /// Sets a new password and consumes the reset token.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidResetToken` if the token does not check out.
    pub fn change_password(&self, input: &PasswordResetInput) -> CoreResult<()> {
        let mut stored = self.user_with_valid_token(&input.email, &input.token)?;

        stored.password_hash = hash_password(&input.password)?;
        stored.reset_token = None;
        stored.updated_at = Utc::now();
        self.users.put(&stored)?;

        tracing::info!(user_id = %stored.id, "password changed");
        Ok(())
    }

    /// Returns the user whose current token is `token`.
    ///
    /// A wrong guess counts against the token; at `MAX_RESET_ATTEMPTS` failures the token is
    /// revoked, so even the right value is refused afterwards.
    fn user_with_valid_token(&self, email: &EmailAddress, token: &str) -> CoreResult<StoredUser> {
        let Some(mut stored) = self.users.find_by_email(email.as_str()) else {
            return Err(CoreError::InvalidResetToken);
        };
        let Some(reset) = stored.reset_token.as_mut() else {
            return Err(CoreError::InvalidResetToken);
        };
        if reset.expires_at <= Utc::now() {
            return Err(CoreError::InvalidResetToken);
        }
        if reset.token_hash == hash_reset_token(token.trim()) {
            return Ok(stored);
        }

        reset.failed_attempts += 1;
        if reset.failed_attempts >= MAX_RESET_ATTEMPTS {
            tracing::warn!(user_id = %stored.id, "reset token revoked after repeated failures");
            stored.reset_token = None;
        }
        self.users.put(&stored)?;
        Err(CoreError::InvalidResetToken)
    }
}
