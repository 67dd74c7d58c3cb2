//! Input validation for request bodies.
//!
//! Each validator checks every rule and returns all failures at once, so a client can show
//! them together. On success the validated, typed input is returned.

use crate::constants::MIN_PASSWORD_LEN;
use carepoint_types::{EmailAddress, NonEmptyText};

/// One failed rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

pub type Validated<T> = Result<T, Vec<FieldError>>;

#[derive(Debug, Clone)]
pub struct SignupInput {
    pub fullname: NonEmptyText,
    pub email: EmailAddress,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct LoginInput {
    pub email: EmailAddress,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct ProfileInput {
    pub fullname: NonEmptyText,
    pub email: EmailAddress,
}

#[derive(Debug, Clone)]
pub struct PasswordResetInput {
    pub email: EmailAddress,
    pub token: String,
    pub password: String,
}

fn check_fullname(value: &str, errors: &mut Vec<FieldError>) -> Option<NonEmptyText> {
    NonEmptyText::new(value)
        .map_err(|_| errors.push(FieldError::new("fullname", "Full name is required")))
        .ok()
}

fn check_email(value: &str, errors: &mut Vec<FieldError>) -> Option<EmailAddress> {
    if value.trim().is_empty() {
        errors.push(FieldError::new("email", "Email is required"));
        return None;
    }
    EmailAddress::parse(value)
        .map_err(|_| errors.push(FieldError::new("email", "Enter a valid email address")))
        .ok()
}

fn new_password(value: &str, errors: &mut Vec<FieldError>) -> Option<String> {
    if value.chars().count() < MIN_PASSWORD_LEN {
        errors.push(FieldError::new(
            "password",
            format!("Password must be at least {} characters", MIN_PASSWORD_LEN),
        ));
        return None;
    }
    Some(value.to_string())
}

fn finish<T>(errors: Vec<FieldError>, value: Option<T>) -> Validated<T> {
    match value {
        Some(v) if errors.is_empty() => Ok(v),
        _ => Err(errors),
    }
}

pub fn validate_signup(fullname_in: &str, email_in: &str, password: &str) -> Validated<SignupInput> {
    let mut errors = Vec::new();
    let fullname = check_fullname(fullname_in, &mut errors);
    let email = check_email(email_in, &mut errors);
    let password = new_password(password, &mut errors);

    let value = match (fullname, email, password) {
        (Some(fullname), Some(email), Some(password)) => Some(SignupInput {
            fullname,
            email,
            password,
        }),
        _ => None,
    };
    finish(errors, value)
}

/// Login only checks presence; password strength is not re-checked for existing accounts.
pub fn validate_login(email_in: &str, password: &str) -> Validated<LoginInput> {
    let mut errors = Vec::new();
    let email = check_email(email_in, &mut errors);
    if password.is_empty() {
        errors.push(FieldError::new("password", "Password is required"));
    }

    let value = email.map(|email| LoginInput {
        email,
        password: password.to_string(),
    });
    finish(errors, value)
}

pub fn validate_update_profile(fullname_in: &str, email_in: &str) -> Validated<ProfileInput> {
    let mut errors = Vec::new();
    let fullname = check_fullname(fullname_in, &mut errors);
    let email = check_email(email_in, &mut errors);

    let value = match (fullname, email) {
        (Some(fullname), Some(email)) => Some(ProfileInput { fullname, email }),
        _ => None,
    };
    finish(errors, value)
}

pub fn validate_password_reset(
    email_in: &str,
    token: &str,
    password: &str,
    confirm_password: &str,
) -> Validated<PasswordResetInput> {
    let mut errors = Vec::new();
    let email = check_email(email_in, &mut errors);
    let token = token.trim();
    if token.is_empty() {
        errors.push(FieldError::new("token", "Reset token is required"));
    }
    let password = new_password(password, &mut errors);
    if password.is_some() && password.as_deref() != Some(confirm_password) {
        errors.push(FieldError::new("confirmPassword", "Passwords do not match"));
    }

    let value = match (email, password) {
        (Some(email), Some(password)) => Some(PasswordResetInput {
            email,
            token: token.to_string(),
            password,
        }),
        _ => None,
    };
    finish(errors, value)
}
