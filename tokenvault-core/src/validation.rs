//! Field validators for account input.
//!
//! The predicates are pure and only answer yes/no. The `validate_*`
//! composites run them in request order, turn the first failure into an
//! [`AuthError::InvalidField`] naming the broken rule, and hand back the
//! normalized input (email lowercased) for the rest of the chain.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::account::{ChangePasswordRequest, LoginRequest, RegisterRequest, UpdateProfileRequest};
use crate::error::{AuthError, Result};

pub const NAME_MIN_LEN: usize = 2;
/// Shared by registration and profile update.
pub const NAME_MAX_LEN: usize = 20;
pub const LAST_NAME_MIN_LEN: usize = 2;
pub const LAST_NAME_MAX_LEN: usize = 30;
pub const PASSWORD_MIN_LEN: usize = 6;
pub const PASSWORD_MAX_LEN: usize = 20;
/// bcrypt ignores everything past this many bytes.
pub const PASSWORD_MAX_BYTES: usize = 72;

const FORBIDDEN_NAME_CHARS: &[char] = &['<', '>', '&', '\'', '"', '\\'];

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"^(([^<>()\[\]\\.,;:\s@"]+(\.[^<>()\[\]\\.,;:\s@"]+)*)|(".+"))@((\[[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\])|(([a-zA-Z\-0-9]+\.)+[a-zA-Z]{2,}))$"#,
    )
    .expect("email pattern compiles")
});

const NAME_RULE: &str = "The name must be a string, have at least 2 characters long and at most 20 characters long, it must not contain <, >, &, ', \" and \\ characters";
const LAST_NAME_RULE: &str = "The lastName must be a string, have at least 2 characters long and at most 30 characters long, it must not contain <, >, &, ', \" and \\ characters";
const EMAIL_RULE: &str = "The email must be a valid email address";
const PASSWORD_RULE: &str = "must be a string, have at least 6 characters long and at most 20 characters long (72 bytes), and must not contain spaces";

fn length_within(s: &str, min: usize, max: usize) -> bool {
    let len = s.chars().count();
    len >= min && len <= max
}

pub fn valid_name(name: &str) -> bool {
    length_within(name, NAME_MIN_LEN, NAME_MAX_LEN) && !name.contains(FORBIDDEN_NAME_CHARS)
}

pub fn valid_last_name(last_name: &str) -> bool {
    length_within(last_name, LAST_NAME_MIN_LEN, LAST_NAME_MAX_LEN)
        && !last_name.contains(FORBIDDEN_NAME_CHARS)
}

pub fn valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

pub fn valid_password(password: &str) -> bool {
    length_within(password, PASSWORD_MIN_LEN, PASSWORD_MAX_LEN)
        && password.len() <= PASSWORD_MAX_BYTES
        && !password.contains(' ')
}

/// Registration fields after validation.
#[derive(Debug, Clone)]
pub struct Registration {
    pub name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

/// Email/password pair after validation; `email` is lowercase.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct Profile {
    pub name: String,
    pub last_name: String,
}

fn check<'a>(value: Option<&'a str>, rule: fn(&str) -> bool, message: &str) -> Result<&'a str> {
    match value {
        Some(v) if rule(v) => Ok(v),
        _ => Err(AuthError::InvalidField(message.to_string())),
    }
}

fn check_name(name: Option<&str>) -> Result<&str> {
    check(
        name,
        valid_name,
        &format!("The name is invalid or missing: {NAME_RULE}"),
    )
}

fn check_last_name(last_name: Option<&str>) -> Result<&str> {
    check(
        last_name,
        valid_last_name,
        &format!("The lastName is invalid or missing: {LAST_NAME_RULE}"),
    )
}

fn check_email(email: Option<&str>) -> Result<String> {
    check(
        email,
        valid_email,
        &format!("The email is invalid or missing: {EMAIL_RULE}"),
    )
    .map(str::to_lowercase)
}

fn check_password<'a>(password: Option<&'a str>, field: &str) -> Result<&'a str> {
    check(
        password,
        valid_password,
        &format!("The {field} is invalid or missing: The {field} {PASSWORD_RULE}"),
    )
}

pub fn validate_registration(req: &RegisterRequest) -> Result<Registration> {
    let name = check_name(req.name.as_deref())?;
    let last_name = check_last_name(req.last_name.as_deref())?;
    let email = check_email(req.email.as_deref())?;
    let password = check_password(req.password.as_deref(), "password")?;
    Ok(Registration {
        name: name.to_string(),
        last_name: last_name.to_string(),
        email,
        password: password.to_string(),
    })
}

pub fn validate_login(req: &LoginRequest) -> Result<Credentials> {
    let email = check_email(req.email.as_deref())?;
    let password = check_password(req.password.as_deref(), "password")?;
    Ok(Credentials {
        email,
        password: password.to_string(),
    })
}

pub fn validate_profile(req: &UpdateProfileRequest) -> Result<Profile> {
    let name = check_name(req.name.as_deref())?;
    let last_name = check_last_name(req.last_name.as_deref())?;
    Ok(Profile {
        name: name.to_string(),
        last_name: last_name.to_string(),
    })
}

/// Login fields first, then the new password, matching the change-password chain.
pub fn validate_password_change(req: &ChangePasswordRequest) -> Result<(Credentials, String)> {
    let credentials = validate_login(&LoginRequest {
        email: req.email.clone(),
        password: req.password.clone(),
    })?;
    let new_password = validate_new_password(req.new_password.as_deref())?;
    Ok((credentials, new_password))
}

pub fn validate_new_password(new_password: Option<&str>) -> Result<String> {
    check_password(new_password, "newPassword").map(str::to_string)
}
