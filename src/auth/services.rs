use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, warn};

use crate::auth::{
    dto::SignupRequest,
    password::{hash_password, verify, Verification},
    repo::UserRepo,
    repo_types::{NewUser, StoredPassword, User},
};
use crate::error::{AppError, AppResult};

pub const MIN_PASSWORD_LEN: usize = 6;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Checks a signup form without touching storage.
pub fn validate_signup(req: &SignupRequest) -> Result<(), &'static str> {
    if [&req.email, &req.username, &req.password, &req.confirm_password]
        .iter()
        .any(|v| v.trim().is_empty())
    {
        return Err("All fields are required");
    }
    if !is_valid_email(req.email.trim()) {
        return Err("Invalid email");
    }
    if req.password != req.confirm_password {
        return Err("Passwords do not match");
    }
    if req.password.chars().count() < MIN_PASSWORD_LEN {
        return Err("Password must be at least 6 characters");
    }
    Ok(())
}

/// Validates the form and stores a new user with a hashed password.
pub async fn register(users: &dyn UserRepo, req: SignupRequest) -> AppResult<User> {
    if let Err(msg) = validate_signup(&req) {
        warn!(username = %req.username, reason = msg, "signup rejected");
        return Err(AppError::BadRequest(msg.into()));
    }

    let new_user = NewUser {
        username: req.username.trim().to_string(),
        email: req.email.trim().to_lowercase(),
        password: StoredPassword::Hashed(hash_password(&req.password)?),
    };

    match users.create(new_user).await? {
        Some(user) => {
            info!(user_id = user.id, username = %user.username, "user registered");
            Ok(user)
        }
        None => Err(AppError::BadRequest("Username already exists".into())),
    }
}

/// Returns the user when the credentials match.
///
/// A legacy plain-text credential that matches is rewritten as a hash
/// before returning.
pub async fn check_password(
    users: &dyn UserRepo,
    username: &str,
    password: &str,
) -> anyhow::Result<Option<User>> {
    if username.is_empty() || password.is_empty() {
        return Ok(None);
    }

    let Some(mut user) = users.find_by_username(username).await? else {
        warn!(%username, "login unknown username");
        return Ok(None);
    };

    match verify(password, &user.password)? {
        Verification::Rejected => {
            warn!(user_id = user.id, "login invalid password");
            Ok(None)
        }
        Verification::Accepted => Ok(Some(user)),
        Verification::AcceptedNeedsUpgrade(hashed) => {
            users.update_password(user.id, &hashed).await?;
            info!(user_id = user.id, "legacy password upgraded to hash");
            user.password = hashed;
            Ok(Some(user))
        }
    }
}
