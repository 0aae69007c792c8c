use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use tracing::warn;

use super::{repo_types::User, session::CurrentUser};
use crate::{error::AppError, state::AppState};

/// Resolves the session's username to a stored user record.
pub struct AuthUser(pub User);

/// Like [`AuthUser`] but anonymous callers get `None`.
///
/// Only a missing or invalid session reads as anonymous; a failing user
/// store still rejects the request.
pub struct MaybeUser(pub Option<User>);

async fn lookup(state: &AppState, current: &CurrentUser) -> Result<Option<User>, AppError> {
    let user = state.users.find_by_username(&current.username).await?;
    if user.is_none() {
        warn!(username = %current.username, "session for unknown user");
    }
    Ok(user)
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let current = CurrentUser::from_request_parts(parts, state).await?;
        lookup(state, &current)
            .await?
            .map(AuthUser)
            .ok_or_else(|| AppError::Unauthorized("Unauthorized".into()))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Ok(current) = CurrentUser::from_request_parts(parts, state).await else {
            return Ok(MaybeUser(None));
        };
        Ok(MaybeUser(lookup(state, &current).await?))
    }
}
