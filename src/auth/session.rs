use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::extract::{
    cookie::{Cookie, Key, SameSite},
    SignedCookieJar,
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::{debug, warn};

use crate::config::SessionConfig;
use crate::error::AppError;

pub const SESSION_COOKIE: &str = "devopsflix_session";

/// Payload carried in the signed session cookie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionData {
    pub username: String,
    /// Unix seconds; the session is dead from this instant on.
    pub expires_at: i64,
}

impl SessionData {
    pub fn new(username: impl Into<String>, ttl_secs: i64) -> Self {
        Self {
            username: username.into(),
            expires_at: OffsetDateTime::now_utc().unix_timestamp() + ttl_secs,
        }
    }

    pub fn is_expired_at(&self, now: i64) -> bool {
        now >= self.expires_at
    }

    pub fn encode(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn decode(raw: &str) -> Option<Self> {
        serde_json::from_str(raw).ok()
    }
}

/// Key used to sign session cookies.
pub fn signing_key(cfg: &SessionConfig) -> Key {
    match &cfg.secret {
        Some(secret) => Key::derive_from(secret.as_bytes()),
        None => {
            warn!("SECRET_KEY not set; sessions will not survive a restart");
            Key::generate()
        }
    }
}

pub fn session_cookie(data: &SessionData, cfg: &SessionConfig) -> anyhow::Result<Cookie<'static>> {
    let cookie = Cookie::build((SESSION_COOKIE, data.encode()?))
        .path("/")
        .http_only(true)
        .secure(cfg.secure_cookies)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(cfg.ttl_secs))
        .build();
    Ok(cookie)
}

pub fn removal_cookie() -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE).path("/").build()
}

/// Reads the session out of a signed jar. Tampered, malformed or expired
/// cookies all read as no session.
pub fn read_session(jar: &SignedCookieJar) -> Option<SessionData> {
    let cookie = jar.get(SESSION_COOKIE)?;
    let data = SessionData::decode(cookie.value())?;
    if data.is_expired_at(OffsetDateTime::now_utc().unix_timestamp()) {
        debug!(username = %data.username, "session expired");
        return None;
    }
    Some(data)
}

/// The logged-in caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub username: String,
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
    Key: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let jar = match SignedCookieJar::<Key>::from_request_parts(parts, state).await {
            Ok(jar) => jar,
            Err(never) => match never {},
        };

        match read_session(&jar) {
            Some(data) => Ok(CurrentUser {
                username: data.username,
            }),
            None => Err(AppError::Unauthorized("Unauthorized".into())),
        }
    }
}
