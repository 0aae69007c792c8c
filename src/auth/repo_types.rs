use std::fmt;

use sqlx::FromRow;

/// A credential as persisted, tagged with how it was written.
#[derive(Clone, PartialEq, Eq)]
pub enum StoredPassword {
    /// Legacy row that predates hashing.
    Plaintext(String),
    /// argon2 PHC string.
    Hashed(String),
}

pub const SCHEME_PLAIN: &str = "plain";
pub const SCHEME_ARGON2: &str = "argon2";

impl StoredPassword {
    pub fn scheme(&self) -> &'static str {
        match self {
            StoredPassword::Plaintext(_) => SCHEME_PLAIN,
            StoredPassword::Hashed(_) => SCHEME_ARGON2,
        }
    }

    pub fn value(&self) -> &str {
        match self {
            StoredPassword::Plaintext(v) | StoredPassword::Hashed(v) => v,
        }
    }

    pub fn from_parts(scheme: &str, value: String) -> anyhow::Result<Self> {
        match scheme {
            SCHEME_PLAIN => Ok(StoredPassword::Plaintext(value)),
            SCHEME_ARGON2 => Ok(StoredPassword::Hashed(value)),
            other => anyhow::bail!("unknown password scheme {:?}", other),
        }
    }

    pub fn is_hashed(&self) -> bool {
        matches!(self, StoredPassword::Hashed(_))
    }
}

impl fmt::Debug for StoredPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StoredPassword({}, <redacted>)", self.scheme())
    }
}

/// User record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password: StoredPassword,
    pub created_at: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: StoredPassword,
}

/// Row shape shared by both SQL backends.
#[derive(Debug, FromRow)]
pub(crate) struct UserRow {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password: String,
    pub password_scheme: String,
    pub created_at: Option<String>,
}

impl TryFrom<UserRow> for User {
    type Error = anyhow::Error;

    fn try_from(r: UserRow) -> anyhow::Result<Self> {
        Ok(Self {
            id: r.id,
            username: r.username,
            email: r.email,
            password: StoredPassword::from_parts(&r.password_scheme, r.password)?,
            created_at: r.created_at,
        })
    }
}
