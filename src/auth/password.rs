use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use tracing::error;

use super::repo_types::StoredPassword;

/// Salted argon2 hash in PHC string form.
pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            anyhow::anyhow!(e.to_string())
        })?
        .to_string();
    Ok(hash)
}

pub fn verify_hash(plain: &str, hash: &str) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(hash).map_err(|e| {
        error!(error = %e, "argon2 parse hash error");
        anyhow::anyhow!(e.to_string())
    })?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}

/// Outcome of checking a candidate against a stored credential.
#[derive(Debug, PartialEq, Eq)]
pub enum Verification {
    Rejected,
    Accepted,
    /// Matched a legacy plain-text value; the caller should persist the new hash.
    AcceptedNeedsUpgrade(StoredPassword),
}

pub fn verify(plain: &str, stored: &StoredPassword) -> anyhow::Result<Verification> {
    match stored {
        StoredPassword::Hashed(hash) => Ok(if verify_hash(plain, hash)? {
            Verification::Accepted
        } else {
            Verification::Rejected
        }),
        StoredPassword::Plaintext(raw) => {
            if raw != plain {
                return Ok(Verification::Rejected);
            }
            let upgraded = StoredPassword::Hashed(hash_password(plain)?);
            Ok(Verification::AcceptedNeedsUpgrade(upgraded))
        }
    }
}
