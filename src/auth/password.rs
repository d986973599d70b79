use anyhow::anyhow;
use argon2::{
    password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::Rng;

use crate::AppResult;

pub(crate) fn hash(password: &str) -> anyhow::Result<String> {
    let mut salt = [0u8; 16];
    rand::rng().fill(&mut salt);
    let salt = SaltString::encode_b64(&salt).map_err(|e| anyhow!("bad salt: {e}"))?;

    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow!("couldn't hash password: {e}"))?;
    Ok(hash.to_string())
}

pub(crate) fn verify(password: &str, hash: &str) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(hash).map_err(|e| anyhow!("stored hash unreadable: {e}"))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(e) => Err(anyhow!("couldn't verify password: {e}")),
    }
}

// argon2 is deliberately slow; keep it off the async workers.

pub(crate) async fn hash_blocking(password: String) -> AppResult<String> {
    Ok(tokio::task::spawn_blocking(move || hash(&password)).await??)
}

pub(crate) async fn verify_blocking(password: String, hash: String) -> AppResult<bool> {
    Ok(tokio::task::spawn_blocking(move || verify(&password, &hash)).await??)
}
