//! bcrypt helpers, run on the blocking pool so hashing never stalls a worker.

use crate::error::{AuthError, Result};
use crate::validation::PASSWORD_MAX_BYTES;
use bcrypt::{hash, verify};

/// Refuses input bcrypt would truncate, so every byte of the password counts.
pub async fn hash_password(password: &str, cost: u32) -> Result<String> {
    if password.len() > PASSWORD_MAX_BYTES {
        return Err(AuthError::InvalidField(format!(
            "The password must be at most {PASSWORD_MAX_BYTES} bytes long"
        )));
    }
    let password = password.to_string();
    tokio::task::spawn_blocking(move || hash(&password, cost))
        .await
        .map_err(|e| AuthError::Hash(format!("spawn_blocking failed: {}", e)))?
        .map_err(|e| AuthError::Hash(format!("bcrypt hash failed: {}", e)))
}

/// Constant-time comparison of `password` against a stored bcrypt hash.
pub async fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let password = password.to_string();
    let hash = hash.to_string();
    tokio::task::spawn_blocking(move || verify(&password, &hash))
        .await
        .map_err(|e| AuthError::Hash(format!("spawn_blocking failed: {}", e)))?
        .map_err(|e| AuthError::Hash(format!("bcrypt verify failed: {}", e)))
}
