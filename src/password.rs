use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use password_hash::{PasswordHash, SaltString};

use crate::error::ApiError;

/// hash_password
///
/// Derives an Argon2id hash over the plaintext with a fresh random 16-byte
/// salt and returns it as a PHC string. The PHC format is self-describing
/// (algorithm, parameters, salt and digest travel together), so verification
/// needs no out-of-band algorithm lookup and old hashes keep verifying after
/// a parameter upgrade. Hashing the same plaintext twice yields different
/// strings.
pub fn hash_password(plaintext: &str) -> Result<String, ApiError> {
    let mut salt_bytes = [0u8; 16];
    getrandom::getrandom(&mut salt_bytes).map_err(|e| ApiError::Hashing(e.to_string()))?;
    let salt =
        SaltString::encode_b64(&salt_bytes).map_err(|e| ApiError::Hashing(e.to_string()))?;
    let phc = Argon2::default()
        .hash_password(plaintext.as_bytes(), &salt)
        .map_err(|e| ApiError::Hashing(e.to_string()))?
        .to_string();
    Ok(phc)
}

/// verify_password
///
/// Recomputes and compares. A malformed stored hash verifies as false rather
/// than erroring, so a corrupted record cannot be told apart from a wrong
/// password by the caller.
pub fn verify_password(hash: &str, plaintext: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(plaintext.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}
