//! Password hashing with argon2id.
//!
//! Hashes are PHC strings (`$argon2id$v=19$...`) that embed their own random
//! salt and parameters, so only the string needs to be stored.

use chirp_core::ServiceError;

/// Hash a plain password with argon2id and a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, ServiceError> {
    use argon2::Argon2;
    use password_hash::rand_core::OsRng;
    use password_hash::{PasswordHasher, SaltString};

    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| ServiceError::Internal(format!("hash password: {}", e)))
}

/// Verify a password against an argon2id hash. A malformed hash never verifies.
pub fn verify_password(password: &str, hash: &str) -> bool {
    use argon2::Argon2;
    use password_hash::{PasswordHash, PasswordVerifier};

    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}
