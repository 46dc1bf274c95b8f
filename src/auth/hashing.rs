//! Password hashing.
//!
//! New hashes are Argon2id. Hashes written by the previous bcrypt-based system
//! (`$2a$`, `$2b$`, `$2y$`) still verify so existing accounts can log in.

use std::sync::LazyLock;

use argon2::password_hash::{
    rand_core::OsRng, Error as PasswordHashError, PasswordHash, PasswordHasher, PasswordVerifier,
    SaltString,
};
use argon2::{Algorithm, Argon2, Params, Version};

use crate::errors::{DealershipError, Result};

/// Hash verified when the submitted email does not exist, so the failure
/// takes as long as a real comparison.
pub(crate) static DUMMY_HASH: LazyLock<String> = LazyLock::new(|| {
    hash_password("dummy_startup_value")
        .unwrap_or_else(|_| "$argon2id$v=19$m=8192,t=2,p=1$dW5rbm93bg$dW5rbm93bg".to_string())
});

pub fn password_hasher() -> Argon2<'static> {
    // Argon2id tuned for interactive logins: roughly tens of milliseconds per
    // hash on server hardware.
    const MEMORY_COST_KIB: u32 = 8 * 1024;
    const ITERATIONS: u32 = 2;
    const PARALLELISM: u32 = 1;
    let params = Params::new(MEMORY_COST_KIB, ITERATIONS, PARALLELISM, Some(32))
        .expect("valid Argon2 parameters");
    Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
}

/// Hash a plaintext password with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    password_hasher()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| DealershipError::internal(format!("Failed to hash password: {}", e)))
}

/// Compare a plaintext password against a stored hash in constant time.
///
/// Returns `Ok(false)` on mismatch; errors only when the stored hash is unreadable.
pub fn verify_password(password: &str, stored_hash: &str) -> Result<bool> {
    if is_bcrypt_hash(stored_hash) {
        return bcrypt::verify(password, stored_hash).map_err(|e| {
            DealershipError::internal(format!("Failed to verify legacy password hash: {}", e))
        });
    }

    let parsed = PasswordHash::new(stored_hash)
        .map_err(|e| DealershipError::internal(format!("Malformed password hash: {}", e)))?;

    match password_hasher().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(PasswordHashError::Password) => Ok(false),
        Err(e) => Err(DealershipError::internal(format!("Failed to verify password: {}", e))),
    }
}

fn is_bcrypt_hash(hash: &str) -> bool {
    ["$2a$", "$2b$", "$2y$"].iter().any(|prefix| hash.starts_with(prefix))
}
