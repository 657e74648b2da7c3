/// Password hashing and verification using Argon2id
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("password hashing failed: {0}")]
    Hashing(String),

    #[error("invalid password hash format: {0}")]
    MalformedHash(String),
}

/// Argon2id hasher with fixed cost parameters
///
/// ## Security
///
/// - Algorithm: Argon2id v0x13
/// - Salt: random 16-byte salt from the OS RNG, generated per password
/// - Cost: `Params::DEFAULT` (19 MiB memory, 2 passes, 1 lane); never
///   influenced by request data
///
/// Output is a PHC string (`$argon2id$v=19$m=...`), so verification reads the
/// parameters and salt back out of the stored hash.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    params: Params,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self {
            params: Params::DEFAULT,
        }
    }
}

impl PasswordHasher {
    pub fn new(params: Params) -> Self {
        Self { params }
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Hash a plaintext password
    ///
    /// ## Returns
    ///
    /// PHC-formatted hash bytes safe for storage
    pub fn hash(&self, password: &str) -> Result<Vec<u8>, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);

        let hash = self
            .argon2()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| PasswordError::Hashing(e.to_string()))?;

        Ok(hash.to_string().into_bytes())
    }

    /// Verify a password against a stored hash
    ///
    /// Uses constant-time comparison. Returns `Ok(false)` on mismatch and an
    /// error only when `hash` cannot be parsed.
    pub fn verify(&self, hash: &[u8], password: &str) -> Result<bool, PasswordError> {
        let encoded = std::str::from_utf8(hash)
            .map_err(|e| PasswordError::MalformedHash(e.to_string()))?;
        let parsed = PasswordHash::new(encoded)
            .map_err(|e| PasswordError::MalformedHash(e.to_string()))?;

        match self.argon2().verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(PasswordError::MalformedHash(e.to_string())),
        }
    }

    /// Spend the work of one `verify` when there is no stored hash to check
    ///
    /// Keeps a lookup miss as slow as a wrong password.
    pub fn verify_absent(&self, password: &str) {
        let salt = SaltString::generate(&mut OsRng);
        let _ = self.argon2().hash_password(password.as_bytes(), &salt);
    }
}
