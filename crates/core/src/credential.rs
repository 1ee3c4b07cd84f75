use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use rand_core::OsRng;
use thiserror::Error;

/// Errors raised while hashing an access password.
#[derive(Debug, Error)]
pub enum CredentialError {
    /// The hasher parameters are invalid.
    #[error("invalid hasher parameters: {0}")]
    InvalidParams(String),

    /// Hashing failed.
    #[error("password hashing failed: {0}")]
    Hash(String),
}

/// One-way hashing of drop access passwords.
pub trait CredentialHasher: Send + Sync {
    /// Hash a plaintext password into a self-describing hash string.
    fn hash(&self, plaintext: &str) -> Result<String, CredentialError>;

    /// Verify a candidate password against a stored hash.
    ///
    /// Returns `false` for a mismatch and for a malformed hash.
    fn verify(&self, plaintext: &str, hash: &str) -> bool;
}

/// Argon2id [`CredentialHasher`] producing PHC-format strings.
#[derive(Debug, Clone, Default)]
pub struct Argon2Hasher {
    params: Option<Params>,
}

impl Argon2Hasher {
    /// Hasher with the argon2 crate's default cost parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Hasher with explicit cost parameters (memory in KiB, iterations,
    /// parallelism).
    pub fn with_params(m_cost: u32, t_cost: u32, p_cost: u32) -> Result<Self, CredentialError> {
        let params = Params::new(m_cost, t_cost, p_cost, None)
            .map_err(|e| CredentialError::InvalidParams(e.to_string()))?;
        Ok(Self {
            params: Some(params),
        })
    }

    fn argon2(&self) -> Argon2<'static> {
        match self.params {
            Some(ref params) => Argon2::new(Algorithm::Argon2id, Version::V0x13, params.clone()),
            None => Argon2::default(),
        }
    }
}

impl CredentialHasher for Argon2Hasher {
    fn hash(&self, plaintext: &str) -> Result<String, CredentialError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2()
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|e| CredentialError::Hash(e.to_string()))?;
        Ok(hash.to_string())
    }

    fn verify(&self, plaintext: &str, hash: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(hash) else {
            return false;
        };
        // Cost parameters are read back from the PHC string.
        Argon2::default()
            .verify_password(plaintext.as_bytes(), &parsed)
            .is_ok()
    }
}
