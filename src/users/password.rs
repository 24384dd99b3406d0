use argon2::{
    password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use rand::rngs::OsRng;
use tracing::{debug, error};

use crate::config::HashConfig;
use crate::users::error::UserError;

/// One-way, salted password hashing.
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, plain: &str) -> Result<String, UserError>;

    /// `false` for a mismatch and for any hash that fails to parse.
    fn verify(&self, stored_hash: &str, candidate: &str) -> bool;
}

/// Argon2id with a fixed work factor.
#[derive(Clone)]
pub struct Argon2Hasher {
    params: Params,
}

impl Argon2Hasher {
    pub fn new(config: &HashConfig) -> Result<Self, UserError> {
        let params = Params::new(
            config.memory_kib,
            config.iterations,
            config.parallelism,
            None,
        )
        .map_err(|e| UserError::Hash(e.into()))?;
        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }
}

impl Default for Argon2Hasher {
    fn default() -> Self {
        Self {
            params: Params::default(),
        }
    }
}

impl PasswordHasher for Argon2Hasher {
    fn hash(&self, plain: &str) -> Result<String, UserError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2()
            .hash_password(plain.as_bytes(), &salt)
            .map_err(|e| {
                error!(error = %e, "argon2 hash_password error");
                UserError::Hash(e)
            })?
            .to_string();
        Ok(hash)
    }

    fn verify(&self, stored_hash: &str, candidate: &str) -> bool {
        let parsed = match PasswordHash::new(stored_hash) {
            Ok(p) => p,
            Err(e) => {
                debug!(error = %e, "stored hash does not parse");
                return false;
            }
        };
        // Parameters come from the stored hash, so hashes made under an
        // older work factor keep verifying.
        Argon2::default()
            .verify_password(candidate.as_bytes(), &parsed)
            .is_ok()
    }
}

#[cfg(test)]
pub(crate) fn test_hasher() -> Argon2Hasher {
    Argon2Hasher::new(&HashConfig {
        memory_kib: 1024,
        iterations: 1,
        parallelism: 1,
    })
    .expect("valid test params")
}
