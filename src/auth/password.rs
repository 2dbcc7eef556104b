// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Password hashing and verification (Argon2id, PHC string format).
//!
//! Stored hashes look like `$argon2id$v=19$m=19456,t=2,p=1$<salt>$<hash>`.
//! Verification reads the parameters from the stored hash, so changing the
//! configured work factor does not invalidate existing accounts.

use argon2::{
    password_hash::{
        rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString,
    },
    Algorithm, Argon2, Params, Version,
};

use crate::config::HashingConfig;

/// Structural prefix every stored hash must carry.
const HASH_PREFIX: &str = "$argon2";

#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    /// Stored hash is not an Argon2 PHC string.
    #[error("stored password hash is malformed")]
    MalformedHash,

    #[error("invalid argon2 parameters: {0}")]
    InvalidParams(String),

    #[error("password hashing failed: {0}")]
    Hashing(String),
}

/// Argon2id hasher configured with the process-wide work factor.
pub struct PasswordHasher {
    argon2: Argon2<'static>,
}

impl PasswordHasher {
    /// Build a hasher from the configured work factor.
    pub fn new(config: &HashingConfig) -> Result<Self, PasswordError> {
        let params = Params::new(config.memory_kib, config.iterations, config.parallelism, None)
            .map_err(|e| PasswordError::InvalidParams(e.to_string()))?;

        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    /// Hash a plaintext password with a fresh random salt.
    pub fn hash(&self, plaintext: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2
            .hash_password(plaintext.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| PasswordError::Hashing(e.to_string()))
    }

    /// Check a plaintext password against a stored hash.
    ///
    /// Returns `Ok(false)` on mismatch and [`PasswordError::MalformedHash`]
    /// when the stored value is not a usable Argon2 hash. Callers treat both
    /// as a failed verification.
    pub fn verify(&self, plaintext: &str, stored_hash: &str) -> Result<bool, PasswordError> {
        if !stored_hash.starts_with(HASH_PREFIX) {
            return Err(PasswordError::MalformedHash);
        }

        let parsed = PasswordHash::new(stored_hash).map_err(|_| PasswordError::MalformedHash)?;
        if parsed.salt.is_none() || parsed.hash.is_none() {
            return Err(PasswordError::MalformedHash);
        }

        match self.argon2.verify_password(plaintext.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(_) => Err(PasswordError::MalformedHash),
        }
    }
}

impl std::fmt::Debug for PasswordHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordHasher").finish_non_exhaustive()
    }
}
