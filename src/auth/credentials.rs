// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Credential hashing.
//!
//! Password storage policy sits behind [`CredentialHasher`] so the account
//! service never handles hash formats directly.

use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use password_hash::{PasswordHash, SaltString};
use rand::RngCore;

/// Credential hashing failed.
#[derive(Debug, thiserror::Error)]
#[error("credential hashing failed: {0}")]
pub struct CredentialError(String);

/// Hashes and checks passwords.
pub trait CredentialHasher: Send + Sync {
    /// Produce an opaque hash for storage.
    fn hash(&self, password: &str) -> Result<String, CredentialError>;

    /// Check `password` against a stored hash. Unparseable hashes never match.
    fn verify(&self, password: &str, credential_hash: &str) -> bool;
}

/// Argon2id with default parameters and a random 16-byte salt, stored as a PHC string.
#[derive(Debug, Default, Clone, Copy)]
pub struct Argon2Hasher;

impl CredentialHasher for Argon2Hasher {
    fn hash(&self, password: &str) -> Result<String, CredentialError> {
        let mut salt_bytes = [0u8; 16];
        rand::thread_rng().fill_bytes(&mut salt_bytes);
        let salt = SaltString::encode_b64(&salt_bytes).map_err(|e| CredentialError(e.to_string()))?;

        let phc = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| CredentialError(e.to_string()))?
            .to_string();
        Ok(phc)
    }

    fn verify(&self, password: &str, credential_hash: &str) -> bool {
        match PasswordHash::new(credential_hash) {
            Ok(parsed) => Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok(),
            Err(_) => false,
        }
    }
}
