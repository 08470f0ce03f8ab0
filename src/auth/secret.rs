// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Process-wide token signing secret.
//!
//! The secret lives only in memory. Restarting the process generates a new one,
//! which makes every token issued before the restart unverifiable; clients
//! simply log in again.

use std::fmt;
use std::sync::OnceLock;

use rand::{distributions::Alphanumeric, Rng};

/// Length of the signing secret in bytes.
pub const SECRET_LEN: usize = 16;

static PROCESS_SECRET: OnceLock<SigningSecret> = OnceLock::new();

/// HMAC key used to sign session tokens.
#[derive(Clone, PartialEq, Eq)]
pub struct SigningSecret([u8; SECRET_LEN]);

impl SigningSecret {
    /// Wrap raw key bytes.
    pub fn from_bytes(bytes: [u8; SECRET_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for SigningSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SigningSecret(<redacted>)")
    }
}

/// Owner of the process-wide [`SigningSecret`].
pub struct SecretKeyManager;

impl SecretKeyManager {
    /// Draw a fresh secret of [`SECRET_LEN`] symbols from `[A-Za-z0-9]`.
    pub fn generate() -> SigningSecret {
        let mut rng = rand::thread_rng();
        let mut bytes = [0u8; SECRET_LEN];
        for byte in bytes.iter_mut() {
            *byte = rng.sample(Alphanumeric);
        }
        SigningSecret(bytes)
    }

    /// Initialize the process secret on first call and return it.
    ///
    /// Later calls return the same secret; it is never reassigned for the
    /// lifetime of the process.
    pub fn init() -> &'static SigningSecret {
        PROCESS_SECRET.get_or_init(|| {
            tracing::info!("Generating process signing secret");
            Self::generate()
        })
    }
}
