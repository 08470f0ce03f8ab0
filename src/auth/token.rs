// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session token issuance and verification (HS256 JWT).

use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use super::claims::{PrincipalId, SessionClaims};
use super::secret::SigningSecret;
use super::AuthError;

/// Issues and verifies session tokens signed with the process secret.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenService {
    pub fn new(secret: &SigningSecret) -> Self {
        // Expiry is checked against the caller-supplied clock in `verify_at`
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Issue a token for `principal_id` valid for one hour from now.
    pub fn issue(&self, principal_id: PrincipalId) -> Result<String, AuthError> {
        self.issue_at(principal_id, Utc::now())
    }

    /// Issue a token as if the current time were `now`.
    pub fn issue_at(&self, principal_id: PrincipalId, now: DateTime<Utc>) -> Result<String, AuthError> {
        let claims = SessionClaims::new(principal_id, now);
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key).map_err(|e| {
            tracing::error!(error = %e, "Failed to sign session token");
            AuthError::SigningFailure
        })
    }

    /// Verify a token and return its principal.
    pub fn verify(&self, token: &str) -> Result<PrincipalId, AuthError> {
        self.verify_at(token, Utc::now())
    }

    /// Verify a token as if the current time were `now`.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<PrincipalId, AuthError> {
        let claims = decode::<SessionClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| {
                tracing::debug!(reason = ?e.kind(), "Rejected session token");
                AuthError::InvalidToken
            })?
            .claims;

        if claims.is_expired_at(now) {
            tracing::debug!(exp = claims.exp, "Rejected expired session token");
            return Err(AuthError::InvalidToken);
        }

        claims.principal_id().ok_or_else(|| {
            tracing::debug!("Rejected session token with non-numeric subject");
            AuthError::InvalidToken
        })
    }
}
