// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session token claims.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Principal (user) identifier.
pub type PrincipalId = u64;

/// Lifetime of a session token in seconds.
pub const TOKEN_TTL_SECS: i64 = 60 * 60;

/// Claims carried by every session token.
///
/// `sub` holds the principal id in decimal, as JWT subjects are strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject (principal id)
    pub sub: String,
    /// Issued at (Unix seconds)
    pub iat: i64,
    /// Expiration (Unix seconds), always `iat + TOKEN_TTL_SECS`
    pub exp: i64,
}

impl SessionClaims {
    pub fn new(principal_id: PrincipalId, issued_at: DateTime<Utc>) -> Self {
        let iat = issued_at.timestamp();
        Self {
            sub: principal_id.to_string(),
            iat,
            exp: iat + TOKEN_TTL_SECS,
        }
    }

    /// Parsed subject, or `None` if it is not a principal id.
    pub fn principal_id(&self) -> Option<PrincipalId> {
        self.sub.parse().ok()
    }

    /// Whether the token is past its expiry at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() >= self.exp
    }
}
