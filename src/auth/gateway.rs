// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Resolve the authenticated principal from a raw authorization header value.

use std::sync::Arc;

use super::{AuthError, PrincipalId, TokenService};

/// Bearer scheme prefix expected in the authorization header.
pub const BEARER_PREFIX: &str = "sso-jwt ";

/// Strip the bearer prefix. A header without it yields an empty token.
pub fn extract_token(raw_header: &str) -> &str {
    raw_header.strip_prefix(BEARER_PREFIX).unwrap_or_default()
}

/// Stateless front door to [`TokenService::verify`].
#[derive(Clone)]
pub struct AuthGateway {
    tokens: Arc<TokenService>,
}

impl AuthGateway {
    pub fn new(tokens: Arc<TokenService>) -> Self {
        Self { tokens }
    }

    /// Authenticate a raw `Authorization` header value.
    pub fn authenticate(&self, raw_header: &str) -> Result<PrincipalId, AuthError> {
        self.tokens.verify(extract_token(raw_header))
    }
}
