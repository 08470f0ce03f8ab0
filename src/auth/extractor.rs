// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractor for authenticated principals.
//!
//! Use the `Auth` extractor in handlers to require authentication:
//!
//! ```rust,ignore
//! async fn my_handler(Auth(principal_id): Auth) -> impl IntoResponse {
//!     // principal_id is the verified token subject
//! }
//! ```

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use super::PrincipalId;
use crate::error::ApiError;
use crate::state::AppState;

/// Extractor for the authenticated principal.
///
/// A missing or non-UTF-8 `Authorization` header is treated as an empty
/// credential, which fails verification like any other bad token.
pub struct Auth(pub PrincipalId);

impl FromRequestParts<AppState> for Auth {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let raw_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();

        let principal_id = state.gateway.authenticate(raw_header)?;
        Ok(Auth(principal_id))
    }
}
