// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! HTTP error mapping.
//!
//! Domain errors carry no transport details; this is the only place they are
//! turned into status codes. Internal failures are logged here and answered
//! with a fixed message.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::accounts::AccountError;
use crate::auth::AuthError;
use crate::basket::BasketError;

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }

    /// Log `source` and answer with a generic 500.
    pub fn internal(source: &dyn std::error::Error) -> Self {
        let cause = source.source().map(ToString::to_string).unwrap_or_default();
        tracing::error!(error = %source, cause = %cause, "Internal failure");
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidToken => Self::unauthorized(err.to_string()),
            AuthError::SigningFailure => Self::internal(&err),
        }
    }
}

impl From<BasketError> for ApiError {
    fn from(err: BasketError) -> Self {
        match err {
            BasketError::InvalidState => Self::bad_request(err.to_string()),
            BasketError::NotFoundOrForbidden => Self::not_found(err.to_string()),
            BasketError::RestrictedUpdate | BasketError::UpdateConflict => {
                Self::conflict(err.to_string())
            }
            BasketError::Store(_) => Self::internal(&err),
        }
    }
}

impl From<AccountError> for ApiError {
    fn from(err: AccountError) -> Self {
        match err {
            AccountError::MissingUsername | AccountError::MissingPassword => {
                Self::bad_request(err.to_string())
            }
            AccountError::UsernameTaken => Self::conflict(err.to_string()),
            AccountError::InvalidCredentials => Self::unauthorized(err.to_string()),
            AccountError::Token(inner) => inner.into(),
            AccountError::Hashing(_) | AccountError::Store(_) => Self::internal(&err),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            error: self.message,
        });
        (self.status, body).into_response()
    }
}
