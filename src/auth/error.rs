// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication errors.

/// Token service error type.
///
/// Every verification failure (bad encoding, bad signature, expiry, missing
/// subject) is reported as `InvalidToken`; the cause is only logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// Token could not be verified
    #[error("invalid token")]
    InvalidToken,
    /// Token could not be signed
    #[error("could not operate on token")]
    SigningFailure,
}
