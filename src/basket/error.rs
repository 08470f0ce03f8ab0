// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Basket lifecycle errors.

use crate::storage::StoreError;

/// Errors returned by [`super::BasketLifecycle`].
///
/// Messages are fixed strings; the store failure cause is only reachable
/// through `source()` for logging.
#[derive(Debug, thiserror::Error)]
pub enum BasketError {
    /// Requested state is not `PENDING` or `COMPLETED`
    #[error("invalid state")]
    InvalidState,

    /// Basket does not exist or belongs to another principal
    #[error("basket not found")]
    NotFoundOrForbidden,

    /// Basket is COMPLETED and cannot be updated
    #[error("basket has been completed and can no longer be updated")]
    RestrictedUpdate,

    /// A concurrent update won the race for the same basket version
    #[error("basket was modified concurrently")]
    UpdateConflict,

    /// Underlying store failed
    #[error("storage failure")]
    Store(#[from] StoreError),
}
