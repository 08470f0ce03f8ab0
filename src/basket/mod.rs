// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Basket Module
//!
//! Baskets are per-user JSON payloads with a two-state lifecycle:
//!
//! ```text
//! PENDING ──update──▶ PENDING
//!    │
//!    └────update────▶ COMPLETED   (terminal: no further updates)
//! ```
//!
//! A basket may be created directly in either state. Deletion is allowed from
//! both states.

pub mod error;
pub mod lifecycle;

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::PrincipalId;

pub use error::BasketError;
pub use lifecycle::BasketLifecycle;

/// Basket identifier.
pub type BasketId = u64;

/// Opaque basket payload. The service never inspects its contents.
pub type BasketData = serde_json::Map<String, serde_json::Value>;

/// Basket lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BasketState {
    /// Still open for updates
    Pending,
    /// Terminal; the basket can only be read or deleted
    Completed,
}

impl BasketState {
    pub fn as_str(&self) -> &'static str {
        match self {
            BasketState::Pending => "PENDING",
            BasketState::Completed => "COMPLETED",
        }
    }

    /// Whether no further updates are allowed from this state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, BasketState::Completed)
    }

    /// Whether an update may move a basket from `self` to `target`.
    pub fn can_transition_to(&self, target: BasketState) -> bool {
        match (self, target) {
            (BasketState::Pending, _) => true,
            (BasketState::Completed, _) => false,
        }
    }
}

impl fmt::Display for BasketState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BasketState {
    type Err = BasketError;

    /// Exact, case-sensitive match on `PENDING` / `COMPLETED`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(BasketState::Pending),
            "COMPLETED" => Ok(BasketState::Completed),
            _ => Err(BasketError::InvalidState),
        }
    }
}

/// A basket as persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Basket {
    pub id: BasketId,
    /// Creator; fixed for the basket's lifetime
    pub owner_id: PrincipalId,
    pub data: BasketData,
    pub state: BasketState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Bumped on every successful update; used for conditional writes
    #[serde(default)]
    pub version: u64,
}
