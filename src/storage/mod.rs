// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Storage Module
//!
//! Persistence boundary for users and baskets.
//!
//! The rest of the crate talks to storage only through the [`ResourceStore`]
//! trait. [`BasketDatabase`] is the shipped implementation, backed by an
//! embedded redb file.
//!
//! ## Ownership
//!
//! Every basket query takes the requesting owner's id and filters on it inside
//! the store. A basket owned by someone else is reported exactly like a basket
//! that does not exist.
//!
//! ## Conditional writes
//!
//! `conditional_update_basket` evaluates its predicate (owner, non-terminal
//! state, expected version) inside the same write transaction that applies the
//! change. The returned row count is the only success signal.

pub mod database;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::PrincipalId;
use crate::basket::{Basket, BasketData, BasketId, BasketState};

pub use database::BasketDatabase;

/// Error type for storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("redb error: {0}")]
    Redb(#[from] redb::Error),

    #[error("redb database error: {0}")]
    RedbDatabase(#[from] redb::DatabaseError),

    #[error("redb transaction error: {0}")]
    RedbTransaction(#[from] redb::TransactionError),

    #[error("redb table error: {0}")]
    RedbTable(#[from] redb::TableError),

    #[error("redb storage error: {0}")]
    RedbStorage(#[from] redb::StorageError),

    #[error("redb commit error: {0}")]
    RedbCommit(#[from] redb::CommitError),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Username is already registered.
    #[error("username already in use")]
    Conflict,
}

/// Result type for storage operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// A registered principal as persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredUser {
    pub id: PrincipalId,
    pub username: String,
    /// Opaque credential hash (PHC string for the Argon2 hasher).
    pub credential_hash: String,
}

/// State and version of a basket as seen by its owner at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BasketSnapshot {
    pub state: BasketState,
    pub version: u64,
}

/// Persistence contract required by the account and basket services.
///
/// Implementations must be safe to share across request handlers.
pub trait ResourceStore: Send + Sync {
    /// Look up a user by exact username.
    fn find_user_by_username(&self, username: &str) -> StoreResult<Option<StoredUser>>;

    /// Register a new user.
    ///
    /// # Errors
    /// Returns `StoreError::Conflict` if the username is already used.
    fn insert_user(&self, username: &str, credential_hash: &str) -> StoreResult<PrincipalId>;

    /// Insert a basket owned by `owner_id` and return its new id.
    fn insert_basket(
        &self,
        owner_id: PrincipalId,
        data: &BasketData,
        state: BasketState,
        now: DateTime<Utc>,
    ) -> StoreResult<BasketId>;

    /// Apply `data`/`state`/`now` to a basket iff it is owned by `owner_id`,
    /// is not COMPLETED, and still has `expected_version`.
    ///
    /// Returns the number of rows affected (0 or 1). Zero covers not-found,
    /// foreign ownership, terminal state and lost races alike.
    fn conditional_update_basket(
        &self,
        basket_id: BasketId,
        owner_id: PrincipalId,
        expected_version: u64,
        data: &BasketData,
        state: BasketState,
        now: DateTime<Utc>,
    ) -> StoreResult<u64>;

    /// Current state and version of a basket owned by `owner_id`.
    fn select_basket_state(
        &self,
        basket_id: BasketId,
        owner_id: PrincipalId,
    ) -> StoreResult<Option<BasketSnapshot>>;

    /// Fetch a basket owned by `owner_id`.
    fn get_basket(&self, basket_id: BasketId, owner_id: PrincipalId) -> StoreResult<Option<Basket>>;

    /// Delete a basket owned by `owner_id`. Returns rows affected.
    fn delete_basket(&self, basket_id: BasketId, owner_id: PrincipalId) -> StoreResult<u64>;

    /// All baskets owned by `owner_id`, ordered by id.
    fn list_baskets(&self, owner_id: PrincipalId) -> StoreResult<Vec<Basket>>;
}
