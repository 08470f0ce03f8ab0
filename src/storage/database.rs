// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Embedded user and basket database backed by redb (pure Rust, ACID).
//!
//! ## Table Layout
//!
//! - `users`: username → serialized StoredUser
//! - `baskets`: basket_id → serialized Basket
//! - `owner_baskets`: (owner_id, basket_id) → () for owner-scoped listing
//! - `counters`: counter name → next id
//!
//! redb allows a single write transaction at a time, so every predicate checked
//! inside `begin_write()`..`commit()` holds at commit time.

use std::path::Path;

use chrono::{DateTime, Utc};
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition, WriteTransaction};

use super::{BasketSnapshot, ResourceStore, StoreError, StoreResult, StoredUser};
use crate::auth::PrincipalId;
use crate::basket::{Basket, BasketData, BasketId, BasketState};

// =============================================================================
// Table Definitions
// =============================================================================

/// Primary user table: username → serialized StoredUser (JSON bytes).
const USERS: TableDefinition<&str, &[u8]> = TableDefinition::new("users");

/// Primary basket table: basket_id → serialized Basket (JSON bytes).
const BASKETS: TableDefinition<u64, &[u8]> = TableDefinition::new("baskets");

/// Index: (owner_id, basket_id) → (). Range scans give one owner's baskets in id order.
const OWNER_BASKETS: TableDefinition<(u64, u64), ()> = TableDefinition::new("owner_baskets");

/// Id sequences: counter name → next id to hand out.
const COUNTERS: TableDefinition<&str, u64> = TableDefinition::new("counters");

const USER_ID_COUNTER: &str = "user_id";
const BASKET_ID_COUNTER: &str = "basket_id";

/// Default database file name inside the data directory.
pub const DATABASE_FILE: &str = "baskets.redb";

/// Take the next value of a named sequence. Ids start at 1.
fn next_id(txn: &WriteTransaction, counter: &str) -> StoreResult<u64> {
    let mut table = txn.open_table(COUNTERS)?;
    let next = table.get(counter)?.map(|v| v.value()).unwrap_or(1);
    table.insert(counter, next + 1)?;
    Ok(next)
}

// =============================================================================
// BasketDatabase
// =============================================================================

/// redb-backed implementation of [`ResourceStore`].
pub struct BasketDatabase {
    db: Database,
}

impl BasketDatabase {
    /// Open (or create) the database at the given path.
    pub fn open(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let db = Database::create(path)?;

        // Pre-create all tables so later read transactions don't fail
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(USERS)?;
            let _ = write_txn.open_table(BASKETS)?;
            let _ = write_txn.open_table(OWNER_BASKETS)?;
            let _ = write_txn.open_table(COUNTERS)?;
        }
        write_txn.commit()?;

        Ok(Self { db })
    }

    /// Open (or create) `baskets.redb` inside `data_dir`.
    pub fn open_in_dir(data_dir: &Path) -> StoreResult<Self> {
        Self::open(&data_dir.join(DATABASE_FILE))
    }

    /// Read a basket regardless of owner.
    fn read_basket(&self, basket_id: BasketId) -> StoreResult<Option<Basket>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(BASKETS)?;
        match table.get(basket_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }
}

impl ResourceStore for BasketDatabase {
    fn find_user_by_username(&self, username: &str) -> StoreResult<Option<StoredUser>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(USERS)?;
        match table.get(username)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    fn insert_user(&self, username: &str, credential_hash: &str) -> StoreResult<PrincipalId> {
        let write_txn = self.db.begin_write()?;
        let id = {
            let taken = write_txn.open_table(USERS)?.get(username)?.is_some();
            if taken {
                write_txn.abort()?;
                return Err(StoreError::Conflict);
            }

            let id = next_id(&write_txn, USER_ID_COUNTER)?;
            let user = StoredUser {
                id,
                username: username.to_string(),
                credential_hash: credential_hash.to_string(),
            };
            let json = serde_json::to_vec(&user)?;
            write_txn.open_table(USERS)?.insert(username, json.as_slice())?;
            id
        };
        write_txn.commit()?;
        Ok(id)
    }

    fn insert_basket(
        &self,
        owner_id: PrincipalId,
        data: &BasketData,
        state: BasketState,
        now: DateTime<Utc>,
    ) -> StoreResult<BasketId> {
        let write_txn = self.db.begin_write()?;
        let id = {
            let id = next_id(&write_txn, BASKET_ID_COUNTER)?;
            let basket = Basket {
                id,
                owner_id,
                data: data.clone(),
                state,
                created_at: now,
                updated_at: now,
                version: 0,
            };
            let json = serde_json::to_vec(&basket)?;

            write_txn.open_table(BASKETS)?.insert(id, json.as_slice())?;
            write_txn.open_table(OWNER_BASKETS)?.insert((owner_id, id), ())?;
            id
        };
        write_txn.commit()?;
        Ok(id)
    }

    fn conditional_update_basket(
        &self,
        basket_id: BasketId,
        owner_id: PrincipalId,
        expected_version: u64,
        data: &BasketData,
        state: BasketState,
        now: DateTime<Utc>,
    ) -> StoreResult<u64> {
        let write_txn = self.db.begin_write()?;
        let affected = {
            let mut table = write_txn.open_table(BASKETS)?;

            // Copy the existing bytes out before mutating the table
            let existing_bytes = match table.get(basket_id)? {
                Some(existing) => existing.value().to_vec(),
                None => Vec::new(),
            };

            if existing_bytes.is_empty() {
                0
            } else {
                let mut basket: Basket = serde_json::from_slice(&existing_bytes)?;
                if basket.owner_id != owner_id
                    || basket.state.is_terminal()
                    || basket.version != expected_version
                {
                    0
                } else {
                    basket.data = data.clone();
                    basket.state = state;
                    basket.updated_at = now.max(basket.updated_at);
                    basket.version += 1;

                    let json = serde_json::to_vec(&basket)?;
                    table.insert(basket_id, json.as_slice())?;
                    1
                }
            }
        };

        if affected == 0 {
            write_txn.abort()?;
        } else {
            write_txn.commit()?;
        }
        Ok(affected)
    }

    fn select_basket_state(
        &self,
        basket_id: BasketId,
        owner_id: PrincipalId,
    ) -> StoreResult<Option<BasketSnapshot>> {
        Ok(self.get_basket(basket_id, owner_id)?.map(|basket| BasketSnapshot {
            state: basket.state,
            version: basket.version,
        }))
    }

    fn get_basket(&self, basket_id: BasketId, owner_id: PrincipalId) -> StoreResult<Option<Basket>> {
        Ok(self
            .read_basket(basket_id)?
            .filter(|basket| basket.owner_id == owner_id))
    }

    fn delete_basket(&self, basket_id: BasketId, owner_id: PrincipalId) -> StoreResult<u64> {
        let write_txn = self.db.begin_write()?;
        let affected = {
            let mut table = write_txn.open_table(BASKETS)?;

            let owned = match table.get(basket_id)? {
                Some(existing) => {
                    let basket: Basket = serde_json::from_slice(existing.value())?;
                    basket.owner_id == owner_id
                }
                None => false,
            };

            if owned {
                table.remove(basket_id)?;
                write_txn
                    .open_table(OWNER_BASKETS)?
                    .remove((owner_id, basket_id))?;
                1
            } else {
                0
            }
        };

        if affected == 0 {
            write_txn.abort()?;
        } else {
            write_txn.commit()?;
        }
        Ok(affected)
    }

    fn list_baskets(&self, owner_id: PrincipalId) -> StoreResult<Vec<Basket>> {
        let read_txn = self.db.begin_read()?;
        let index = read_txn.open_table(OWNER_BASKETS)?;
        let baskets = read_txn.open_table(BASKETS)?;

        let mut results = Vec::new();
        for entry in index.range((owner_id, 0)..=(owner_id, u64::MAX))? {
            let (key, _) = entry?;
            let (_, basket_id) = key.value();
            if let Some(value) = baskets.get(basket_id)? {
                results.push(serde_json::from_slice(value.value())?);
            }
        }

        Ok(results)
    }
}
