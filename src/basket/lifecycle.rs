// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Ownership and state-transition enforcement for baskets.

use std::sync::Arc;

use chrono::Utc;

use super::{Basket, BasketData, BasketError, BasketId, BasketState};
use crate::auth::PrincipalId;
use crate::storage::ResourceStore;

/// Basket operations scoped to the requesting principal.
///
/// Every read, update and delete takes the caller's principal id. The store
/// filters on it, so a foreign basket surfaces as
/// [`BasketError::NotFoundOrForbidden`], the same as a missing one.
#[derive(Clone)]
pub struct BasketLifecycle {
    store: Arc<dyn ResourceStore>,
}

impl BasketLifecycle {
    pub fn new(store: Arc<dyn ResourceStore>) -> Self {
        Self { store }
    }

    /// Create a basket in the caller-supplied initial state.
    ///
    /// # Errors
    /// `InvalidState` if `initial_state` is not `PENDING` or `COMPLETED`;
    /// nothing is written in that case.
    pub fn create(
        &self,
        owner_id: PrincipalId,
        data: BasketData,
        initial_state: &str,
    ) -> Result<BasketId, BasketError> {
        let state: BasketState = initial_state.parse()?;
        let id = self.store.insert_basket(owner_id, &data, state, Utc::now())?;

        tracing::debug!(basket_id = id, owner_id, state = %state, "Basket created");
        Ok(id)
    }

    /// Fetch one of the caller's baskets.
    pub fn get(&self, owner_id: PrincipalId, basket_id: BasketId) -> Result<Basket, BasketError> {
        self.store
            .get_basket(basket_id, owner_id)?
            .ok_or(BasketError::NotFoundOrForbidden)
    }

    /// All of the caller's baskets, ordered by id.
    pub fn list(&self, owner_id: PrincipalId) -> Result<Vec<Basket>, BasketError> {
        Ok(self.store.list_baskets(owner_id)?)
    }

    /// Replace a basket's data and state.
    ///
    /// The write is a single conditional store operation guarded by owner,
    /// non-terminal state and the version observed just before. When it
    /// affects no row, the basket is re-read only to pick the error kind.
    pub fn update(
        &self,
        owner_id: PrincipalId,
        basket_id: BasketId,
        data: BasketData,
        requested_state: &str,
    ) -> Result<(), BasketError> {
        let target: BasketState = requested_state.parse()?;

        let snapshot = self
            .store
            .select_basket_state(basket_id, owner_id)?
            .ok_or(BasketError::NotFoundOrForbidden)?;

        if !snapshot.state.can_transition_to(target) {
            return Err(BasketError::RestrictedUpdate);
        }

        let affected = self.store.conditional_update_basket(
            basket_id,
            owner_id,
            snapshot.version,
            &data,
            target,
            Utc::now(),
        )?;

        if affected == 1 {
            tracing::debug!(basket_id, owner_id, state = %target, "Basket updated");
            return Ok(());
        }

        let err = match self.store.select_basket_state(basket_id, owner_id)? {
            None => BasketError::NotFoundOrForbidden,
            Some(current) if current.state.is_terminal() => BasketError::RestrictedUpdate,
            Some(_) => BasketError::UpdateConflict,
        };
        tracing::warn!(basket_id, owner_id, error = %err, "Basket update lost a concurrent race");
        Err(err)
    }

    /// Delete one of the caller's baskets, in any state.
    pub fn delete(&self, owner_id: PrincipalId, basket_id: BasketId) -> Result<(), BasketError> {
        match self.store.delete_basket(basket_id, owner_id)? {
            0 => Err(BasketError::NotFoundOrForbidden),
            _ => {
                tracing::debug!(basket_id, owner_id, "Basket deleted");
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use chrono::DateTime;
    use serde_json::json;

    use crate::storage::{BasketDatabase, BasketSnapshot, StoreResult, StoredUser};

    const OWNER: PrincipalId = 1;
    const OTHER: PrincipalId = 2;

    fn data(value: serde_json::Value) -> BasketData {
        value.as_object().cloned().unwrap()
    }

    fn lifecycle() -> (BasketLifecycle, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let db = BasketDatabase::open_in_dir(dir.path()).unwrap();
        (BasketLifecycle::new(Arc::new(db)), dir)
    }

    #[test]
    fn create_rejects_unknown_state_before_writing() {
        let (baskets, _dir) = lifecycle();

        let result = baskets.create(OWNER, data(json!({"qty": 1})), "ARCHIVED");
        assert!(matches!(result, Err(BasketError::InvalidState)));
        assert!(baskets.list(OWNER).unwrap().is_empty());
    }

    #[test]
    fn create_stores_exact_initial_state() {
        let (baskets, _dir) = lifecycle();

        let id = baskets.create(OWNER, data(json!({"qty": 1})), "PENDING").unwrap();
        let basket = baskets.get(OWNER, id).unwrap();
        assert_eq!(basket.state, BasketState::Pending);
        assert_eq!(basket.owner_id, OWNER);
        assert_eq!(basket.created_at, basket.updated_at);

        let done = baskets.create(OWNER, data(json!({})), "COMPLETED").unwrap();
        assert_eq!(baskets.get(OWNER, done).unwrap().state, BasketState::Completed);
    }

    #[test]
    fn pending_basket_accepts_pending_and_completed_updates() {
        let (baskets, _dir) = lifecycle();
        let id = baskets.create(OWNER, data(json!({"qty": 1})), "PENDING").unwrap();

        baskets.update(OWNER, id, data(json!({"qty": 2})), "PENDING").unwrap();
        let basket = baskets.get(OWNER, id).unwrap();
        assert_eq!(basket.data, data(json!({"qty": 2})));
        assert_eq!(basket.state, BasketState::Pending);
        assert!(basket.updated_at >= basket.created_at);

        baskets.update(OWNER, id, data(json!({"qty": 3})), "COMPLETED").unwrap();
        assert_eq!(baskets.get(OWNER, id).unwrap().state, BasketState::Completed);
    }

    #[test]
    fn completed_basket_rejects_every_update_but_allows_delete() {
        let (baskets, _dir) = lifecycle();
        let id = baskets.create(OWNER, data(json!({"qty": 1})), "COMPLETED").unwrap();

        for state in ["PENDING", "COMPLETED"] {
            let result = baskets.update(OWNER, id, data(json!({"qty": 9})), state);
            assert!(matches!(result, Err(BasketError::RestrictedUpdate)));
        }
        assert_eq!(baskets.get(OWNER, id).unwrap().data, data(json!({"qty": 1})));

        baskets.delete(OWNER, id).unwrap();
        assert!(matches!(baskets.get(OWNER, id), Err(BasketError::NotFoundOrForbidden)));
    }

    #[test]
    fn update_validates_state_before_ownership() {
        let (baskets, _dir) = lifecycle();
        let id = baskets.create(OWNER, data(json!({})), "PENDING").unwrap();

        let result = baskets.update(OTHER, id, data(json!({})), "DONE");
        assert!(matches!(result, Err(BasketError::InvalidState)));
    }

    #[test]
    fn foreign_basket_looks_like_missing_basket() {
        let (baskets, _dir) = lifecycle();
        let id = baskets.create(OWNER, data(json!({"qty": 2})), "PENDING").unwrap();
        let missing = id + 100;

        for target in [id, missing] {
            assert!(matches!(baskets.get(OTHER, target), Err(BasketError::NotFoundOrForbidden)));
            assert!(matches!(
                baskets.update(OTHER, target, data(json!({})), "COMPLETED"),
                Err(BasketError::NotFoundOrForbidden)
            ));
            assert!(matches!(
                baskets.delete(OTHER, target),
                Err(BasketError::NotFoundOrForbidden)
            ));
        }

        // Untouched for the real owner
        let basket = baskets.get(OWNER, id).unwrap();
        assert_eq!(basket.state, BasketState::Pending);
        assert_eq!(basket.data, data(json!({"qty": 2})));
    }

    #[test]
    fn list_is_filtered_by_owner() {
        let (baskets, _dir) = lifecycle();
        baskets.create(OWNER, data(json!({"n": 1})), "PENDING").unwrap();
        baskets.create(OTHER, data(json!({"n": 2})), "PENDING").unwrap();
        baskets.create(OWNER, data(json!({"n": 3})), "COMPLETED").unwrap();

        let owned = baskets.list(OWNER).unwrap();
        assert_eq!(owned.len(), 2);
        assert!(owned.iter().all(|b| b.owner_id == OWNER));
        assert_eq!(baskets.list(OTHER).unwrap().len(), 1);
    }

    #[test]
    fn concurrent_completions_have_exactly_one_winner() {
        let (baskets, _dir) = lifecycle();
        let id = baskets.create(OWNER, data(json!({"qty": 0})), "PENDING").unwrap();

        let handles: Vec<_> = (0..8)
            .map(|n| {
                let baskets = baskets.clone();
                std::thread::spawn(move || {
                    baskets.update(OWNER, id, data(json!({"qty": n})), "COMPLETED")
                })
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let winners = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(winners, 1);
        assert!(results.iter().all(|r| matches!(
            r,
            Ok(()) | Err(BasketError::RestrictedUpdate) | Err(BasketError::UpdateConflict)
        )));
        assert_eq!(baskets.get(OWNER, id).unwrap().state, BasketState::Completed);
    }

    type Interleaved = Box<dyn FnOnce(&BasketDatabase) + Send>;

    /// Store that lets another writer commit between the lifecycle's
    /// snapshot read and its conditional write.
    struct RacingStore {
        inner: BasketDatabase,
        interleave: Mutex<Option<Interleaved>>,
    }

    impl RacingStore {
        fn racing(inner: BasketDatabase, competitor: Interleaved) -> Self {
            Self {
                inner,
                interleave: Mutex::new(Some(competitor)),
            }
        }
    }

    impl ResourceStore for RacingStore {
        fn find_user_by_username(&self, username: &str) -> StoreResult<Option<StoredUser>> {
            self.inner.find_user_by_username(username)
        }

        fn insert_user(&self, username: &str, credential_hash: &str) -> StoreResult<PrincipalId> {
            self.inner.insert_user(username, credential_hash)
        }

        fn insert_basket(
            &self,
            owner_id: PrincipalId,
            data: &BasketData,
            state: BasketState,
            now: DateTime<Utc>,
        ) -> StoreResult<BasketId> {
            self.inner.insert_basket(owner_id, data, state, now)
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
            if let Some(competitor) = self.interleave.lock().unwrap().take() {
                competitor(&self.inner);
            }
            self.inner
                .conditional_update_basket(basket_id, owner_id, expected_version, data, state, now)
        }

        fn select_basket_state(
            &self,
            basket_id: BasketId,
            owner_id: PrincipalId,
        ) -> StoreResult<Option<BasketSnapshot>> {
            self.inner.select_basket_state(basket_id, owner_id)
        }

        fn get_basket(&self, basket_id: BasketId, owner_id: PrincipalId) -> StoreResult<Option<Basket>> {
            self.inner.get_basket(basket_id, owner_id)
        }

        fn delete_basket(&self, basket_id: BasketId, owner_id: PrincipalId) -> StoreResult<u64> {
            self.inner.delete_basket(basket_id, owner_id)
        }

        fn list_baskets(&self, owner_id: PrincipalId) -> StoreResult<Vec<Basket>> {
            self.inner.list_baskets(owner_id)
        }
    }

    fn racing_lifecycle(
        initial: &str,
        competing_state: BasketState,
    ) -> (BasketLifecycle, BasketId, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let db = BasketDatabase::open_in_dir(dir.path()).unwrap();
        let id = db
            .insert_basket(OWNER, &data(json!({"qty": 2})), initial.parse().unwrap(), Utc::now())
            .unwrap();

        let competitor: Interleaved = Box::new(move |db: &BasketDatabase| {
            let affected = db
                .conditional_update_basket(id, OWNER, 0, &data(json!({"qty": 5})), competing_state, Utc::now())
                .unwrap();
            assert_eq!(affected, 1);
        });
        let store = RacingStore::racing(db, competitor);
        (BasketLifecycle::new(Arc::new(store)), id, dir)
    }

    #[test]
    fn pending_update_loses_to_concurrent_completion() {
        let (baskets, id, _dir) = racing_lifecycle("PENDING", BasketState::Completed);

        let result = baskets.update(OWNER, id, data(json!({"qty": 3})), "PENDING");
        assert!(matches!(result, Err(BasketError::RestrictedUpdate)));

        let basket = baskets.get(OWNER, id).unwrap();
        assert_eq!(basket.state, BasketState::Completed);
        assert_eq!(basket.data, data(json!({"qty": 5})));
    }

    #[test]
    fn completion_loses_to_concurrent_pending_update() {
        let (baskets, id, _dir) = racing_lifecycle("PENDING", BasketState::Pending);

        let result = baskets.update(OWNER, id, data(json!({"qty": 3})), "COMPLETED");
        assert!(matches!(result, Err(BasketError::UpdateConflict)));

        let basket = baskets.get(OWNER, id).unwrap();
        assert_eq!(basket.state, BasketState::Pending);
        assert_eq!(basket.data, data(json!({"qty": 5})));
    }
}
