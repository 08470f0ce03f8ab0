// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::accounts::AccountService;
use crate::auth::{Argon2Hasher, AuthGateway, SigningSecret, TokenService};
use crate::basket::BasketLifecycle;
use crate::storage::ResourceStore;

/// Shared handler state. Cheap to clone; everything inside is immutable or
/// synchronised by the store.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ResourceStore>,
    pub tokens: Arc<TokenService>,
    pub gateway: AuthGateway,
    pub accounts: AccountService,
    pub baskets: BasketLifecycle,
}

impl AppState {
    /// Wire services around a store and the process signing secret.
    pub fn new(store: Arc<dyn ResourceStore>, secret: &SigningSecret) -> Self {
        let tokens = Arc::new(TokenService::new(secret));
        Self {
            gateway: AuthGateway::new(tokens.clone()),
            accounts: AccountService::new(store.clone(), Arc::new(Argon2Hasher), tokens.clone()),
            baskets: BasketLifecycle::new(store.clone()),
            tokens,
            store,
        }
    }
}

#[cfg(test)]
impl AppState {
    /// State over a throwaway database with a fixed secret.
    pub fn for_tests() -> (Self, tempfile::TempDir) {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let store = crate::storage::BasketDatabase::open_in_dir(dir.path())
            .expect("Failed to open test database");
        let secret = SigningSecret::from_bytes(*b"test-secret-0001");
        (Self::new(Arc::new(store), &secret), dir)
    }
}
