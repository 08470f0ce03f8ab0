// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Account registration and login.

use std::sync::{Arc, OnceLock};

use crate::auth::{AuthError, CredentialError, CredentialHasher, PrincipalId, TokenService};
use crate::storage::{ResourceStore, StoreError};

/// Errors returned by [`AccountService`].
#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    #[error("missing username")]
    MissingUsername,

    #[error("missing password")]
    MissingPassword,

    #[error("previously used username")]
    UsernameTaken,

    /// Unknown username or wrong password; the two are not distinguished
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("credential hashing failed")]
    Hashing(#[from] CredentialError),

    #[error("could not operate on token")]
    Token(#[from] AuthError),

    #[error("storage failure")]
    Store(#[source] StoreError),
}

impl From<StoreError> for AccountError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict => AccountError::UsernameTaken,
            other => AccountError::Store(other),
        }
    }
}

/// Registration and login on top of the store, hasher and token service.
#[derive(Clone)]
pub struct AccountService {
    store: Arc<dyn ResourceStore>,
    hasher: Arc<dyn CredentialHasher>,
    tokens: Arc<TokenService>,
    /// Hash checked against when the username is unknown, so both login
    /// failures cost one `verify`.
    decoy_hash: Arc<OnceLock<String>>,
}

impl AccountService {
    pub fn new(
        store: Arc<dyn ResourceStore>,
        hasher: Arc<dyn CredentialHasher>,
        tokens: Arc<TokenService>,
    ) -> Self {
        Self {
            store,
            hasher,
            tokens,
            decoy_hash: Arc::new(OnceLock::new()),
        }
    }

    fn decoy_hash(&self) -> &str {
        self.decoy_hash
            .get_or_init(|| self.hasher.hash("decoy-credential").unwrap_or_default())
    }

    /// Register a new principal.
    ///
    /// # Errors
    /// `MissingUsername`/`MissingPassword` for empty input, `UsernameTaken`
    /// if the username is already registered.
    pub fn register(&self, username: &str, password: &str) -> Result<PrincipalId, AccountError> {
        if username.is_empty() {
            return Err(AccountError::MissingUsername);
        }
        if password.is_empty() {
            return Err(AccountError::MissingPassword);
        }

        let credential_hash = self.hasher.hash(password)?;
        let id = self.store.insert_user(username, &credential_hash)?;

        tracing::info!(user_id = id, "User registered");
        Ok(id)
    }

    /// Check credentials and issue a session token.
    pub fn login(&self, username: &str, password: &str) -> Result<String, AccountError> {
        let Some(user) = self.store.find_user_by_username(username)? else {
            self.hasher.verify(password, self.decoy_hash());
            return Err(AccountError::InvalidCredentials);
        };

        if !self.hasher.verify(password, &user.credential_hash) {
            tracing::debug!(user_id = user.id, "Login rejected");
            return Err(AccountError::InvalidCredentials);
        }

        let token = self.tokens.issue(user.id)?;
        tracing::info!(user_id = user.id, "User logged in");
        Ok(token)
    }
}
