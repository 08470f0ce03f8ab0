// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Session tokens for the Basket Manager API.
//!
//! ## Auth Flow
//!
//! 1. A user logs in with username and password
//! 2. The server issues an HS256 JWT signed with the process secret
//!    (`sub` = principal id, valid for one hour)
//! 3. Clients send `Authorization: sso-jwt <token>`
//! 4. The `Auth` extractor verifies signature and expiry and yields the
//!    principal id
//!
//! ## Security
//!
//! - The signing secret is generated at startup and never persisted, so a
//!   restart invalidates all outstanding tokens
//! - All verification failures are reported as one `InvalidToken` error

pub mod claims;
pub mod credentials;
pub mod error;
pub mod extractor;
pub mod gateway;
pub mod secret;
pub mod token;

pub use claims::{PrincipalId, SessionClaims, TOKEN_TTL_SECS};
pub use credentials::{Argon2Hasher, CredentialError, CredentialHasher};
pub use error::AuthError;
pub use extractor::Auth;
pub use gateway::{extract_token, AuthGateway, BEARER_PREFIX};
pub use secret::{SecretKeyManager, SigningSecret, SECRET_LEN};
pub use token::TokenService;
