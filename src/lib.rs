// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Basket Manager - Authenticated Basket Lifecycle Service
//!
//! Users register, log in for a signed session token and manage their own
//! baskets. A basket is PENDING or COMPLETED; a COMPLETED basket can no
//! longer be updated, only deleted.
//!
//! ## Modules
//!
//! - `accounts` - Registration and login
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Signing secret, session tokens and the auth gateway
//! - `basket` - Basket model and lifecycle rules
//! - `storage` - Embedded ACID store (redb)

pub mod accounts;
pub mod api;
pub mod auth;
pub mod basket;
pub mod config;
pub mod error;
pub mod models;
pub mod state;
pub mod storage;
