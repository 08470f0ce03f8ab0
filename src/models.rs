// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! This module defines the request and response data structures used by
//! the REST API. All types derive `ToSchema` for OpenAPI documentation.
//!
//! Request fields are optional at the serde level so handlers can answer a
//! missing field with its own fixed message instead of a generic parse error.
//!
//! ## Model Categories
//!
//! - **Accounts**: Registration and login
//! - **Baskets**: Basket creation, updates and views

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::auth::PrincipalId;
use crate::basket::{Basket, BasketData, BasketId, BasketState};

// =============================================================================
// Shared Responses
// =============================================================================

/// Plain acknowledgement.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

// =============================================================================
// Account Models
// =============================================================================

/// Body of `POST /register` and `POST /login`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct CredentialsRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// Successful login.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct LoginResponse {
    pub message: String,
    /// Session token; send back as `Authorization: sso-jwt <token>`
    pub token: String,
}

// =============================================================================
// Basket Models
// =============================================================================

/// Body of `POST /basket` and `PATCH /basket/{id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct BasketRequest {
    /// Opaque JSON object stored as-is. Any other JSON type counts as missing.
    #[serde(default)]
    #[schema(value_type = Object)]
    pub data: Option<Value>,
    /// `PENDING` or `COMPLETED`. A non-string counts as missing.
    #[serde(default)]
    #[schema(value_type = String)]
    pub state: Option<Value>,
}

/// Successful basket creation.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct CreatedBasketResponse {
    pub message: String,
    /// New basket id (decimal string)
    pub basket_id: String,
}

/// Basket as returned to its owner.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct BasketView {
    pub id: BasketId,
    pub user_id: PrincipalId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[schema(value_type = Object)]
    pub data: BasketData,
    pub state: BasketState,
}

impl From<Basket> for BasketView {
    fn from(basket: Basket) -> Self {
        Self {
            id: basket.id,
            user_id: basket.owner_id,
            created_at: basket.created_at,
            updated_at: basket.updated_at,
            data: basket.data,
            state: basket.state,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn basket_view_hides_version() {
        let now = Utc::now();
        let basket = Basket {
            id: 7,
            owner_id: 3,
            data: json!({"qty": 2}).as_object().cloned().unwrap(),
            state: BasketState::Pending,
            created_at: now,
            updated_at: now,
            version: 4,
        };

        let value = serde_json::to_value(BasketView::from(basket)).unwrap();
        assert_eq!(value["id"], 7);
        assert_eq!(value["user_id"], 3);
        assert_eq!(value["state"], "PENDING");
        assert_eq!(value["data"], json!({"qty": 2}));
        assert!(value.get("version").is_none());
    }

    #[test]
    fn basket_request_fields_are_optional() {
        let request: BasketRequest = serde_json::from_value(json!({"state": "PENDING"})).unwrap();
        assert!(request.data.is_none());
        assert_eq!(request.state, Some(json!("PENDING")));
    }

    #[test]
    fn basket_request_accepts_any_json_types() {
        let request: BasketRequest =
            serde_json::from_value(json!({"data": [1], "state": 5})).unwrap();
        assert_eq!(request.data, Some(json!([1])));
        assert_eq!(request.state, Some(json!(5)));
    }
}
