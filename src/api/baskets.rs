// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Basket endpoints. Every route requires an `sso-jwt` session token.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;

use super::{blocking, body_error};
use crate::{
    auth::Auth,
    basket::{BasketData, BasketId},
    error::ApiError,
    models::{BasketRequest, BasketView, CreatedBasketResponse, MessageResponse},
    state::AppState,
};

/// Parse a basket id path segment. Ids are positive integers.
fn parse_basket_id(raw: &str) -> Result<BasketId, ApiError> {
    match raw.parse::<BasketId>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(ApiError::bad_request("invalid id")),
    }
}

/// Pull `data` and `state` out of a request, in the order they are reported.
/// A field of the wrong JSON type is reported as missing.
fn basket_fields(request: BasketRequest) -> Result<(BasketData, String), ApiError> {
    let Some(Value::Object(data)) = request.data else {
        return Err(ApiError::bad_request("missing data"));
    };
    let Some(Value::String(state)) = request.state else {
        return Err(ApiError::bad_request("missing state"));
    };
    Ok((data, state))
}

/// List the caller's baskets.
#[utoipa::path(
    get,
    path = "/basket",
    tag = "Baskets",
    security(("sso_jwt" = [])),
    responses(
        (status = 200, body = [BasketView]),
        (status = 401, description = "Invalid token"),
    )
)]
pub async fn list_baskets(
    Auth(principal_id): Auth,
    State(state): State<AppState>,
) -> Result<Json<Vec<BasketView>>, ApiError> {
    let baskets = blocking(move || state.baskets.list(principal_id)).await?;
    Ok(Json(baskets.into_iter().map(BasketView::from).collect()))
}

/// Create a basket in the given initial state.
#[utoipa::path(
    post,
    path = "/basket",
    request_body = BasketRequest,
    tag = "Baskets",
    security(("sso_jwt" = [])),
    responses(
        (status = 201, body = CreatedBasketResponse),
        (status = 400, description = "Missing fields or invalid state"),
        (status = 401, description = "Invalid token"),
    )
)]
pub async fn create_basket(
    Auth(principal_id): Auth,
    State(state): State<AppState>,
    body: Result<Json<BasketRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreatedBasketResponse>), ApiError> {
    let Json(request) = body.map_err(body_error)?;
    let (data, initial_state) = basket_fields(request)?;

    let id = blocking(move || state.baskets.create(principal_id, data, &initial_state)).await?;
    Ok((
        StatusCode::CREATED,
        Json(CreatedBasketResponse {
            message: "created successfully".to_string(),
            basket_id: id.to_string(),
        }),
    ))
}

/// Fetch one of the caller's baskets.
#[utoipa::path(
    get,
    path = "/basket/{id}",
    params(("id" = u64, Path, description = "Basket identifier")),
    tag = "Baskets",
    security(("sso_jwt" = [])),
    responses(
        (status = 200, body = BasketView),
        (status = 404, description = "No such basket for this user"),
    )
)]
pub async fn get_basket(
    Auth(principal_id): Auth,
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<BasketView>, ApiError> {
    let id = parse_basket_id(&id)?;
    let basket = blocking(move || state.baskets.get(principal_id, id)).await?;
    Ok(Json(basket.into()))
}

/// Replace a basket's data and state. COMPLETED baskets cannot be updated.
#[utoipa::path(
    patch,
    path = "/basket/{id}",
    params(("id" = u64, Path, description = "Basket identifier")),
    request_body = BasketRequest,
    tag = "Baskets",
    security(("sso_jwt" = [])),
    responses(
        (status = 200, body = MessageResponse),
        (status = 400, description = "Missing fields or invalid state"),
        (status = 404, description = "No such basket for this user"),
        (status = 409, description = "Basket is completed or was modified concurrently"),
    )
)]
pub async fn update_basket(
    Auth(principal_id): Auth,
    Path(id): Path<String>,
    State(state): State<AppState>,
    body: Result<Json<BasketRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let id = parse_basket_id(&id)?;
    let Json(request) = body.map_err(body_error)?;
    let (data, requested_state) = basket_fields(request)?;

    blocking(move || state.baskets.update(principal_id, id, data, &requested_state)).await?;
    Ok(Json(MessageResponse::new("updated successfully")))
}

/// Delete one of the caller's baskets.
#[utoipa::path(
    delete,
    path = "/basket/{id}",
    params(("id" = u64, Path, description = "Basket identifier")),
    tag = "Baskets",
    security(("sso_jwt" = [])),
    responses(
        (status = 200, body = MessageResponse),
        (status = 404, description = "No such basket for this user"),
    )
)]
pub async fn delete_basket(
    Auth(principal_id): Auth,
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<MessageResponse>, ApiError> {
    let id = parse_basket_id(&id)?;
    blocking(move || state.baskets.delete(principal_id, id)).await?;
    Ok(Json(MessageResponse::new("deleted successfully")))
}
