// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Registration and login endpoints.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};

use super::{blocking, body_error};
use crate::{
    error::ApiError,
    models::{CredentialsRequest, LoginResponse, MessageResponse},
    state::AppState,
};

/// Pull both credential fields out of a request, in the order they are reported.
fn credentials(request: CredentialsRequest) -> Result<(String, String), ApiError> {
    let username = request
        .username
        .ok_or_else(|| ApiError::bad_request("missing username"))?;
    let password = request
        .password
        .ok_or_else(|| ApiError::bad_request("missing password"))?;
    Ok((username, password))
}

/// Register a new user.
#[utoipa::path(
    post,
    path = "/register",
    request_body = CredentialsRequest,
    tag = "Accounts",
    responses(
        (status = 201, description = "Registered", body = MessageResponse),
        (status = 400, description = "Missing or malformed fields"),
        (status = 409, description = "Username already in use"),
    )
)]
pub async fn register(
    State(state): State<AppState>,
    body: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let Json(request) = body.map_err(body_error)?;
    let (username, password) = credentials(request)?;

    // Argon2 is CPU-bound; keep it off the async workers
    blocking(move || state.accounts.register(&username, &password)).await?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("registered successfully")),
    ))
}

/// Log in and receive a session token.
#[utoipa::path(
    post,
    path = "/login",
    request_body = CredentialsRequest,
    tag = "Accounts",
    responses(
        (status = 200, description = "Logged in", body = LoginResponse),
        (status = 400, description = "Missing or malformed fields"),
        (status = 401, description = "Invalid credentials"),
    )
)]
pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(request) = body.map_err(body_error)?;
    let (username, password) = credentials(request)?;

    let token = blocking(move || state.accounts.login(&username, &password)).await?;

    Ok(Json(LoginResponse {
        message: "logged in successfully".to_string(),
        token,
    }))
}
