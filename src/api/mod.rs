// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::rejection::JsonRejection,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::{
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    basket::BasketState,
    error::ApiError,
    models::{
        BasketRequest, BasketView, CreatedBasketResponse, CredentialsRequest, LoginResponse,
        MessageResponse,
    },
    state::AppState,
};

pub mod accounts;
pub mod baskets;
pub mod health;

/// Map a JSON body rejection to a client error with a fixed message.
pub(crate) fn body_error(rejection: JsonRejection) -> ApiError {
    match rejection {
        JsonRejection::MissingJsonContentType(_) => ApiError::bad_request("invalid content type"),
        _ => ApiError::bad_request("invalid body format"),
    }
}

/// Run a synchronous store or hashing call on the blocking pool.
pub(crate) async fn blocking<T, E, F>(task: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, E> + Send + 'static,
    T: Send + 'static,
    E: Send + 'static,
    ApiError: From<E>,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|e| ApiError::internal(&e))?
        .map_err(ApiError::from)
}

pub fn router(state: AppState) -> Router {
    let routes = Router::new()
        .route("/register", post(accounts::register))
        .route("/login", post(accounts::login))
        .route(
            "/basket",
            get(baskets::list_baskets).post(baskets::create_basket),
        )
        .route(
            "/basket/{id}",
            get(baskets::get_basket)
                .patch(baskets::update_basket)
                .delete(baskets::delete_basket),
        )
        .route("/health", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .with_state(state);

    Router::new()
        .merge(routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id()),
        )
        .layer(CorsLayer::permissive())
}

/// Registers the `Authorization: sso-jwt <token>` header scheme.
struct SessionTokenAddon;

impl Modify for SessionTokenAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "sso_jwt",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::with_description(
                    "Authorization",
                    "Session token prefixed with `sso-jwt `",
                ))),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        accounts::register,
        accounts::login,
        baskets::list_baskets,
        baskets::create_basket,
        baskets::get_basket,
        baskets::update_basket,
        baskets::delete_basket,
        health::liveness,
        health::readiness
    ),
    components(
        schemas(
            CredentialsRequest,
            LoginResponse,
            MessageResponse,
            BasketRequest,
            CreatedBasketResponse,
            BasketView,
            BasketState,
            health::HealthResponse,
            health::ReadyResponse
        )
    ),
    modifiers(&SessionTokenAddon),
    tags(
        (name = "Accounts", description = "Registration and login"),
        (name = "Baskets", description = "Basket lifecycle"),
        (name = "Health", description = "Liveness and readiness probes")
    )
)]
struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    async fn send(
        app: &Router,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("sso-jwt {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn register_and_login(app: &Router, username: &str) -> String {
        let credentials = json!({"username": username, "password": "pw"});
        let (status, _) = send(app, "POST", "/register", None, Some(credentials.clone())).await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = send(app, "POST", "/login", None, Some(credentials)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "logged in successfully");
        body["token"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn basket_lifecycle_over_http() {
        let (state, _dir) = AppState::for_tests();
        let app = router(state);
        let alice = register_and_login(&app, "alice").await;
        let bob = register_and_login(&app, "bob").await;

        let (status, body) = send(
            &app,
            "POST",
            "/basket",
            Some(&alice),
            Some(json!({"data": {"qty": 2}, "state": "PENDING"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["message"], "created successfully");
        let id = body["basket_id"].as_str().unwrap().to_string();

        let (status, body) = send(&app, "GET", &format!("/basket/{id}"), Some(&alice), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"], json!({"qty": 2}));
        assert_eq!(body["state"], "PENDING");

        let (status, _) = send(
            &app,
            "PATCH",
            &format!("/basket/{id}"),
            Some(&alice),
            Some(json!({"data": {"qty": 3}, "state": "COMPLETED"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = send(
            &app,
            "PATCH",
            &format!("/basket/{id}"),
            Some(&alice),
            Some(json!({"data": {"qty": 4}, "state": "PENDING"})),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(
            body["error"],
            "basket has been completed and can no longer be updated"
        );

        let (status, _) = send(&app, "GET", &format!("/basket/{id}"), Some(&bob), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = send(&app, "GET", "/basket", Some(&bob), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]));

        let (status, _) = send(&app, "DELETE", &format!("/basket/{id}"), Some(&alice), None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = send(&app, "GET", &format!("/basket/{id}"), Some(&alice), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn basket_routes_require_session_token() {
        let (state, _dir) = AppState::for_tests();
        let app = router(state);

        let (status, body) = send(&app, "GET", "/basket", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "invalid token");

        let (status, _) = send(&app, "GET", "/basket", Some("not-a-token"), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn malformed_requests_are_bad_requests() {
        let (state, _dir) = AppState::for_tests();
        let app = router(state);
        let token = register_and_login(&app, "alice").await;

        let (status, body) = send(&app, "GET", "/basket/abc", Some(&token), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "invalid id");

        let request = Request::builder()
            .method("POST")
            .uri("/register")
            .body(Body::from(r#"{"username":"x","password":"y"}"#))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "invalid content type");

        let request = Request::builder()
            .method("POST")
            .uri("/login")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "invalid body format");
    }

    #[tokio::test]
    async fn wrongly_typed_basket_fields_over_http() {
        let (state, _dir) = AppState::for_tests();
        let app = router(state);
        let token = register_and_login(&app, "alice").await;

        let (status, body) = send(
            &app,
            "POST",
            "/basket",
            Some(&token),
            Some(json!({"data": [1], "state": "PENDING"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "missing data");

        let (status, body) = send(
            &app,
            "POST",
            "/basket",
            Some(&token),
            Some(json!({"data": {}, "state": true})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "missing state");
    }

    #[tokio::test]
    async fn responses_carry_request_id() {
        let (state, _dir) = AppState::for_tests();
        let app = router(state);

        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn blocking_maps_domain_and_panic_failures() {
        let value = blocking(|| Ok::<_, ApiError>(7)).await.unwrap();
        assert_eq!(value, 7);

        let err = blocking(|| Err::<(), _>(crate::basket::BasketError::NotFoundOrForbidden))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);

        let err = blocking(|| -> Result<(), ApiError> { panic!("store task died") })
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message, "internal server error");
    }

    #[test]
    fn openapi_documents_session_scheme() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components present");
        assert!(components.security_schemes.contains_key("sso_jwt"));
        assert!(doc.paths.paths.contains_key("/basket/{id}"));
    }
}
