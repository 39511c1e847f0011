//! Router configuration for the API.
//!
//! This module provides centralized route registration and middleware
//! configuration for the application.

use std::time::Duration;

use axum::{
    Json, Router, extract::DefaultBodyLimit, http::StatusCode, middleware, routing::get,
};
use tower_http::timeout::{RequestBodyTimeoutLayer, TimeoutLayer};
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;

use crate::api::doc::ApiDoc;
use crate::api::handlers;
use crate::api::middleware::{global_error_handler, logging_middleware, request_id_middleware};
use crate::config::ServerConfig;
use crate::state::AppState;

/// Creates the main application router with all routes and middleware.
///
/// # Routes
/// - `POST /webhook/{provider}` - deliver one postback
/// - `GET /health` - health check
/// - `GET /openapi.json` - OpenAPI document
///
/// # Middleware Order
/// Middleware is applied in reverse order of declaration (last added runs first):
/// 1. Request ID
/// 2. Logging
/// 3. Error envelope for responses the handlers did not build
/// 4. Write timeout (408), then body read timeout and size limit
pub fn create_router(state: AppState, server: &ServerConfig) -> Router {
    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .nest("/webhook", handlers::webhook::webhook_routes())
        .merge(handlers::health::health_routes())
        .split_for_parts();

    router
        .route(
            "/openapi.json",
            get(move || {
                let api = api.clone();
                async move { Json(api) }
            }),
        )
        .layer(DefaultBodyLimit::max(server.max_body_size))
        .layer(RequestBodyTimeoutLayer::new(Duration::from_secs(
            server.read_timeout,
        )))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(server.write_timeout),
        ))
        .layer(middleware::from_fn(global_error_handler))
        .layer(middleware::from_fn(logging_middleware))
        .layer(middleware::from_fn(request_id_middleware))
        .with_state(state)
}
