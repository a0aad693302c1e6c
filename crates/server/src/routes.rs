use std::sync::Arc;

use axum::http::header;
use axum::response::IntoResponse;
use axum::{routing::get, Json, Router};
use common::types::Health;
use service::items::ItemStore;
use service::users::UserService;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;

use crate::adapter;
use crate::handlers::{devices, ItemsHandler, UsersHandler};
use crate::observability;
use crate::openapi::ApiDoc;

pub const ITEMS_PREFIX: &str = "/api/v1/items";
pub const USERS_PREFIX: &str = "/api/v1/users";

/// Shared stores and services, constructed once at startup.
#[derive(Clone)]
pub struct AppState {
    pub items: Arc<ItemStore>,
    pub users: Arc<UserService>,
}

#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, description = "OK", body = crate::openapi::HealthResponse)))]
pub async fn health() -> Json<Health> {
    Json(Health::ok())
}

async fn metrics() -> impl IntoResponse {
    let (status, body) = observability::encode_metrics();
    (status, [(header::CONTENT_TYPE, "text/plain; version=0.0.4")], body)
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Build the full application router: resource mounts, ancillary routes and layers.
pub fn build_router(state: AppState) -> Router {
    let router = Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .route("/api-docs/openapi.json", get(openapi_json))
        .route("/api/v1/devices/:id", get(devices::get_device));

    let router = adapter::mount(router, ITEMS_PREFIX, Arc::new(ItemsHandler::new(state.items)));
    let router = adapter::mount(router, USERS_PREFIX, Arc::new(UsersHandler::new(state.users)));

    router
        .layer(CorsLayer::very_permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
