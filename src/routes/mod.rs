//! HTTP surface — REST routes, shared state, and the router assembly.

pub mod canned;
pub mod conversations;
pub mod customers;
pub mod messages;

use std::sync::Arc;

use axum::{
    Json, Router,
    response::IntoResponse,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;

use crate::realtime::NotificationHub;
use crate::realtime::ws::ws_handler;
use crate::store::Database;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<dyn Database>,
    pub hub: Arc<NotificationHub>,
}

/// Build the full application router.
pub fn app_router(db: Arc<dyn Database>, hub: Arc<NotificationHub>) -> Router {
    let state = AppState { db, hub };

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/ws/messages", get(ws_handler))
        .route(
            "/api/customers",
            post(customers::create_customer).get(customers::list_customers),
        )
        .route("/api/customers/{id}", get(customers::get_customer))
        .route(
            "/api/messages",
            post(messages::create_message).get(messages::list_messages),
        )
        .route("/api/messages/import_csv", post(messages::import_csv))
        .route("/api/messages/{id}", get(messages::get_message))
        .route(
            "/api/canned",
            get(canned::list_canned).post(canned::create_canned),
        )
        .route("/api/conversations", get(conversations::list_conversations))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn root() -> impl IntoResponse {
    Json(serde_json::json!({"message": "supportline backend running"}))
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "supportline"
    }))
}
