//! Customer endpoints.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use tracing::error;
use uuid::Uuid;

use super::AppState;
use crate::store::NewCustomer;

#[derive(Debug, Deserialize)]
pub struct ListCustomersQuery {
    /// Search by name/email/phone.
    pub q: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    100
}

pub async fn create_customer(
    State(state): State<AppState>,
    Json(body): Json<NewCustomer>,
) -> impl IntoResponse {
    match state.db.create_customer(&body).await {
        Ok(customer) => (StatusCode::CREATED, Json(serde_json::json!(customer))),
        Err(e) => {
            error!(error = %e, "Failed to create customer");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": "failed to create customer"})),
            )
        }
    }
}

pub async fn list_customers(
    State(state): State<AppState>,
    Query(query): Query<ListCustomersQuery>,
) -> impl IntoResponse {
    match state.db.list_customers(query.q.as_deref(), query.limit).await {
        Ok(customers) => (StatusCode::OK, Json(serde_json::json!({"items": customers}))),
        Err(e) => {
            error!(error = %e, "Failed to list customers");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": "failed to list customers"})),
            )
        }
    }
}

pub async fn get_customer(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let customer_id = match Uuid::parse_str(&id) {
        Ok(id) => id,
        Err(_) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({"error": "Invalid id"})),
            );
        }
    };

    match state.db.get_customer(customer_id).await {
        Ok(Some(customer)) => (StatusCode::OK, Json(serde_json::json!(customer))),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({"error": "Customer not found"})),
        ),
        Err(e) => {
            error!(error = %e, "Failed to fetch customer");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": "failed to fetch customer"})),
            )
        }
    }
}
