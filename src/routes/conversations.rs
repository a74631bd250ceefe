//! Conversation roll-up endpoint.

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use tracing::{error, warn};

use super::AppState;
use crate::triage::{SortKey, aggregate};

#[derive(Debug, Deserialize)]
pub struct ConversationsQuery {
    pub q: Option<String>,
    #[serde(default)]
    pub sort: SortKey,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    100
}

pub async fn list_conversations(
    State(state): State<AppState>,
    Query(query): Query<ConversationsQuery>,
) -> impl IntoResponse {
    let messages = match state.db.messages_for_aggregation().await {
        Ok(messages) => messages,
        Err(e) => {
            error!(error = %e, "Failed to load messages for aggregation");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": "failed to list conversations"})),
            );
        }
    };

    let summaries = aggregate(&messages, query.q.as_deref(), query.sort, query.limit);

    let mut items = Vec::with_capacity(summaries.len());
    for summary in summaries {
        // A summary for a deleted customer still lists, with customer null.
        let customer = match state.db.get_customer(summary.customer_id).await {
            Ok(customer) => customer,
            Err(e) => {
                warn!(error = %e, customer_id = %summary.customer_id, "Customer lookup failed");
                None
            }
        };
        items.push(serde_json::json!({
            "customer_id": summary.customer_id,
            "customer": customer,
            "last_message": summary.last_message_text,
            "max_urgency": summary.max_urgency,
            "topics": summary.topics,
        }));
    }

    (StatusCode::OK, Json(serde_json::json!({"items": items})))
}
