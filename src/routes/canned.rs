//! Canned response endpoints.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use tracing::{error, info};

use super::AppState;
use crate::store::NewCannedResponse;

/// Default templates seeded on first read of an empty table.
static DEFAULT_CANNED: &[(&str, &str, &[&str])] = &[
    (
        "Loan Disbursement Timeline",
        "Thanks for reaching out! Once your loan is approved, disbursement typically happens \
         within 24-48 hours. We'll notify you as soon as it's sent.",
        &["loan", "timeline"],
    ),
    (
        "KYC Verification Steps",
        "To complete KYC, please upload a clear photo of your ID and a selfie in the app. \
         Verification usually takes under 15 minutes.",
        &["kyc"],
    ),
    (
        "Update Account Info",
        "You can update your phone, email, and address in the Profile section. Let me know if \
         you'd like me to guide you step-by-step.",
        &["account"],
    ),
    (
        "Repayment Options",
        "You can repay via the app using your preferred method. If you're having trouble, I can \
         share a quick walkthrough.",
        &["payment"],
    ),
];

pub async fn list_canned(State(state): State<AppState>) -> impl IntoResponse {
    let items = match state.db.list_canned().await {
        Ok(items) => items,
        Err(e) => {
            error!(error = %e, "Failed to list canned responses");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": "failed to list canned responses"})),
            );
        }
    };

    if !items.is_empty() {
        return (StatusCode::OK, Json(serde_json::json!({"items": items})));
    }

    // First read on an empty table: seed the defaults, then re-list.
    for (title, text, tags) in DEFAULT_CANNED {
        let seed = NewCannedResponse {
            title: (*title).into(),
            text: (*text).into(),
            tags: tags.iter().map(|t| (*t).to_string()).collect(),
        };
        if let Err(e) = state.db.insert_canned(&seed).await {
            error!(error = %e, title, "Failed to seed canned response");
        }
    }
    info!(count = DEFAULT_CANNED.len(), "Seeded default canned responses");

    match state.db.list_canned().await {
        Ok(items) => (StatusCode::OK, Json(serde_json::json!({"items": items}))),
        Err(e) => {
            error!(error = %e, "Failed to list canned responses after seeding");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": "failed to list canned responses"})),
            )
        }
    }
}

pub async fn create_canned(
    State(state): State<AppState>,
    Json(body): Json<NewCannedResponse>,
) -> impl IntoResponse {
    match state.db.insert_canned(&body).await {
        Ok(canned) => (StatusCode::CREATED, Json(serde_json::json!(canned))),
        Err(e) => {
            error!(error = %e, "Failed to create canned response");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": "failed to create canned response"})),
            )
        }
    }
}
