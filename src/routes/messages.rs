//! Message endpoints — creation (the triage entry point), listing, and bulk
//! CSV ingestion.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::AppState;
use crate::model::{Direction, MessageStatus, Topic};
use crate::store::{MessageQuery, MessageSort, NewCustomer, NewMessage};
use crate::triage::classify;

#[derive(Debug, Deserialize)]
pub struct CreateMessage {
    pub customer_id: Uuid,
    pub text: String,
    #[serde(default = "default_channel")]
    pub channel: String,
    #[serde(default = "default_direction")]
    pub direction: Direction,
}

fn default_channel() -> String {
    "web".into()
}

fn default_direction() -> Direction {
    Direction::Inbound
}

/// Create a message: classify (inbound only), persist, then notify live
/// observers — in that order.
pub async fn create_message(
    State(state): State<AppState>,
    Json(body): Json<CreateMessage>,
) -> impl IntoResponse {
    if body.direction == Direction::Inbound && body.text.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"error": "text must not be empty"})),
        );
    }

    // Only inbound messages are scored; outbound always carry 0 / no topic.
    let (urgency_score, topic) = match body.direction {
        Direction::Inbound => {
            let result = classify(&body.text);
            (result.urgency, result.topic)
        }
        Direction::Outbound => (0, None),
    };
    let status = match body.direction {
        Direction::Inbound => MessageStatus::Open,
        Direction::Outbound => MessageStatus::Sent,
    };

    let new_message = NewMessage {
        customer_id: body.customer_id,
        text: body.text,
        channel: body.channel,
        direction: body.direction,
        status,
        urgency_score,
        topic,
    };

    match state.db.insert_message(&new_message).await {
        Ok(message) => {
            info!(
                message_id = %message.id,
                urgency = message.urgency_score,
                topic = ?message.topic,
                "Message created"
            );
            state.hub.broadcast(&message).await;
            (StatusCode::CREATED, Json(serde_json::json!(message)))
        }
        Err(e) => {
            error!(error = %e, "Failed to persist message");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": "failed to create message"})),
            )
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ListMessagesQuery {
    pub customer_id: Option<Uuid>,
    pub status: Option<MessageStatus>,
    pub q: Option<String>,
    pub topic: Option<Topic>,
    #[serde(default = "default_sort")]
    pub sort: String,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_sort() -> String {
    "-urgency".into()
}

fn default_limit() -> i64 {
    200
}

pub async fn list_messages(
    State(state): State<AppState>,
    Query(query): Query<ListMessagesQuery>,
) -> impl IntoResponse {
    let sort = if query.sort == "-urgency" {
        MessageSort::UrgencyDesc
    } else {
        MessageSort::NewestFirst
    };

    let db_query = MessageQuery {
        customer_id: query.customer_id,
        status: query.status,
        text_contains: query.q,
        topic: query.topic,
        sort,
        limit: query.limit,
    };

    match state.db.list_messages(&db_query).await {
        Ok(messages) => (StatusCode::OK, Json(serde_json::json!({"items": messages}))),
        Err(e) => {
            error!(error = %e, "Failed to list messages");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": "failed to list messages"})),
            )
        }
    }
}

pub async fn get_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let message_id = match Uuid::parse_str(&id) {
        Ok(id) => id,
        Err(_) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({"error": "Invalid id"})),
            );
        }
    };

    match state.db.get_message(message_id).await {
        Ok(Some(message)) => (StatusCode::OK, Json(serde_json::json!(message))),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({"error": "Message not found"})),
        ),
        Err(e) => {
            error!(error = %e, "Failed to fetch message");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": "failed to fetch message"})),
            )
        }
    }
}

// ── CSV import ──────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CsvImport {
    /// Expected headers: name,email,phone,text (a "message" column is
    /// accepted in place of "text").
    pub csv_text: String,
    #[serde(default = "default_channel")]
    pub channel: String,
}

#[derive(Debug, Default, PartialEq)]
struct CsvRow {
    name: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    text: Option<String>,
}

/// Split one CSV line into cells. Double-quoted cells may contain commas;
/// a doubled quote inside a quoted cell is a literal quote.
fn split_csv_line(line: &str) -> Vec<String> {
    let mut cells = Vec::new();
    let mut cell = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    cell.push('"');
                } else {
                    in_quotes = false;
                }
            }
            '"' if cell.is_empty() => in_quotes = true,
            ',' if !in_quotes => cells.push(std::mem::take(&mut cell)),
            c => cell.push(c),
        }
    }
    cells.push(cell);
    cells
}

/// Parse a header-mapped CSV sheet. Header matching is case-insensitive;
/// blank lines are skipped and empty cells become `None`.
fn parse_csv_rows(csv_text: &str) -> Vec<CsvRow> {
    let mut lines = csv_text.lines().filter(|line| !line.trim().is_empty());
    let Some(header) = lines.next() else {
        return Vec::new();
    };
    let columns: Vec<String> = split_csv_line(header)
        .iter()
        .map(|h| h.trim().to_lowercase())
        .collect();

    let field = |cells: &[String], name: &str| -> Option<String> {
        columns
            .iter()
            .position(|c| c == name)
            .and_then(|i| cells.get(i))
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    lines
        .map(|line| {
            let cells = split_csv_line(line);
            CsvRow {
                name: field(&cells, "name"),
                email: field(&cells, "email"),
                phone: field(&cells, "phone"),
                text: field(&cells, "text").or_else(|| field(&cells, "message")),
            }
        })
        .collect()
}

/// Bulk-ingest inbound messages from a CSV sheet, upserting customers by
/// email then phone. Imported rows are classified and stored but not pushed
/// to live observers.
pub async fn import_csv(
    State(state): State<AppState>,
    Json(body): Json<CsvImport>,
) -> impl IntoResponse {
    let mut imported = 0usize;

    for row in parse_csv_rows(&body.csv_text) {
        let Some(text) = row.text else {
            continue;
        };

        let existing = match &row.email {
            Some(email) => state.db.find_customer_by_email(email).await.ok().flatten(),
            None => None,
        };
        let existing = match (existing, &row.phone) {
            (None, Some(phone)) => state.db.find_customer_by_phone(phone).await.ok().flatten(),
            (found, _) => found,
        };

        let customer = match existing {
            Some(customer) => customer,
            None => {
                let fallback_contact = row.email.clone().or_else(|| row.phone.clone());
                let new_customer = NewCustomer {
                    name: row
                        .name
                        .or(fallback_contact.clone())
                        .unwrap_or_else(|| "Unknown".into()),
                    email: row
                        .email
                        .unwrap_or_else(|| format!("unknown+{}@example.com", Uuid::new_v4())),
                    phone: row.phone,
                    account_id: None,
                    is_vip: false,
                    last_loan_status: None,
                    kyc_status: None,
                    notes: None,
                };
                match state.db.create_customer(&new_customer).await {
                    Ok(customer) => customer,
                    Err(e) => {
                        warn!(error = %e, "CSV import: failed to create customer, skipping row");
                        continue;
                    }
                }
            }
        };

        let result = classify(&text);
        let new_message = NewMessage {
            customer_id: customer.id,
            text,
            channel: body.channel.clone(),
            direction: Direction::Inbound,
            status: MessageStatus::Open,
            urgency_score: result.urgency,
            topic: result.topic,
        };
        match state.db.insert_message(&new_message).await {
            Ok(_) => imported += 1,
            Err(e) => warn!(error = %e, "CSV import: failed to insert message, skipping row"),
        }
    }

    info!(imported, "CSV import finished");
    Json(serde_json::json!({"imported": imported}))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_standard_headers() {
        let rows = parse_csv_rows(
            "name,email,phone,text\nAmina,amina@example.com,+254700,my loan is late\n",
        );
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name.as_deref(), Some("Amina"));
        assert_eq!(rows[0].email.as_deref(), Some("amina@example.com"));
        assert_eq!(rows[0].phone.as_deref(), Some("+254700"));
        assert_eq!(rows[0].text.as_deref(), Some("my loan is late"));
    }

    #[test]
    fn headers_are_case_insensitive() {
        let rows = parse_csv_rows("Name,Email,Phone,Message\nJoy,joy@example.com,,hello\n");
        assert_eq!(rows[0].name.as_deref(), Some("Joy"));
        assert_eq!(rows[0].text.as_deref(), Some("hello"));
        assert!(rows[0].phone.is_none());
    }

    #[test]
    fn message_column_substitutes_for_text() {
        let rows = parse_csv_rows("email,message\na@example.com,need kyc help\n");
        assert_eq!(rows[0].text.as_deref(), Some("need kyc help"));
    }

    #[test]
    fn missing_cells_and_blank_lines() {
        let rows = parse_csv_rows("name,email,text\n\nBrian,,\n,cate@example.com,hi\n");
        assert_eq!(rows.len(), 2);
        assert!(rows[0].text.is_none());
        assert!(rows[0].email.is_none());
        assert_eq!(rows[1].email.as_deref(), Some("cate@example.com"));
        assert_eq!(rows[1].text.as_deref(), Some("hi"));
    }

    #[test]
    fn quoted_cell_keeps_embedded_commas() {
        let rows = parse_csv_rows(
            "name,email,text\nDana,dana@example.com,\"hello, when will I get my loan\"\n",
        );
        assert_eq!(rows.len(), 1);
        assert_eq!(
            rows[0].text.as_deref(),
            Some("hello, when will I get my loan")
        );
    }

    #[test]
    fn doubled_quote_inside_quoted_cell_is_literal() {
        let rows = parse_csv_rows("name,text\nEli,\"say \"\"hi\"\" to support\"\n");
        assert_eq!(rows[0].text.as_deref(), Some("say \"hi\" to support"));
    }

    #[test]
    fn empty_input_yields_no_rows() {
        assert!(parse_csv_rows("").is_empty());
        assert!(parse_csv_rows("name,email,phone,text\n").is_empty());
    }
}
