//! Domain types — customers, messages, summaries, and the WebSocket envelope.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Direction of a message relative to the customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Customer → agent.
    Inbound,
    /// Agent → customer.
    Outbound,
}

/// Lifecycle status, derived once from direction at creation and never
/// recomputed afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageStatus {
    /// Inbound message awaiting an agent.
    Open,
    /// Outbound message delivered to the customer.
    Sent,
}

/// Coarse category assigned to an inbound message by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Topic {
    Loan,
    Account,
    Kyc,
    Payment,
}

/// A persisted customer message. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Unique ID.
    pub id: Uuid,
    /// Reference to the customer record.
    pub customer_id: Uuid,
    /// Message body text.
    pub text: String,
    /// Source channel such as web, sms, email.
    pub channel: String,
    pub direction: Direction,
    pub status: MessageStatus,
    /// Computed urgency 0-100. Only inbound messages are scored; outbound
    /// messages always carry 0.
    pub urgency_score: u8,
    /// Detected topic, absent unless at least one keyword matched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<Topic>,
    /// Strictly increasing creation sequence assigned by the store.
    /// Recency comparisons use this, never `created_at`.
    pub seq: i64,
    pub created_at: DateTime<Utc>,
}

/// A customer record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Internal account identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    pub is_vip: bool,
    /// Loan status such as pending, approved, disbursed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_loan_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kyc_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A reusable agent reply template.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CannedResponse {
    pub id: Uuid,
    pub title: String,
    pub text: String,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Per-customer conversation view, computed fresh on every aggregation
/// request and never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversationSummary {
    pub customer_id: Uuid,
    /// Text of the message with the greatest `seq` in the group.
    pub last_message_text: String,
    pub last_seq: i64,
    /// Maximum urgency across the group (0 when only outbound messages).
    pub max_urgency: u8,
    /// Distinct topics touched, in stable order.
    pub topics: BTreeSet<Topic>,
}

/// Events pushed to live observers over the WebSocket feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WsEvent {
    /// A new message was created.
    MessageCreated { data: Message },
}
