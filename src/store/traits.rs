//! `Database` trait — the narrow async interface the triage core and the
//! HTTP layer see of persistence.

use async_trait::async_trait;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::DatabaseError;
use crate::model::{CannedResponse, Customer, Direction, Message, MessageStatus, Topic};

/// Data for a customer to be created. The store assigns id and timestamps.
#[derive(Debug, Clone, Deserialize)]
pub struct NewCustomer {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub account_id: Option<String>,
    #[serde(default)]
    pub is_vip: bool,
    #[serde(default)]
    pub last_loan_status: Option<String>,
    #[serde(default)]
    pub kyc_status: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// An enriched message ready for persistence. Status, urgency, and topic
/// have already been derived by the orchestrator; the store assigns id,
/// creation sequence, and timestamp.
#[derive(Debug, Clone)]
pub struct NewMessage {
    pub customer_id: Uuid,
    pub text: String,
    pub channel: String,
    pub direction: Direction,
    pub status: MessageStatus,
    pub urgency_score: u8,
    pub topic: Option<Topic>,
}

/// Data for a canned response to be created.
#[derive(Debug, Clone, Deserialize)]
pub struct NewCannedResponse {
    pub title: String,
    pub text: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Sort order for message listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageSort {
    /// Urgency descending, then newest first.
    UrgencyDesc,
    /// Newest first by creation sequence.
    NewestFirst,
}

/// Filter set for listing messages.
#[derive(Debug, Clone)]
pub struct MessageQuery {
    pub customer_id: Option<Uuid>,
    pub status: Option<MessageStatus>,
    /// Case-insensitive substring on the message text.
    pub text_contains: Option<String>,
    pub topic: Option<Topic>,
    pub sort: MessageSort,
    pub limit: i64,
}

/// Backend-agnostic persistence trait.
#[async_trait]
pub trait Database: Send + Sync {
    /// Run all pending schema migrations.
    async fn init_schema(&self) -> Result<(), DatabaseError>;

    // ── Customers ───────────────────────────────────────────────────

    /// Insert a new customer and return the stored record.
    async fn create_customer(&self, customer: &NewCustomer) -> Result<Customer, DatabaseError>;

    /// List customers, newest first, optionally filtered by a
    /// case-insensitive substring across name/email/phone.
    async fn list_customers(
        &self,
        q: Option<&str>,
        limit: i64,
    ) -> Result<Vec<Customer>, DatabaseError>;

    /// Get a customer by ID.
    async fn get_customer(&self, id: Uuid) -> Result<Option<Customer>, DatabaseError>;

    /// Look up a customer by exact email.
    async fn find_customer_by_email(&self, email: &str)
    -> Result<Option<Customer>, DatabaseError>;

    /// Look up a customer by exact phone number.
    async fn find_customer_by_phone(&self, phone: &str)
    -> Result<Option<Customer>, DatabaseError>;

    // ── Messages ────────────────────────────────────────────────────

    /// Insert an enriched message and return the stored record, including
    /// the assigned creation sequence.
    async fn insert_message(&self, message: &NewMessage) -> Result<Message, DatabaseError>;

    /// Get a message by ID.
    async fn get_message(&self, id: Uuid) -> Result<Option<Message>, DatabaseError>;

    /// List messages matching the query filters.
    async fn list_messages(&self, query: &MessageQuery) -> Result<Vec<Message>, DatabaseError>;

    /// Read-only snapshot of every message, creation sequence ascending.
    /// Input for the conversation aggregator.
    async fn messages_for_aggregation(&self) -> Result<Vec<Message>, DatabaseError>;

    // ── Canned responses ────────────────────────────────────────────

    /// List canned responses sorted by title.
    async fn list_canned(&self) -> Result<Vec<CannedResponse>, DatabaseError>;

    /// Insert a new canned response and return the stored record.
    async fn insert_canned(
        &self,
        canned: &NewCannedResponse,
    ) -> Result<CannedResponse, DatabaseError>;
}
