//! libSQL backend — async `Database` trait implementation.
//!
//! Supports local file and in-memory databases. A single connection is
//! reused for all operations; `libsql::Connection` is `Send + Sync` and
//! safe for concurrent async use.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use libsql::{Connection, Database as LibSqlDatabase, params};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::DatabaseError;
use crate::model::{CannedResponse, Customer, Direction, Message, MessageStatus, Topic};
use crate::store::migrations;
use crate::store::traits::{
    Database, MessageQuery, MessageSort, NewCannedResponse, NewCustomer, NewMessage,
};

/// libSQL database backend.
pub struct LibSqlBackend {
    #[allow(dead_code)]
    db: Arc<LibSqlDatabase>,
    conn: Connection,
}

impl LibSqlBackend {
    /// Open (or create) a local database file and run migrations.
    pub async fn new_local(path: &Path) -> Result<Self, DatabaseError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                DatabaseError::Pool(format!("Failed to create database directory: {e}"))
            })?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| DatabaseError::Pool(format!("Failed to open libSQL database: {e}")))?;

        let conn = db
            .connect()
            .map_err(|e| DatabaseError::Pool(format!("Failed to create connection: {e}")))?;

        let backend = Self {
            db: Arc::new(db),
            conn,
        };
        backend.init_schema().await?;
        info!(path = %path.display(), "Database opened");
        Ok(backend)
    }

    /// Create an in-memory database (for tests).
    pub async fn new_memory() -> Result<Self, DatabaseError> {
        let db = libsql::Builder::new_local(":memory:")
            .build()
            .await
            .map_err(|e| {
                DatabaseError::Pool(format!("Failed to create in-memory database: {e}"))
            })?;

        let conn = db
            .connect()
            .map_err(|e| DatabaseError::Pool(format!("Failed to create connection: {e}")))?;

        let backend = Self {
            db: Arc::new(db),
            conn,
        };
        backend.init_schema().await?;
        Ok(backend)
    }

    fn conn(&self) -> &Connection {
        &self.conn
    }
}

// ── Helper functions ────────────────────────────────────────────────

/// Parse an RFC 3339 or SQLite datetime string into DateTime<Utc>.
/// Unparseable values indicate a corrupt row; they are logged and mapped to
/// the epoch minimum rather than failing the whole read.
fn parse_datetime(s: &str) -> DateTime<Utc> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return dt.with_timezone(&Utc);
    }
    if let Ok(ndt) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f") {
        return ndt.and_utc();
    }
    tracing::warn!(value = s, "Unparseable stored datetime");
    DateTime::<Utc>::MIN_UTC
}

/// Parse a stored UUID column, logging and substituting nil on corruption.
fn parse_stored_uuid(s: &str, column: &str) -> Uuid {
    Uuid::parse_str(s).unwrap_or_else(|_| {
        tracing::warn!(value = s, column, "Stored id is not a valid UUID");
        Uuid::nil()
    })
}

fn direction_to_str(direction: Direction) -> &'static str {
    match direction {
        Direction::Inbound => "inbound",
        Direction::Outbound => "outbound",
    }
}

fn str_to_direction(s: &str) -> Direction {
    match s {
        "outbound" => Direction::Outbound,
        _ => Direction::Inbound,
    }
}

fn status_to_str(status: MessageStatus) -> &'static str {
    match status {
        MessageStatus::Open => "open",
        MessageStatus::Sent => "sent",
    }
}

fn str_to_status(s: &str) -> MessageStatus {
    match s {
        "sent" => MessageStatus::Sent,
        _ => MessageStatus::Open,
    }
}

fn topic_to_str(topic: Topic) -> &'static str {
    match topic {
        Topic::Loan => "loan",
        Topic::Account => "account",
        Topic::Kyc => "kyc",
        Topic::Payment => "payment",
    }
}

fn str_to_topic(s: &str) -> Option<Topic> {
    match s {
        "loan" => Some(Topic::Loan),
        "account" => Some(Topic::Account),
        "kyc" => Some(Topic::Kyc),
        "payment" => Some(Topic::Payment),
        _ => None,
    }
}

/// Convert `Option<&str>` to a libsql value.
fn opt_text(s: Option<&str>) -> libsql::Value {
    match s {
        Some(s) => libsql::Value::Text(s.to_string()),
        None => libsql::Value::Null,
    }
}

/// SQL LIKE pattern for a case-insensitive substring match.
fn like_pattern(q: &str) -> String {
    format!("%{q}%")
}

const CUSTOMER_COLUMNS: &str =
    "id, name, email, phone, account_id, is_vip, last_loan_status, kyc_status, notes, created_at";

const MESSAGE_COLUMNS: &str =
    "id, customer_id, text, channel, direction, status, urgency_score, topic, seq, created_at";

const CANNED_COLUMNS: &str = "id, title, text, tags, created_at";

/// Map a libsql row to a Customer. Column order matches CUSTOMER_COLUMNS.
fn row_to_customer(row: &libsql::Row) -> Result<Customer, libsql::Error> {
    let id_str: String = row.get(0)?;
    let is_vip: i64 = row.get(5)?;
    let created_str: String = row.get(9)?;

    Ok(Customer {
        id: parse_stored_uuid(&id_str, "customers.id"),
        name: row.get(1)?,
        email: row.get(2)?,
        phone: row.get(3).ok(),
        account_id: row.get(4).ok(),
        is_vip: is_vip != 0,
        last_loan_status: row.get(6).ok(),
        kyc_status: row.get(7).ok(),
        notes: row.get(8).ok(),
        created_at: parse_datetime(&created_str),
    })
}

/// Map a libsql row to a Message. Column order matches MESSAGE_COLUMNS.
fn row_to_message(row: &libsql::Row) -> Result<Message, libsql::Error> {
    let id_str: String = row.get(0)?;
    let customer_str: String = row.get(1)?;
    let direction_str: String = row.get(4)?;
    let status_str: String = row.get(5)?;
    let urgency: i64 = row.get(6)?;
    let topic_str: Option<String> = row.get(7).ok();
    let created_str: String = row.get(9)?;

    Ok(Message {
        id: parse_stored_uuid(&id_str, "messages.id"),
        customer_id: parse_stored_uuid(&customer_str, "messages.customer_id"),
        text: row.get(2)?,
        channel: row.get(3)?,
        direction: str_to_direction(&direction_str),
        status: str_to_status(&status_str),
        urgency_score: urgency.clamp(0, 100) as u8,
        topic: topic_str.as_deref().and_then(str_to_topic),
        seq: row.get(8)?,
        created_at: parse_datetime(&created_str),
    })
}

/// Map a libsql row to a CannedResponse. Column order matches CANNED_COLUMNS.
fn row_to_canned(row: &libsql::Row) -> Result<CannedResponse, libsql::Error> {
    let id_str: String = row.get(0)?;
    let tags_str: String = row.get(3)?;
    let created_str: String = row.get(4)?;

    Ok(CannedResponse {
        id: parse_stored_uuid(&id_str, "canned_responses.id"),
        title: row.get(1)?,
        text: row.get(2)?,
        tags: serde_json::from_str(&tags_str).unwrap_or_default(),
        created_at: parse_datetime(&created_str),
    })
}

// ── Trait implementation ────────────────────────────────────────────

#[async_trait]
impl Database for LibSqlBackend {
    async fn init_schema(&self) -> Result<(), DatabaseError> {
        migrations::init_schema(self.conn()).await
    }

    // ── Customers ───────────────────────────────────────────────────

    async fn create_customer(&self, customer: &NewCustomer) -> Result<Customer, DatabaseError> {
        let conn = self.conn();
        let record = Customer {
            id: Uuid::new_v4(),
            name: customer.name.clone(),
            email: customer.email.clone(),
            phone: customer.phone.clone(),
            account_id: customer.account_id.clone(),
            is_vip: customer.is_vip,
            last_loan_status: customer.last_loan_status.clone(),
            kyc_status: customer.kyc_status.clone(),
            notes: customer.notes.clone(),
            created_at: Utc::now(),
        };

        conn.execute(
            "INSERT INTO customers (id, name, email, phone, account_id, is_vip, last_loan_status, kyc_status, notes, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                record.id.to_string(),
                record.name.clone(),
                record.email.clone(),
                opt_text(record.phone.as_deref()),
                opt_text(record.account_id.as_deref()),
                record.is_vip as i64,
                opt_text(record.last_loan_status.as_deref()),
                opt_text(record.kyc_status.as_deref()),
                opt_text(record.notes.as_deref()),
                record.created_at.to_rfc3339(),
            ],
        )
        .await
        .map_err(|e| DatabaseError::Query(format!("create_customer: {e}")))?;

        debug!(customer_id = %record.id, "Customer created");
        Ok(record)
    }

    async fn list_customers(
        &self,
        q: Option<&str>,
        limit: i64,
    ) -> Result<Vec<Customer>, DatabaseError> {
        let conn = self.conn();
        let mut rows = match q {
            Some(q) => conn
                .query(
                    &format!(
                        "SELECT {CUSTOMER_COLUMNS} FROM customers \
                         WHERE name LIKE ?1 OR email LIKE ?1 OR phone LIKE ?1 \
                         ORDER BY rowid DESC LIMIT ?2"
                    ),
                    params![like_pattern(q), limit],
                )
                .await,
            None => {
                conn.query(
                    &format!(
                        "SELECT {CUSTOMER_COLUMNS} FROM customers ORDER BY rowid DESC LIMIT ?1"
                    ),
                    params![limit],
                )
                .await
            }
        }
        .map_err(|e| DatabaseError::Query(format!("list_customers: {e}")))?;

        let mut customers = Vec::new();
        while let Ok(Some(row)) = rows.next().await {
            match row_to_customer(&row) {
                Ok(customer) => customers.push(customer),
                Err(e) => tracing::warn!("Skipping customer row: {e}"),
            }
        }
        Ok(customers)
    }

    async fn get_customer(&self, id: Uuid) -> Result<Option<Customer>, DatabaseError> {
        self.customer_by_field("id", &id.to_string()).await
    }

    async fn find_customer_by_email(
        &self,
        email: &str,
    ) -> Result<Option<Customer>, DatabaseError> {
        self.customer_by_field("email", email).await
    }

    async fn find_customer_by_phone(
        &self,
        phone: &str,
    ) -> Result<Option<Customer>, DatabaseError> {
        self.customer_by_field("phone", phone).await
    }

    // ── Messages ────────────────────────────────────────────────────

    async fn insert_message(&self, message: &NewMessage) -> Result<Message, DatabaseError> {
        let conn = self.conn();
        let id = Uuid::new_v4();
        let created_at = Utc::now();

        // RETURNING makes reading the assigned sequence atomic with the
        // insert; `last_insert_rowid()` on the shared connection could
        // observe a concurrent task's row.
        let mut rows = conn
            .query(
                "INSERT INTO messages (id, customer_id, text, channel, direction, status, urgency_score, topic, created_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9) RETURNING seq",
                params![
                    id.to_string(),
                    message.customer_id.to_string(),
                    message.text.clone(),
                    message.channel.clone(),
                    direction_to_str(message.direction),
                    status_to_str(message.status),
                    message.urgency_score as i64,
                    opt_text(message.topic.map(topic_to_str)),
                    created_at.to_rfc3339(),
                ],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("insert_message: {e}")))?;

        let seq: i64 = match rows.next().await {
            Ok(Some(row)) => row
                .get(0)
                .map_err(|e| DatabaseError::Query(format!("insert_message seq: {e}")))?,
            Ok(None) => {
                return Err(DatabaseError::Query(
                    "insert_message: no sequence returned".into(),
                ));
            }
            Err(e) => return Err(DatabaseError::Query(format!("insert_message: {e}"))),
        };

        debug!(message_id = %id, seq, "Message inserted");
        Ok(Message {
            id,
            customer_id: message.customer_id,
            text: message.text.clone(),
            channel: message.channel.clone(),
            direction: message.direction,
            status: message.status,
            urgency_score: message.urgency_score,
            topic: message.topic,
            seq,
            created_at,
        })
    }

    async fn get_message(&self, id: Uuid) -> Result<Option<Message>, DatabaseError> {
        let conn = self.conn();
        let mut rows = conn
            .query(
                &format!("SELECT {MESSAGE_COLUMNS} FROM messages WHERE id = ?1"),
                params![id.to_string()],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("get_message: {e}")))?;

        match rows.next().await {
            Ok(Some(row)) => {
                let message = row_to_message(&row)
                    .map_err(|e| DatabaseError::Query(format!("get_message row parse: {e}")))?;
                Ok(Some(message))
            }
            Ok(None) => Ok(None),
            Err(e) => Err(DatabaseError::Query(format!("get_message: {e}"))),
        }
    }

    async fn list_messages(&self, query: &MessageQuery) -> Result<Vec<Message>, DatabaseError> {
        let conn = self.conn();

        let mut conditions: Vec<String> = Vec::new();
        let mut args: Vec<libsql::Value> = Vec::new();

        if let Some(customer_id) = query.customer_id {
            args.push(libsql::Value::Text(customer_id.to_string()));
            conditions.push(format!("customer_id = ?{}", args.len()));
        }
        if let Some(status) = query.status {
            args.push(libsql::Value::Text(status_to_str(status).to_string()));
            conditions.push(format!("status = ?{}", args.len()));
        }
        if let Some(topic) = query.topic {
            args.push(libsql::Value::Text(topic_to_str(topic).to_string()));
            conditions.push(format!("topic = ?{}", args.len()));
        }
        if let Some(ref q) = query.text_contains {
            args.push(libsql::Value::Text(like_pattern(q)));
            conditions.push(format!("text LIKE ?{}", args.len()));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", conditions.join(" AND "))
        };
        let order_clause = match query.sort {
            MessageSort::UrgencyDesc => " ORDER BY urgency_score DESC, seq DESC",
            MessageSort::NewestFirst => " ORDER BY seq DESC",
        };
        args.push(libsql::Value::Integer(query.limit));
        let sql = format!(
            "SELECT {MESSAGE_COLUMNS} FROM messages{where_clause}{order_clause} LIMIT ?{}",
            args.len()
        );

        let mut rows = conn
            .query(&sql, libsql::params_from_iter(args))
            .await
            .map_err(|e| DatabaseError::Query(format!("list_messages: {e}")))?;

        let mut messages = Vec::new();
        while let Ok(Some(row)) = rows.next().await {
            match row_to_message(&row) {
                Ok(message) => messages.push(message),
                Err(e) => tracing::warn!("Skipping message row: {e}"),
            }
        }
        Ok(messages)
    }

    async fn messages_for_aggregation(&self) -> Result<Vec<Message>, DatabaseError> {
        let conn = self.conn();
        let mut rows = conn
            .query(
                &format!("SELECT {MESSAGE_COLUMNS} FROM messages ORDER BY seq ASC"),
                (),
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("messages_for_aggregation: {e}")))?;

        let mut messages = Vec::new();
        while let Ok(Some(row)) = rows.next().await {
            match row_to_message(&row) {
                Ok(message) => messages.push(message),
                Err(e) => tracing::warn!("Skipping message row: {e}"),
            }
        }
        Ok(messages)
    }

    // ── Canned responses ────────────────────────────────────────────

    async fn list_canned(&self) -> Result<Vec<CannedResponse>, DatabaseError> {
        let conn = self.conn();
        let mut rows = conn
            .query(
                &format!("SELECT {CANNED_COLUMNS} FROM canned_responses ORDER BY title ASC"),
                (),
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("list_canned: {e}")))?;

        let mut canned = Vec::new();
        while let Ok(Some(row)) = rows.next().await {
            match row_to_canned(&row) {
                Ok(item) => canned.push(item),
                Err(e) => tracing::warn!("Skipping canned row: {e}"),
            }
        }
        Ok(canned)
    }

    async fn insert_canned(
        &self,
        canned: &NewCannedResponse,
    ) -> Result<CannedResponse, DatabaseError> {
        let conn = self.conn();
        let record = CannedResponse {
            id: Uuid::new_v4(),
            title: canned.title.clone(),
            text: canned.text.clone(),
            tags: canned.tags.clone(),
            created_at: Utc::now(),
        };
        let tags_json = serde_json::to_string(&record.tags)
            .map_err(|e| DatabaseError::Serialization(format!("canned tags: {e}")))?;

        conn.execute(
            "INSERT INTO canned_responses (id, title, text, tags, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                record.id.to_string(),
                record.title.clone(),
                record.text.clone(),
                tags_json,
                record.created_at.to_rfc3339(),
            ],
        )
        .await
        .map_err(|e| DatabaseError::Query(format!("insert_canned: {e}")))?;

        debug!(canned_id = %record.id, title = %record.title, "Canned response created");
        Ok(record)
    }
}

impl LibSqlBackend {
    async fn customer_by_field(
        &self,
        field: &str,
        value: &str,
    ) -> Result<Option<Customer>, DatabaseError> {
        let conn = self.conn();
        let mut rows = conn
            .query(
                &format!("SELECT {CUSTOMER_COLUMNS} FROM customers WHERE {field} = ?1"),
                params![value],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("customer_by_{field}: {e}")))?;

        match rows.next().await {
            Ok(Some(row)) => {
                let customer = row_to_customer(&row).map_err(|e| {
                    DatabaseError::Query(format!("customer_by_{field} row parse: {e}"))
                })?;
                Ok(Some(customer))
            }
            Ok(None) => Ok(None),
            Err(e) => Err(DatabaseError::Query(format!("customer_by_{field}: {e}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_customer(name: &str, email: &str, phone: Option<&str>) -> NewCustomer {
        NewCustomer {
            name: name.into(),
            email: email.into(),
            phone: phone.map(String::from),
            account_id: None,
            is_vip: false,
            last_loan_status: None,
            kyc_status: None,
            notes: None,
        }
    }

    fn new_message(customer_id: Uuid, text: &str, urgency: u8, topic: Option<Topic>) -> NewMessage {
        NewMessage {
            customer_id,
            text: text.into(),
            channel: "web".into(),
            direction: Direction::Inbound,
            status: MessageStatus::Open,
            urgency_score: urgency,
            topic,
        }
    }

    #[tokio::test]
    async fn customer_roundtrip() {
        let db = LibSqlBackend::new_memory().await.unwrap();
        let created = db
            .create_customer(&new_customer("Amina", "amina@example.com", Some("+2547000")))
            .await
            .unwrap();

        let fetched = db.get_customer(created.id).await.unwrap().unwrap();
        assert_eq!(fetched.name, "Amina");
        assert_eq!(fetched.email, "amina@example.com");
        assert_eq!(fetched.phone.as_deref(), Some("+2547000"));
        assert!(!fetched.is_vip);
    }

    #[tokio::test]
    async fn customer_lookup_by_email_and_phone() {
        let db = LibSqlBackend::new_memory().await.unwrap();
        db.create_customer(&new_customer("Joy", "joy@example.com", Some("123")))
            .await
            .unwrap();

        assert!(db.find_customer_by_email("joy@example.com").await.unwrap().is_some());
        assert!(db.find_customer_by_email("other@example.com").await.unwrap().is_none());
        assert!(db.find_customer_by_phone("123").await.unwrap().is_some());
        assert!(db.find_customer_by_phone("999").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn customer_search_matches_substring() {
        let db = LibSqlBackend::new_memory().await.unwrap();
        db.create_customer(&new_customer("Brian Otieno", "brian@example.com", None))
            .await
            .unwrap();
        db.create_customer(&new_customer("Cate", "cate@example.com", None))
            .await
            .unwrap();

        let hits = db.list_customers(Some("otieno"), 100).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Brian Otieno");

        let all = db.list_customers(None, 100).await.unwrap();
        assert_eq!(all.len(), 2);
        // Newest first
        assert_eq!(all[0].name, "Cate");
    }

    #[tokio::test]
    async fn message_seq_is_strictly_increasing() {
        let db = LibSqlBackend::new_memory().await.unwrap();
        let customer_id = Uuid::new_v4();

        let first = db
            .insert_message(&new_message(customer_id, "one", 30, Some(Topic::Loan)))
            .await
            .unwrap();
        let second = db
            .insert_message(&new_message(customer_id, "two", 0, None))
            .await
            .unwrap();

        assert!(second.seq > first.seq);

        let fetched = db.get_message(first.id).await.unwrap().unwrap();
        assert_eq!(fetched.seq, first.seq);
        assert_eq!(fetched.text, "one");
        assert_eq!(fetched.topic, Some(Topic::Loan));
    }

    #[tokio::test]
    async fn concurrent_inserts_return_their_own_seq() {
        let db = std::sync::Arc::new(LibSqlBackend::new_memory().await.unwrap());
        let customer_id = Uuid::new_v4();

        let mut handles = Vec::new();
        for i in 0..8 {
            let db = std::sync::Arc::clone(&db);
            handles.push(tokio::spawn(async move {
                db.insert_message(&new_message(customer_id, &format!("m{i}"), 0, None))
                    .await
                    .unwrap()
            }));
        }

        let mut seqs = Vec::new();
        for handle in handles {
            let returned = handle.await.unwrap();
            // The seq handed back must be the one on the stored row, not a
            // neighbour's.
            let stored = db.get_message(returned.id).await.unwrap().unwrap();
            assert_eq!(stored.seq, returned.seq);
            assert_eq!(stored.text, returned.text);
            seqs.push(returned.seq);
        }
        seqs.sort();
        seqs.dedup();
        assert_eq!(seqs.len(), 8);
    }

    #[tokio::test]
    async fn local_database_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("supportline.db");

        let created = {
            let db = LibSqlBackend::new_local(&path).await.unwrap();
            db.create_customer(&new_customer("Amina", "amina@example.com", None))
                .await
                .unwrap()
        };

        // Reopening runs migrations again and sees the existing data.
        let db = LibSqlBackend::new_local(&path).await.unwrap();
        let fetched = db.get_customer(created.id).await.unwrap().unwrap();
        assert_eq!(fetched.name, "Amina");
    }

    #[test]
    fn corrupt_datetime_falls_back_to_epoch_minimum() {
        assert_eq!(parse_datetime("not a date"), DateTime::<Utc>::MIN_UTC);
        assert_eq!(
            parse_datetime("2026-08-30 10:00:00").timestamp(),
            parse_datetime("2026-08-30T10:00:00Z").timestamp()
        );
    }

    #[test]
    fn corrupt_uuid_falls_back_to_nil() {
        assert_eq!(parse_stored_uuid("garbage", "messages.id"), Uuid::nil());
    }

    #[tokio::test]
    async fn list_messages_filters_and_sorts() {
        let db = LibSqlBackend::new_memory().await.unwrap();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        db.insert_message(&new_message(a, "calm question", 10, None)).await.unwrap();
        db.insert_message(&new_message(b, "loan is overdue", 80, Some(Topic::Loan)))
            .await
            .unwrap();
        db.insert_message(&new_message(a, "another LOAN thing", 40, Some(Topic::Loan)))
            .await
            .unwrap();

        let query = MessageQuery {
            customer_id: None,
            status: None,
            text_contains: Some("loan".into()),
            topic: None,
            sort: MessageSort::UrgencyDesc,
            limit: 200,
        };
        let hits = db.list_messages(&query).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].urgency_score, 80);
        assert_eq!(hits[1].urgency_score, 40);

        let by_customer = MessageQuery {
            customer_id: Some(a),
            status: None,
            text_contains: None,
            topic: None,
            sort: MessageSort::NewestFirst,
            limit: 200,
        };
        let hits = db.list_messages(&by_customer).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].text, "another LOAN thing");
    }

    #[tokio::test]
    async fn aggregation_snapshot_is_seq_ascending() {
        let db = LibSqlBackend::new_memory().await.unwrap();
        let customer_id = Uuid::new_v4();
        for text in ["one", "two", "three"] {
            db.insert_message(&new_message(customer_id, text, 0, None)).await.unwrap();
        }

        let snapshot = db.messages_for_aggregation().await.unwrap();
        assert_eq!(snapshot.len(), 3);
        assert!(snapshot.windows(2).all(|w| w[0].seq < w[1].seq));
    }

    #[tokio::test]
    async fn canned_roundtrip_sorted_by_title() {
        let db = LibSqlBackend::new_memory().await.unwrap();
        db.insert_canned(&NewCannedResponse {
            title: "Zebra".into(),
            text: "z".into(),
            tags: vec!["misc".into()],
        })
        .await
        .unwrap();
        db.insert_canned(&NewCannedResponse {
            title: "Alpha".into(),
            text: "a".into(),
            tags: Vec::new(),
        })
        .await
        .unwrap();

        let canned = db.list_canned().await.unwrap();
        assert_eq!(canned.len(), 2);
        assert_eq!(canned[0].title, "Alpha");
        assert_eq!(canned[1].title, "Zebra");
        assert_eq!(canned[1].tags, vec!["misc".to_string()]);
    }
}
