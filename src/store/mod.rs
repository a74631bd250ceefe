//! Persistence layer — libSQL-backed storage for customers, messages, and
//! canned responses.

pub mod libsql_backend;
pub mod migrations;
pub mod traits;

pub use libsql_backend::LibSqlBackend;
pub use traits::{Database, MessageQuery, MessageSort, NewCannedResponse, NewCustomer, NewMessage};
