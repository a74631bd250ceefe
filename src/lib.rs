//! supportline — customer-message triage and real-time notification backend.

pub mod config;
pub mod error;
pub mod model;
pub mod realtime;
pub mod routes;
pub mod store;
pub mod triage;
