//! Real-time delivery — observer hub and the WebSocket feed endpoint.

pub mod hub;
pub mod ws;

pub use hub::{NotificationHub, ObserverHandle, ObserverId};
