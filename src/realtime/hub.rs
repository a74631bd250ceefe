//! Live observer registry with best-effort fan-out of message events.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::{RwLock, mpsc};
use tracing::{debug, info, warn};

use crate::model::{Message, WsEvent};

/// Per-observer event channel capacity.
const OBSERVER_CAPACITY: usize = 64;

/// Opaque identity of a connected observer.
pub type ObserverId = u64;

struct Observer {
    id: ObserverId,
    tx: mpsc::Sender<WsEvent>,
}

/// Handle returned from [`NotificationHub::connect`].
///
/// Holds the receiving end of the observer's event stream. Dropping the
/// handle makes the next delivery attempt fail, which prunes the observer
/// from the registry.
pub struct ObserverHandle {
    pub id: ObserverId,
    pub rx: mpsc::Receiver<WsEvent>,
}

/// In-process registry of live observers.
///
/// An owned component, not process-global state: independent hub instances
/// never interfere. The registry preserves insertion order, so each
/// broadcast delivers in registration order. Delivery is best-effort and
/// at-most-once per observer per call — no queueing, no retries — and a
/// failed delivery disconnects only the failing observer.
pub struct NotificationHub {
    observers: RwLock<Vec<Observer>>,
    next_id: AtomicU64,
}

impl NotificationHub {
    /// Create a hub with an empty registry.
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            observers: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(1),
        })
    }

    /// Register a new observer. Always succeeds.
    pub async fn connect(&self) -> ObserverHandle {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::channel(OBSERVER_CAPACITY);

        let mut observers = self.observers.write().await;
        observers.push(Observer { id, tx });
        info!(observer_id = id, total = observers.len(), "Observer connected");

        ObserverHandle { id, rx }
    }

    /// Remove an observer. Idempotent: unknown or already-removed ids are a
    /// no-op.
    pub async fn disconnect(&self, id: ObserverId) {
        let mut observers = self.observers.write().await;
        let before = observers.len();
        observers.retain(|obs| obs.id != id);
        if observers.len() < before {
            info!(observer_id = id, total = observers.len(), "Observer disconnected");
        }
    }

    /// Deliver a `message_created` envelope to every registered observer in
    /// registration order. Delivery never waits: a full or closed channel is
    /// a failed delivery, and the failing observer is dropped from the
    /// registry without affecting delivery to the others.
    pub async fn broadcast(&self, message: &Message) {
        let event = WsEvent::MessageCreated {
            data: message.clone(),
        };

        // Snapshot the senders so no lock is held while delivering.
        let targets: Vec<(ObserverId, mpsc::Sender<WsEvent>)> = {
            let observers = self.observers.read().await;
            observers.iter().map(|obs| (obs.id, obs.tx.clone())).collect()
        };

        let mut failed: Vec<ObserverId> = Vec::new();
        for (id, tx) in targets.iter() {
            // At-most-once, no queueing: an observer that stopped draining
            // its channel fails delivery just like one whose channel closed.
            if tx.try_send(event.clone()).is_err() {
                warn!(observer_id = *id, "Delivery failed, dropping observer");
                failed.push(*id);
            }
        }

        if !failed.is_empty() {
            let mut observers = self.observers.write().await;
            observers.retain(|obs| !failed.contains(&obs.id));
        }

        debug!(
            message_id = %message.id,
            delivered = targets.len() - failed.len(),
            "Message broadcast"
        );
    }

    /// Number of currently registered observers.
    pub async fn observer_count(&self) -> usize {
        self.observers.read().await.len()
    }
}
