// ==================== REAL-TIME BROADCAST ====================
// Registry of connected real-time clients with publish-to-all.
// Delivery is best-effort: no acks, no backlog for late joiners.
// Each client has a bounded queue; a client that lets it fill is dropped.

use parking_lot::Mutex;
use serde::Serialize;
use serde_json::Value;
use std::{collections::HashMap, sync::Arc};
use tokio::sync::mpsc::{self, error::TrySendError};

pub type ClientId = u64;

/// Frames a client may have queued before it is considered stalled.
pub const CLIENT_QUEUE_CAPACITY: usize = 256;

/// Frame pushed to every client: `{"event": ..., "data": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutboundEvent {
    pub event: String,
    pub data: Value,
}

#[derive(Clone, Default)]
pub struct Broadcaster {
    registry: Arc<Mutex<Registry>>,
}

#[derive(Default)]
struct Registry {
    next_id: ClientId,
    clients: HashMap<ClientId, mpsc::Sender<Arc<OutboundEvent>>>,
}

impl Broadcaster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a client; events arrive on the returned receiver until
    /// `disconnect` or the receiver is dropped.
    pub fn connect(&self) -> (ClientId, mpsc::Receiver<Arc<OutboundEvent>>) {
        let (tx, rx) = mpsc::channel(CLIENT_QUEUE_CAPACITY);
        let mut registry = self.registry.lock();
        registry.next_id += 1;
        let id = registry.next_id;
        registry.clients.insert(id, tx);
        log::info!("🔌 Client {} connected ({} online)", id, registry.clients.len());
        (id, rx)
    }

    pub fn disconnect(&self, id: ClientId) {
        let mut registry = self.registry.lock();
        if registry.clients.remove(&id).is_some() {
            log::info!("🔌 Client {} disconnected ({} online)", id, registry.clients.len());
        }
    }

    /// Sends `data` as `event` to every registered client and returns how
    /// many were reached. Clients whose receiver is gone, or whose queue
    /// is full, are dropped from the registry; dropping the sender ends
    /// their receiver once it drains.
    pub fn broadcast(&self, event: &str, data: Value) -> usize {
        let frame = Arc::new(OutboundEvent {
            event: event.to_string(),
            data,
        });

        let mut registry = self.registry.lock();
        let mut gone = Vec::new();
        for (id, tx) in registry.clients.iter() {
            match tx.try_send(Arc::clone(&frame)) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) => {
                    log::warn!("⚠️ Client {} is not reading; disconnecting", id);
                    gone.push(*id);
                }
                Err(TrySendError::Closed(_)) => gone.push(*id),
            }
        }
        for id in &gone {
            registry.clients.remove(id);
            log::debug!("Dropped stale client {}", id);
        }

        registry.clients.len()
    }

    pub fn client_count(&self) -> usize {
        self.registry.lock().clients.len()
    }
}
