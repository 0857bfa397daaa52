// ═══════════════════════════════════════════════════════════════════
// CHANGE BRIDGE: relays sensor_data change events to real-time clients
// ═══════════════════════════════════════════════════════════════════
//
// - Subscribes once, at startup, before the HTTP server accepts requests
// - Spawns one tokio task that forwards every event as `sensorDataUpdated`
// - No reconnection: when the stream ends or errors the feed is marked
//   degraded and the task exits (surfaced by /health)
//

use crate::{
    database::DocumentStore,
    models::{SENSOR_DATA, SENSOR_DATA_UPDATED},
    realtime::Broadcaster,
};
use futures::StreamExt;
use std::sync::{
    atomic::{AtomicU8, Ordering},
    Arc,
};
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedState {
    Starting = 0,
    Streaming = 1,
    Degraded = 2,
}

impl FeedState {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedState::Starting => "starting",
            FeedState::Streaming => "streaming",
            FeedState::Degraded => "degraded",
        }
    }
}

/// Shared view of the bridge's state; cheap to clone into handlers.
#[derive(Clone)]
pub struct ChangeFeedStatus(Arc<AtomicU8>);

impl Default for ChangeFeedStatus {
    fn default() -> Self {
        Self(Arc::new(AtomicU8::new(FeedState::Starting as u8)))
    }
}

impl ChangeFeedStatus {
    pub fn get(&self) -> FeedState {
        match self.0.load(Ordering::Acquire) {
            0 => FeedState::Starting,
            1 => FeedState::Streaming,
            _ => FeedState::Degraded,
        }
    }

    fn set(&self, state: FeedState) {
        self.0.store(state as u8, Ordering::Release);
    }
}

/// Opens the sensor_data subscription and spawns the forwarding task.
///
/// A failed subscription is not fatal to the process: the feed is marked
/// degraded and the returned task finishes immediately.
pub async fn start_change_bridge(
    store: Arc<dyn DocumentStore>,
    broadcaster: Broadcaster,
    status: ChangeFeedStatus,
) -> JoinHandle<()> {
    log::info!("📡 Starting change bridge on {}...", SENSOR_DATA);

    let mut stream = match store.subscribe(SENSOR_DATA).await {
        Ok(stream) => stream,
        Err(e) => {
            log::error!("❌ Could not watch {}: {}", SENSOR_DATA, e);
            status.set(FeedState::Degraded);
            return tokio::spawn(async {});
        }
    };

    status.set(FeedState::Streaming);
    log::info!("✅ Change bridge started successfully");

    tokio::spawn(async move {
        let mut relayed: u64 = 0;

        while let Some(item) = stream.next().await {
            match item {
                Ok(event) => {
                    log::info!(
                        "🔔 Change detected in {}: {} {:?}",
                        SENSOR_DATA,
                        event.operation_type().unwrap_or("unknown"),
                        event.document_key()
                    );
                    let reached = broadcaster.broadcast(SENSOR_DATA_UPDATED, event.to_json());
                    relayed += 1;
                    log::debug!("📤 {} #{} sent to {} clients", SENSOR_DATA_UPDATED, relayed, reached);
                }
                Err(e) => {
                    log::error!("❌ Change stream on {} failed: {}", SENSOR_DATA, e);
                    break;
                }
            }
        }

        status.set(FeedState::Degraded);
        log::warn!(
            "⚠️ Change bridge stopped after {} events; real-time updates are degraded",
            relayed
        );
    })
}
