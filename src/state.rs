use crate::{
    database::DocumentStore,
    jobs::change_bridge::ChangeFeedStatus,
    realtime::Broadcaster,
    services::ticker_service::TickerClient,
};
use std::sync::Arc;

/// Everything handlers share, built once in main and handed to actix as
/// `web::Data<AppState>`.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub broadcaster: Broadcaster,
    pub ticker: TickerClient,
    pub change_feed: ChangeFeedStatus,
}

impl AppState {
    pub fn new(store: Arc<dyn DocumentStore>, ticker: TickerClient) -> Self {
        Self {
            store,
            broadcaster: Broadcaster::new(),
            ticker,
            change_feed: ChangeFeedStatus::default(),
        }
    }
}
