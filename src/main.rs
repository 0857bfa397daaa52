mod api;
mod config;
mod database;
mod jobs;
mod models;
mod realtime;
mod services;
mod state;
mod utils;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use config::{AppConfig, StoreBackend};
use database::{DocumentStore, MemoryStore, MongoDB};
use dotenv::dotenv;
use services::ticker_service::TickerClient;
use state::AppState;
use std::sync::Arc;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("❌ Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    log::info!("🚀 Starting Sensor Relay...");
    log::info!("📊 Database: {}", config.database);

    let store: Arc<dyn DocumentStore> = match &config.backend {
        StoreBackend::MongoDB { uri } => match MongoDB::new(uri, &config.database).await {
            Ok(db) => {
                log::info!("✅ MongoDB connected successfully");
                Arc::new(db)
            }
            Err(e) => {
                log::error!("❌ Error connecting to MongoDB: {}", e);
                std::process::exit(1);
            }
        },
        StoreBackend::Memory => {
            log::warn!("🧪 Using in-memory store: data is lost on restart");
            Arc::new(MemoryStore::new(&config.database))
        }
    };

    let ticker = TickerClient::new(config.ticker_url.clone());
    log::info!("💰 Ticker source: {}", ticker.url());

    let state = AppState::new(store, ticker);

    // 📡 Change stream -> WebSocket clients, for the lifetime of the process
    let _bridge = jobs::change_bridge::start_change_bridge(
        state.store.clone(),
        state.broadcaster.clone(),
        state.change_feed.clone(),
    )
    .await;

    let state_data = web::Data::new(state);

    let server = HttpServer::new(move || {
        App::new()
            .app_data(state_data.clone())
            .wrap(Cors::permissive())
            .wrap(Logger::default())
            .configure(api::configure)
    })
    .bind(config.bind_addr())?;

    let display_host = utils::network::display_host(&config.host);
    log::info!("🌐 Server is running on http://{}:{}", display_host, config.port);
    log::info!("📡 Real-time updates at ws://{}:{}/ws", display_host, config.port);
    log::info!("📚 Swagger UI available at: http://{}:{}/swagger-ui/", display_host, config.port);

    server.run().await
}
