use crate::utils::AppError;
use serde_json::Value;
use std::time::Duration;

/// Gemini BTC/USD public ticker
pub const GEMINI_BTCUSD_URL: &str = "https://api.gemini.com/v1/pubticker/btcusd";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Fetches one third-party ticker and hands the JSON back untouched.
#[derive(Clone)]
pub struct TickerClient {
    client: reqwest::Client,
    url: String,
}

impl TickerClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    // GET /gemini
    pub async fn fetch(&self) -> Result<Value, AppError> {
        log::info!("📈 Fetching ticker from {}", self.url);

        let response = self
            .client
            .get(&self.url)
            .header("Accept", "application/json")
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AppError::Upstream(format!(
                "HTTP error! status: {}",
                response.status()
            )));
        }

        let data: Value = response.json().await?;
        log::debug!("Ticker data: {}", data);

        Ok(data)
    }
}
