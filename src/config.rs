// ==================== CONFIGURATION ====================
// Everything is environment-sourced (.env is loaded in main before this runs)

use std::env;
use thiserror::Error;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 5000;
const DEFAULT_CLUSTER: &str = "cluster0.gi5qy.mongodb.net";
const DEFAULT_DATABASE: &str = "StayNestDB";
const DEFAULT_TICKER_URL: &str = "https://api.gemini.com/v1/pubticker/btcusd";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("invalid {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum StoreBackend {
    MongoDB { uri: String },
    Memory,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub backend: StoreBackend,
    pub database: String,
    pub ticker_url: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup; `from_env` passes `env::var`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());

        let port = match lookup("PORT") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
                name: "PORT",
                value: raw.clone(),
            })?,
            None => DEFAULT_PORT,
        };

        let backend = match lookup("STORE_BACKEND").as_deref().map(str::to_lowercase) {
            None => mongodb_backend(&lookup)?,
            Some(kind) if kind == "mongodb" => mongodb_backend(&lookup)?,
            Some(kind) if kind == "memory" => StoreBackend::Memory,
            Some(kind) => {
                return Err(ConfigError::Invalid {
                    name: "STORE_BACKEND",
                    value: kind,
                })
            }
        };

        Ok(Self {
            host,
            port,
            backend,
            database: lookup("MONGODB_DATABASE").unwrap_or_else(|| DEFAULT_DATABASE.to_string()),
            ticker_url: lookup("TICKER_URL").unwrap_or_else(|| DEFAULT_TICKER_URL.to_string()),
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn mongodb_backend<F>(lookup: &F) -> Result<StoreBackend, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(uri) = lookup("MONGODB_URI") {
        return Ok(StoreBackend::MongoDB { uri });
    }

    let username = lookup("MONGODB_USERNAME").ok_or(ConfigError::Missing("MONGODB_USERNAME"))?;
    let password = lookup("MONGODB_PASSWORD").ok_or(ConfigError::Missing("MONGODB_PASSWORD"))?;
    let cluster = lookup("MONGODB_CLUSTER").unwrap_or_else(|| DEFAULT_CLUSTER.to_string());

    let uri = format!(
        "mongodb+srv://{}:{}@{}/?retryWrites=true&w=majority&appName=Cluster0",
        urlencoding::encode(&username),
        urlencoding::encode(&password),
        cluster
    );

    Ok(StoreBackend::MongoDB { uri })
}
