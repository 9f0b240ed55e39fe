//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub database_url: String,
    pub log_level: Level,
    /// Public base URL of this deployment; used for the gateway's browser
    /// redirect and webhook notification targets.
    pub base_url: String,
    pub gemini_api_key: String,
    pub report_model: String,
    /// Gateway server key; signs webhook notifications and authenticates
    /// order creation.
    pub gateway_server_key: String,
    /// Snap-style order creation endpoint of the payment gateway.
    pub gateway_url: String,
    /// Fixed price of one report, in the gateway's smallest currency unit.
    pub report_price: u64,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        // --- Load Server and Database Settings ---
        let bind_address_str =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let bind_address = bind_address_str
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string()))?;

        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| ConfigError::MissingVar("DATABASE_URL".to_string()))?;

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let base_url = std::env::var("BASE_URL")
            .map_err(|_| ConfigError::MissingVar("BASE_URL".to_string()))?;

        // --- Load External Service Settings ---
        let gemini_api_key = std::env::var("GEMINI_API_KEY")
            .map_err(|_| ConfigError::MissingVar("GEMINI_API_KEY".to_string()))?;

        let report_model =
            std::env::var("REPORT_MODEL").unwrap_or_else(|_| "gemini-2.0-flash".to_string());

        let gateway_server_key = std::env::var("GATEWAY_SERVER_KEY")
            .map_err(|_| ConfigError::MissingVar("GATEWAY_SERVER_KEY".to_string()))?;

        let gateway_url = std::env::var("GATEWAY_URL")
            .map_err(|_| ConfigError::MissingVar("GATEWAY_URL".to_string()))?;

        let report_price = match std::env::var("REPORT_PRICE") {
            Ok(raw) => raw.parse::<u64>().map_err(|e| {
                ConfigError::InvalidValue("REPORT_PRICE".to_string(), e.to_string())
            })?,
            Err(_) => 9005,
        };

        Ok(Self {
            bind_address,
            database_url,
            log_level,
            base_url,
            gemini_api_key,
            report_model,
            gateway_server_key,
            gateway_url,
            report_price,
        })
    }
}
