// Configuration for the parsing pipeline:
// - Helius API key and endpoint
// - Database connection string
// - Retry / backoff and pacing settings for the fetch client
// - Token whitelist override and extraction mode

use dotenv::dotenv;
use std::env;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_HELIUS_BASE_URL: &str = "https://api.helius.xyz";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
}

/// How swap legs are derived from a detected instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExtractionMode {
    /// Legs come from the transaction's token/native transfer records.
    #[default]
    Transfers,
    /// Fixed SOL -> USDC stand-in values, kept for parity with V1 output.
    Placeholder,
}

impl ExtractionMode {
    pub fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "transfers" => Ok(Self::Transfers),
            "placeholder" => Ok(Self::Placeholder),
            _ => Err(ConfigError::InvalidValue {
                name: "SWAP_EXTRACTION_MODE",
                value: value.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub helius_api_key: String,
    pub helius_base_url: String,
    pub request_timeout: Duration,
    pub max_attempts: usize,
    pub retry_base_delay: Duration,
    pub retry_max_delay: Duration,
    pub batch_delay: Duration,
    pub rate_limit_per_sec: Option<u32>,
    pub token_whitelist: Option<Vec<String>>,
    pub extraction_mode: ExtractionMode,
}

impl Config {
    /// Defaults for everything except the two required inputs.
    pub fn new(helius_api_key: impl Into<String>, database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            database_max_connections: 5,
            helius_api_key: helius_api_key.into(),
            helius_base_url: DEFAULT_HELIUS_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(30),
            max_attempts: 5,
            retry_base_delay: Duration::from_secs(1),
            retry_max_delay: Duration::from_secs(60),
            batch_delay: Duration::from_millis(100),
            rate_limit_per_sec: Some(10),
            token_whitelist: None,
            extraction_mode: ExtractionMode::Transfers,
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();

        let helius_api_key = env::var("HELIUS_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or(ConfigError::MissingVar("HELIUS_API_KEY"))?;
        let database_url = env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:swaps.db".to_string());

        let mut config = Self::new(helius_api_key, database_url);

        config.database_max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .map(|v| v.parse().unwrap_or(5))
            .unwrap_or(5);
        config.helius_base_url = env::var("HELIUS_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_HELIUS_BASE_URL.to_string());
        config.request_timeout = env::var("HELIUS_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".to_string())
            .parse()
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(30));
        config.max_attempts = env::var("HELIUS_MAX_ATTEMPTS")
            .map(|v| v.parse().unwrap_or(5))
            .unwrap_or(5)
            .max(1);
        config.retry_base_delay = env::var("HELIUS_RETRY_BASE_MS")
            .unwrap_or_else(|_| "1000".to_string())
            .parse()
            .map(Duration::from_millis)
            .unwrap_or(Duration::from_secs(1));
        config.retry_max_delay = env::var("HELIUS_RETRY_MAX_MS")
            .unwrap_or_else(|_| "60000".to_string())
            .parse()
            .map(Duration::from_millis)
            .unwrap_or(Duration::from_secs(60));
        config.batch_delay = env::var("HELIUS_BATCH_DELAY_MS")
            .unwrap_or_else(|_| "100".to_string())
            .parse()
            .map(Duration::from_millis)
            .unwrap_or(Duration::from_millis(100));
        config.rate_limit_per_sec = match env::var("HELIUS_RATE_LIMIT") {
            Ok(v) => v.parse().ok().filter(|limit| *limit > 0),
            Err(_) => Some(10),
        };
        config.token_whitelist = env::var("TOKEN_WHITELIST").ok().map(|list| parse_token_list(&list));
        if let Ok(mode) = env::var("SWAP_EXTRACTION_MODE") {
            config.extraction_mode = ExtractionMode::parse(&mode)?;
        }

        Ok(config)
    }
}

/// Split a comma-separated mint list, dropping blanks.
pub fn parse_token_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|mint| !mint.is_empty())
        .map(str::to_string)
        .collect()
}
