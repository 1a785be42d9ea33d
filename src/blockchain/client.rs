use crate::config::Config;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use reqwest::{header::RETRY_AFTER, StatusCode};
use serde_json::Value;
use std::future::Future;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Helius caps enhanced-transaction pages at 100 entries.
pub const PAGE_SIZE: u32 = 100;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Rate limited by upstream (retry after {retry_after:?})")]
    RateLimited { retry_after: Option<Duration> },

    #[error("Upstream returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("Unexpected response shape: {0}")]
    Decode(String),

    #[error("Page ended with a transaction that has no signature")]
    MissingCursor,

    #[error("Giving up after {attempts} attempts: {last}")]
    RetriesExhausted { attempts: usize, last: Box<ClientError> },
}

impl ClientError {
    /// Rate limiting and transport failures are worth another attempt: refused or
    /// dropped connections, timeouts, and bodies cut off or garbled in transit.
    pub fn is_retryable(&self) -> bool {
        match self {
            ClientError::RateLimited { .. } => true,
            ClientError::Http(e) => {
                e.is_timeout() || e.is_connect() || e.is_request() || e.is_body() || e.is_decode()
            }
            _ => false,
        }
    }

    /// Server-provided delay, if any.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            ClientError::RateLimited { retry_after } => *retry_after,
            _ => None,
        }
    }
}

/// One page of transaction history for an address.
///
/// Implementors perform exactly one request; retries and pagination are layered
/// on top by [`crate::blockchain::retry`] and [`crate::blockchain::pagination`].
pub trait BatchFetcher {
    fn fetch_batch(
        &self,
        address: &str,
        before: Option<&str>,
    ) -> impl Future<Output = Result<Vec<Value>, ClientError>> + Send;
}

/// Client for the Helius enhanced transactions API.
#[derive(Clone)]
pub struct HeliusClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    limiter: Option<Arc<DefaultDirectRateLimiter>>,
}

impl HeliusClient {
    pub fn new(config: &Config) -> Result<Self, ClientError> {
        Self::with_limiter(config, shared_limiter(config))
    }

    /// Build a client that draws from an existing request budget. Clients for the
    /// same API key should share one limiter.
    pub fn with_limiter(
        config: &Config,
        limiter: Option<Arc<DefaultDirectRateLimiter>>,
    ) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        info!(
            "Initializing Helius client with endpoint: {}, rate limit: {:?}/s",
            config.helius_base_url, config.rate_limit_per_sec
        );

        Ok(Self {
            http,
            base_url: config.helius_base_url.trim_end_matches('/').to_string(),
            api_key: config.helius_api_key.clone(),
            limiter,
        })
    }

    fn history_url(&self, address: &str) -> String {
        format!("{}/v0/addresses/{}/transactions", self.base_url, address)
    }
}

/// Token bucket for one API key, or `None` when no limit is configured.
pub fn shared_limiter(config: &Config) -> Option<Arc<DefaultDirectRateLimiter>> {
    let per_second = NonZeroU32::new(config.rate_limit_per_sec?)?;
    Some(Arc::new(RateLimiter::direct(Quota::per_second(per_second))))
}

impl BatchFetcher for HeliusClient {
    async fn fetch_batch(&self, address: &str, before: Option<&str>) -> Result<Vec<Value>, ClientError> {
        if let Some(limiter) = &self.limiter {
            limiter.until_ready().await;
        }

        let limit = PAGE_SIZE.to_string();
        let mut params = vec![("api-key", self.api_key.as_str()), ("limit", limit.as_str())];
        if let Some(cursor) = before {
            params.push(("before", cursor));
        }

        debug!("Fetching transaction batch for {} before {:?}", address, before);

        let response = self
            .http
            .get(self.history_url(address))
            .query(&params)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|value| value.to_str().ok())
                .and_then(parse_retry_after);
            warn!("Rate limited fetching {} (retry-after: {:?})", address, retry_after);
            return Err(ClientError::RateLimited { retry_after });
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Helius API error {} for {}: {}", status, address, body);
            return Err(ClientError::Status { status, body });
        }

        let body: Value = response.json().await?;
        let transactions = page_items(body)?;
        debug!("Fetched {} transactions for {}", transactions.len(), address);

        Ok(transactions)
    }
}

/// `Retry-After` in whole seconds. HTTP-date values are ignored.
pub fn parse_retry_after(value: &str) -> Option<Duration> {
    value.trim().parse::<u64>().ok().map(Duration::from_secs)
}

/// Pages come back as a bare array or wrapped in `{ "result": [...] }`.
pub fn page_items(body: Value) -> Result<Vec<Value>, ClientError> {
    match body {
        Value::Array(items) => Ok(items),
        Value::Object(mut obj) => match obj.remove("result") {
            Some(Value::Array(items)) => Ok(items),
            Some(Value::Null) | None => Ok(Vec::new()),
            Some(other) => Err(ClientError::Decode(format!("result is not an array: {}", other))),
        },
        other => Err(ClientError::Decode(format!("expected array, got {}", other))),
    }
}
