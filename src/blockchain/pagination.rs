use crate::blockchain::client::{BatchFetcher, ClientError};
use crate::blockchain::retry::{retry_batch, RetryPolicy};
use crate::config::Config;
use futures::stream::{self, Stream, TryStreamExt};
use serde_json::Value;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info};

/// Pacing and retry settings for one history walk.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub retry: RetryPolicy,
    /// Pause between consecutive successful pages.
    pub batch_delay: Duration,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            retry: RetryPolicy::default(),
            batch_delay: Duration::from_millis(100),
        }
    }
}

impl FetchOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            retry: RetryPolicy::from_config(config),
            batch_delay: config.batch_delay,
        }
    }
}

struct Cursor {
    before: Option<String>,
    pages: usize,
}

/// Lazily walk an address's history one page at a time, newest first.
///
/// Each page is requested with the last signature of the previous page as the
/// `before` cursor, so pages are strictly sequential. The stream ends after the
/// first empty page, or with the first fatal error.
pub fn transaction_pages<'a, F>(
    fetcher: &'a F,
    address: &'a str,
    options: &'a FetchOptions,
) -> impl Stream<Item = Result<Vec<Value>, ClientError>> + 'a
where
    F: BatchFetcher + 'a,
{
    let start = Cursor {
        before: None,
        pages: 0,
    };

    stream::try_unfold(start, move |cursor| async move {
        if cursor.pages > 0 && !options.batch_delay.is_zero() {
            sleep(options.batch_delay).await;
        }

        let before = cursor.before.as_deref();
        let batch = retry_batch(&options.retry, || fetcher.fetch_batch(address, before)).await?;

        if batch.is_empty() {
            info!(
                "No more transactions for {}, pagination complete after {} pages",
                address, cursor.pages
            );
            return Ok::<_, ClientError>(None);
        }

        let next_before = batch
            .last()
            .and_then(|tx| tx.get("signature"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or(ClientError::MissingCursor)?;

        debug!(
            "Fetched page {} for {} ({} transactions, next before {})",
            cursor.pages + 1,
            address,
            batch.len(),
            next_before
        );

        let next = Cursor {
            before: Some(next_before),
            pages: cursor.pages + 1,
        };

        Ok(Some((batch, next)))
    })
}

/// Collect an address's complete history.
pub async fn fetch_transaction_history<F>(
    fetcher: &F,
    address: &str,
    options: &FetchOptions,
) -> Result<Vec<Value>, ClientError>
where
    F: BatchFetcher,
{
    let transactions: Vec<Value> = transaction_pages(fetcher, address, options)
        .try_concat()
        .await?;

    info!(
        "Complete transaction history fetched for {}: {} transactions",
        address,
        transactions.len()
    );

    Ok(transactions)
}
