use crate::blockchain::client::BatchFetcher;
use crate::blockchain::pagination::{transaction_pages, FetchOptions};
use crate::db::raw_transaction::insert_raw_transactions;
use crate::error::PipelineError;
use crate::models::NewRawTransaction;
use crate::validation::{validate_job_id, validate_solana_address};
use futures::TryStreamExt;
use sqlx::SqlitePool;
use std::pin::pin;
use tracing::{error, info, warn};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestSummary {
    pub wallet_address: String,
    pub pages_fetched: usize,
    pub transactions_fetched: usize,
    pub transactions_stored: u64,
}

/// Fetch a wallet's complete history and store it as raw transactions of `job_id`.
///
/// Pages are committed as they arrive, so a failure part way through keeps the
/// pages already stored.
pub async fn ingest_wallet<F>(
    fetcher: &F,
    pool: &SqlitePool,
    options: &FetchOptions,
    job_id: &str,
    wallet_address: &str,
) -> Result<IngestSummary, PipelineError>
where
    F: BatchFetcher,
{
    validate_job_id(job_id)?;
    validate_solana_address(wallet_address)?;

    info!("Starting transaction fetch job {} for {}", job_id, wallet_address);

    let mut summary = IngestSummary {
        wallet_address: wallet_address.to_string(),
        ..IngestSummary::default()
    };
    let mut pages = pin!(transaction_pages(fetcher, wallet_address, options));

    while let Some(page) = pages.try_next().await? {
        summary.pages_fetched += 1;
        summary.transactions_fetched += page.len();

        let rows: Vec<NewRawTransaction> = page
            .into_iter()
            .filter_map(|payload| {
                let row = NewRawTransaction::from_payload(payload);
                if row.is_none() {
                    warn!("Skipping transaction without signature for {}", wallet_address);
                }
                row
            })
            .collect();

        summary.transactions_stored += insert_raw_transactions(pool, job_id, wallet_address, &rows).await?;
    }

    info!(
        job_id,
        wallet = wallet_address,
        pages = summary.pages_fetched,
        fetched = summary.transactions_fetched,
        stored = summary.transactions_stored,
        "Transaction fetch job completed"
    );

    Ok(summary)
}

/// Ingest several wallets of one job concurrently.
///
/// Each wallet is paged sequentially; wallets share the fetcher and therefore its
/// rate budget. One wallet failing does not stop the others.
pub async fn ingest_wallets<F>(
    fetcher: &F,
    pool: &SqlitePool,
    options: &FetchOptions,
    job_id: &str,
    wallets: &[String],
) -> Vec<Result<IngestSummary, PipelineError>>
where
    F: BatchFetcher,
{
    let jobs = wallets.iter().map(|wallet| async move {
        let result = ingest_wallet(fetcher, pool, options, job_id, wallet).await;
        if let Err(e) = &result {
            error!("Transaction fetch job {} failed for {}: {}", job_id, wallet, e);
        }
        result
    });

    futures::future::join_all(jobs).await
}
