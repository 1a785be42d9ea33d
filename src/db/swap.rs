use crate::models::{CanonicalSwap, JobStatistics};
use chrono::{DateTime, Utc};
use sqlx::{Pool, Row, Sqlite};
use tracing::{debug, info, warn};

/// Insert parsed swaps, ignoring signatures that are already stored.
///
/// The whole batch runs inside one transaction. The return value is the number
/// of rows the store actually accepted, so a re-run of the same job reports 0.
pub async fn insert_swaps(pool: &Pool<Sqlite>, swaps: &[CanonicalSwap]) -> Result<u64, sqlx::Error> {
    if swaps.is_empty() {
        info!("No swaps to insert");
        return Ok(0);
    }

    // Start a transaction for batch insert
    let mut tx = pool.begin().await?;
    let mut inserted = 0;

    for swap in swaps {
        let amount_in = to_db_amount(swap.amount_in)?;
        let amount_out = to_db_amount(swap.amount_out)?;

        let result = sqlx::query(
            r#"
            INSERT INTO parsed_swaps
            (ingestion_job_id, raw_transaction_id, wallet_address, signature, block_time,
             from_token_mint, to_token_mint, amount_in, amount_out, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(signature) DO NOTHING
            "#,
        )
        .bind(&swap.ingestion_job_id)
        .bind(swap.raw_transaction_id)
        .bind(&swap.wallet_address)
        .bind(&swap.signature)
        .bind(swap.block_time.to_rfc3339())
        .bind(&swap.from_token_mint)
        .bind(&swap.to_token_mint)
        .bind(amount_in)
        .bind(amount_out)
        .bind(swap.created_at.to_rfc3339())
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            debug!("Duplicate signature skipped: {}", swap.signature);
        }
        inserted += result.rows_affected();
    }

    // Commit the transaction
    tx.commit().await?;

    let duplicates = swaps.len() as u64 - inserted;
    if duplicates > 0 {
        info!("Skipped {} swaps with signatures already stored", duplicates);
    }
    info!("Inserted {} of {} parsed swaps", inserted, swaps.len());

    Ok(inserted)
}

fn to_db_amount(amount: u64) -> Result<i64, sqlx::Error> {
    i64::try_from(amount).map_err(|e| sqlx::Error::Encode(Box::new(e)))
}

pub async fn get_job_statistics(pool: &Pool<Sqlite>, job_id: &str) -> Result<JobStatistics, sqlx::Error> {
    let row = sqlx::query("SELECT raw_transactions, parsed_swaps FROM job_statistics WHERE job_id = ?")
        .bind(job_id)
        .fetch_optional(pool)
        .await?;

    // No row means the job never stored a raw transaction
    let stats = match row {
        Some(row) => JobStatistics::new(row.get("raw_transactions"), row.get("parsed_swaps")),
        None => JobStatistics::new(0, 0),
    };
    info!(
        job_id,
        raw_transactions = stats.raw_transactions,
        parsed_swaps = stats.parsed_swaps,
        parsing_rate = stats.parsing_rate,
        "Parsing job statistics calculated"
    );

    Ok(stats)
}

/// Most recent swaps across all jobs, newest first.
pub async fn get_recent_swaps(pool: &Pool<Sqlite>, limit: i64) -> Result<Vec<CanonicalSwap>, sqlx::Error> {
    let rows = sqlx::query(
        r#"SELECT ingestion_job_id, raw_transaction_id, wallet_address, signature, block_time,
                  from_token_mint, to_token_mint, amount_in, amount_out, created_at
           FROM parsed_swaps
           ORDER BY block_time DESC, id DESC
           LIMIT ?"#,
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    let mut swaps = Vec::with_capacity(rows.len());
    for row in &rows {
        let signature: String = row.get("signature");
        let (Some(block_time), Some(created_at)) = (
            parse_timestamp(row.get("block_time")),
            parse_timestamp(row.get("created_at")),
        ) else {
            warn!("Skipping swap {} with unreadable timestamps", signature);
            continue;
        };

        swaps.push(CanonicalSwap {
            ingestion_job_id: row.get("ingestion_job_id"),
            raw_transaction_id: row.get("raw_transaction_id"),
            wallet_address: row.get("wallet_address"),
            signature,
            block_time,
            from_token_mint: row.get("from_token_mint"),
            to_token_mint: row.get("to_token_mint"),
            amount_in: row.get::<i64, _>("amount_in").max(0) as u64,
            amount_out: row.get::<i64, _>("amount_out").max(0) as u64,
            created_at,
        });
    }

    Ok(swaps)
}

fn parse_timestamp(value: String) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(&value)
        .ok()
        .map(|ts| ts.with_timezone(&Utc))
}
