use crate::models::{NewRawTransaction, RawTransaction};
use chrono::Utc;
use sqlx::{Pool, Row, Sqlite};
use tracing::{debug, info};

/// Store one page of fetched transactions for a job.
///
/// Runs in a single database transaction; rows whose signature is already
/// stored are skipped. Returns the number of rows actually inserted.
pub async fn insert_raw_transactions(
    pool: &Pool<Sqlite>,
    job_id: &str,
    wallet_address: &str,
    transactions: &[NewRawTransaction],
) -> Result<u64, sqlx::Error> {
    if transactions.is_empty() {
        return Ok(0);
    }

    let created_at = Utc::now().to_rfc3339();
    let mut tx = pool.begin().await?;
    let mut inserted = 0;

    for transaction in transactions {
        let result = sqlx::query(
            r#"
            INSERT INTO raw_transactions
            (job_id, wallet_address, signature, block_time, raw_transaction_data, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(signature) DO NOTHING
            "#,
        )
        .bind(job_id)
        .bind(wallet_address)
        .bind(&transaction.signature)
        .bind(transaction.block_time)
        .bind(transaction.payload.to_string())
        .bind(&created_at)
        .execute(&mut *tx)
        .await?;

        inserted += result.rows_affected();
    }

    tx.commit().await?;

    debug!(
        "Stored {} of {} raw transactions for job {}",
        inserted,
        transactions.len(),
        job_id
    );
    Ok(inserted)
}

pub async fn get_raw_transactions_for_job(
    pool: &Pool<Sqlite>,
    job_id: &str,
) -> Result<Vec<RawTransaction>, sqlx::Error> {
    let rows = sqlx::query(
        r#"SELECT id, job_id, wallet_address, signature, block_time, raw_transaction_data
           FROM raw_transactions
           WHERE job_id = ?
           ORDER BY block_time ASC, id ASC"#,
    )
    .bind(job_id)
    .fetch_all(pool)
    .await?;

    let transactions: Vec<RawTransaction> = rows
        .iter()
        .map(|row| RawTransaction {
            id: row.get("id"),
            job_id: row.get("job_id"),
            wallet_address: row.get("wallet_address"),
            signature: row.get("signature"),
            block_time: row.get("block_time"),
            raw_transaction_data: row.get("raw_transaction_data"),
        })
        .collect();

    info!("Raw transactions fetched for job {}: {}", job_id, transactions.len());
    Ok(transactions)
}
