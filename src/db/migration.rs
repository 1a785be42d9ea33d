use sqlx::SqlitePool;
use tracing::info;

pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    info!("Running database migrations...");

    // Create raw_transactions table if not exists
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS raw_transactions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            job_id TEXT NOT NULL,
            wallet_address TEXT NOT NULL,
            signature TEXT NOT NULL UNIQUE,
            block_time INTEGER NOT NULL,
            raw_transaction_data TEXT NOT NULL,
            created_at TEXT NOT NULL
        )"
    )
    .execute(pool)
    .await?;

    // Create parsed_swaps table if not exists
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS parsed_swaps (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            ingestion_job_id TEXT NOT NULL,
            raw_transaction_id INTEGER NOT NULL,
            wallet_address TEXT NOT NULL,
            signature TEXT NOT NULL UNIQUE,
            block_time TEXT NOT NULL,
            from_token_mint TEXT NOT NULL,
            to_token_mint TEXT NOT NULL,
            amount_in INTEGER NOT NULL,
            amount_out INTEGER NOT NULL,
            created_at TEXT NOT NULL,
            FOREIGN KEY (raw_transaction_id) REFERENCES raw_transactions(id)
        )"
    )
    .execute(pool)
    .await?;

    // Statistics are derived from the two tables, never stored
    sqlx::query(
        "CREATE VIEW IF NOT EXISTS job_statistics AS
         SELECT r.job_id AS job_id,
                COUNT(*) AS raw_transactions,
                (SELECT COUNT(*) FROM parsed_swaps s WHERE s.ingestion_job_id = r.job_id) AS parsed_swaps
         FROM raw_transactions r
         GROUP BY r.job_id"
    )
    .execute(pool)
    .await?;

    // Add indexes for common queries
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_raw_transactions_job_time
         ON raw_transactions(job_id, block_time)"
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_parsed_swaps_job
         ON parsed_swaps(ingestion_job_id)"
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_parsed_swaps_wallet_time
         ON parsed_swaps(wallet_address, block_time)"
    )
    .execute(pool)
    .await?;

    info!("Database migrations completed successfully");
    Ok(())
}
