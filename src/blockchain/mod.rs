pub mod client;
pub mod ingest;
pub mod pagination;
pub mod retry;

// Re-exports for convenience
pub use client::{BatchFetcher, ClientError, HeliusClient};
pub use pagination::{fetch_transaction_history, transaction_pages, FetchOptions};
pub use retry::{retry_batch, RetryPolicy};
