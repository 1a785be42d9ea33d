pub mod blockchain;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod parser;
pub mod state;
pub mod validation;

#[cfg(test)]
pub mod tests;

// Re-export specific items for convenience
pub use db::connection;
pub use db::swap::{get_job_statistics, insert_swaps};
pub use error::PipelineError;
pub use models::{CanonicalSwap, JobReport, JobStatistics, RawTransaction};
pub use parser::detector::detect_swaps;
pub use parser::processor::process_job;
pub use state::AppState;
pub use validation::{validate_job_id, validate_solana_address};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Logging for the binaries. Goes to stderr; stdout is kept for the run summary.
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
