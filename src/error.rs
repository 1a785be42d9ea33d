use crate::blockchain::client::ClientError;
use crate::config::ConfigError;
use crate::validation::ValidationError;
use thiserror::Error;

/// Failures that abort a job. Per-item problems are reported as skips instead.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),

    #[error("Fetch failed: {0}")]
    Fetch(#[from] ClientError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}
