// Transaction parsing entry point:
// - Load configuration (HELIUS_API_KEY is required)
// - Set up logging
// - Open the database
// - Parse the raw transactions of one ingestion job into swaps
// - Print a one-line summary, exit 1 on failure

use clap::Parser;
use std::process::ExitCode;
use swap_parsing_service::{
    config::Config, get_job_statistics, init_tracing, process_job, AppState, JobReport, JobStatistics,
    PipelineError,
};
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(about = "Parse Raydium swaps from the raw transactions of an ingestion job")]
struct Args {
    /// Ingestion job to process
    job_id: String,
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let args = Args::parse();

    info!("Transaction parsing service starting for job {}", args.job_id);

    match run(&args.job_id).await {
        Ok((report, stats)) => {
            println!("{}", report.summary(&stats));
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Transaction parsing failed for job {}: {}", args.job_id, e);
            println!("ERROR: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(job_id: &str) -> Result<(JobReport, JobStatistics), PipelineError> {
    let config = Config::from_env()?;
    let state = AppState::initialize(&config).await?;

    let report = process_job(&state, job_id).await?;
    let stats = get_job_statistics(&state.db_pool, job_id).await?;

    Ok((report, stats))
}
