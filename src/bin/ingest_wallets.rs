// Fetch the complete transaction history of one or more wallets from Helius
// and store it as the raw transactions of an ingestion job.

use clap::Parser;
use std::process::ExitCode;
use swap_parsing_service::{
    blockchain::{ingest::ingest_wallets, FetchOptions, HeliusClient},
    config::Config,
    init_tracing, AppState, PipelineError,
};
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(about = "Fetch wallet transaction history into an ingestion job")]
struct Args {
    /// Ingestion job the transactions are stored under
    job_id: String,

    /// Wallet addresses to fetch
    #[arg(required = true)]
    wallets: Vec<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let args = Args::parse();

    match run(&args).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!("Ingestion job {} failed: {}", args.job_id, e);
            println!("ERROR: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Returns whether every wallet was ingested.
async fn run(args: &Args) -> Result<bool, PipelineError> {
    let config = Config::from_env()?;
    let client = HeliusClient::new(&config)?;
    let options = FetchOptions::from_config(&config);
    let state = AppState::initialize(&config).await?;

    info!("Ingesting {} wallets into job {}", args.wallets.len(), args.job_id);

    let results = ingest_wallets(&client, &state.db_pool, &options, &args.job_id, &args.wallets).await;

    let mut all_ok = true;
    for (wallet, result) in args.wallets.iter().zip(results) {
        match result {
            Ok(summary) => println!(
                "SUCCESS: {} fetched {} transactions in {} pages, stored {} new",
                wallet, summary.transactions_fetched, summary.pages_fetched, summary.transactions_stored
            ),
            Err(e) => {
                all_ok = false;
                println!("ERROR: {}: {}", wallet, e);
            }
        }
    }

    Ok(all_ok)
}
