use crate::db::{raw_transaction, swap};
use crate::error::PipelineError;
use crate::models::{CanonicalSwap, JobReport, RawTransaction};
use crate::parser::detector::try_detect_swaps;
use crate::parser::extractor::SwapContext;
use crate::parser::{short, Skip, SkipReason, StageResult};
use crate::state::AppState;
use crate::validation::validate_job_id;
use serde_json::Value;
use tracing::{debug, info, warn};

/// What became of one raw transaction.
#[derive(Debug)]
enum Parsed {
    NoSwap,
    Swap(CanonicalSwap),
}

/// Parse every raw transaction stored for `job_id` and persist the swaps found.
///
/// Items that don't qualify are counted and skipped. Only database failures abort
/// the job; swaps already committed by an earlier run are left untouched.
pub async fn process_job(state: &AppState, job_id: &str) -> Result<JobReport, PipelineError> {
    validate_job_id(job_id)?;
    info!("Starting transaction parsing job {}", job_id);

    let raw_transactions = raw_transaction::get_raw_transactions_for_job(&state.db_pool, job_id).await?;

    let mut report = JobReport {
        job_id: job_id.to_string(),
        raw_transactions_processed: raw_transactions.len(),
        ..JobReport::default()
    };

    if raw_transactions.is_empty() {
        warn!("No raw transactions found for job {}", job_id);
        return Ok(report);
    }

    let mut swaps = Vec::new();

    for raw in &raw_transactions {
        match parse_transaction(state, raw, &mut report) {
            Ok(Parsed::Swap(swap)) => swaps.push(swap),
            Ok(Parsed::NoSwap) => {}
            Err(skip) => match skip.reason {
                SkipReason::NotWhitelisted { .. } => {
                    report.swaps_filtered_out += 1;
                    debug!("Swap discarded: {}", skip);
                }
                _ => {
                    report.parse_errors += 1;
                    warn!("Failed to process transaction: {}", skip);
                }
            },
        }
    }

    report.swaps_saved = swap::insert_swaps(&state.db_pool, &swaps).await?;
    report.duplicates_skipped = swaps.len() as u64 - report.swaps_saved;

    info!(
        job_id,
        raw_transactions = report.raw_transactions_processed,
        swaps_detected = report.swaps_detected,
        swaps_extracted = report.swaps_extracted,
        swaps_filtered_out = report.swaps_filtered_out,
        swaps_saved = report.swaps_saved,
        duplicates_skipped = report.duplicates_skipped,
        parse_errors = report.parse_errors,
        "Transaction parsing job completed"
    );

    Ok(report)
}

fn parse_transaction(state: &AppState, raw: &RawTransaction, report: &mut JobReport) -> StageResult<Parsed> {
    debug!("Processing transaction {} (block time {})", short(&raw.signature), raw.block_time);

    let payload: Value = serde_json::from_str(&raw.raw_transaction_data)
        .map_err(|e| Skip::new(&raw.signature, SkipReason::MalformedPayload(e.to_string())))?;

    let detected = match try_detect_swaps(&payload) {
        Ok(detected) => detected,
        Err(skip) => {
            // Transactions without an inspectable message are simply not swaps
            debug!("{}", skip);
            return Ok(Parsed::NoSwap);
        }
    };

    // One swap per transaction: the signature is the unique key downstream
    let Some(first) = detected.first() else {
        return Ok(Parsed::NoSwap);
    };
    report.swaps_detected += 1;
    if detected.len() > 1 {
        debug!(
            "{} carries {} swap instructions, keeping the first",
            short(&raw.signature),
            detected.len()
        );
    }

    let ctx = SwapContext {
        signature: &raw.signature,
        block_time: raw.block_time,
        wallet_address: &raw.wallet_address,
        ingestion_job_id: &raw.job_id,
        raw_transaction_id: raw.id,
    };
    let swap = state.extractor.extract(first, &payload, &ctx)?;
    report.swaps_extracted += 1;

    if !state.whitelist.is_whitelisted(&swap.from_token_mint, &swap.to_token_mint) {
        return Err(Skip::new(
            &raw.signature,
            SkipReason::NotWhitelisted {
                from: swap.from_token_mint,
                to: swap.to_token_mint,
            },
        ));
    }

    info!("Valid Raydium swap parsed: {}", short(&raw.signature));
    Ok(Parsed::Swap(swap))
}
