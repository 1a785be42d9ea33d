// Records flowing through the pipeline: raw transactions as stored per job,
// canonical swaps, job statistics and the typed views over the Helius
// transfer records the extractor reads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A transaction as fetched from the indexer and stored for an ingestion job.
#[derive(Debug, Clone)]
pub struct RawTransaction {
    pub id: i64,
    pub job_id: String,
    pub wallet_address: String,
    pub signature: String,
    pub block_time: i64,
    pub raw_transaction_data: String,
}

/// A raw transaction not yet written to the store.
#[derive(Debug, Clone)]
pub struct NewRawTransaction {
    pub signature: String,
    pub block_time: i64,
    pub payload: Value,
}

impl NewRawTransaction {
    /// Build from an indexer payload. Returns `None` when the payload has no signature.
    pub fn from_payload(payload: Value) -> Option<Self> {
        let signature = payload.get("signature")?.as_str()?.to_string();
        let block_time = payload
            .get("timestamp")
            .or_else(|| payload.get("blockTime"))
            .and_then(Value::as_i64)
            .unwrap_or(0);

        Some(Self {
            signature,
            block_time,
            payload,
        })
    }
}

/// Normalized swap record, one per transaction signature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalSwap {
    pub ingestion_job_id: String,
    pub raw_transaction_id: i64,
    pub wallet_address: String,
    pub signature: String,
    pub block_time: DateTime<Utc>,
    pub from_token_mint: String,
    pub to_token_mint: String,
    pub amount_in: u64,
    pub amount_out: u64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct JobStatistics {
    pub raw_transactions: i64,
    pub parsed_swaps: i64,
    pub parsing_rate: f64,
}

impl JobStatistics {
    pub fn new(raw_transactions: i64, parsed_swaps: i64) -> Self {
        let parsing_rate = if raw_transactions > 0 {
            parsed_swaps as f64 / raw_transactions as f64 * 100.0
        } else {
            0.0
        };

        Self {
            raw_transactions,
            parsed_swaps,
            parsing_rate,
        }
    }
}

/// Counters for one `process_job` run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct JobReport {
    pub job_id: String,
    pub raw_transactions_processed: usize,
    pub swaps_detected: usize,
    pub swaps_extracted: usize,
    pub swaps_filtered_out: usize,
    pub swaps_saved: u64,
    pub duplicates_skipped: u64,
    pub parse_errors: usize,
}

impl JobReport {
    /// Swaps that survived extraction and the whitelist, whether new or already stored.
    pub fn swaps_parsed(&self) -> usize {
        self.swaps_extracted.saturating_sub(self.swaps_filtered_out)
    }

    /// One-line run summary for stdout.
    pub fn summary(&self, stats: &JobStatistics) -> String {
        if self.swaps_parsed() == 0 {
            return format!(
                "SUCCESS: no Raydium swaps found in {} raw transactions (parse rate {:.2}%)",
                self.raw_transactions_processed, stats.parsing_rate
            );
        }

        format!(
            "SUCCESS: parsed {} Raydium swaps from {} raw transactions, saved {} ({} already stored); \
             job holds {} swaps from {} raw transactions, parse rate {:.2}%",
            self.swaps_parsed(),
            self.raw_transactions_processed,
            self.swaps_saved,
            self.duplicates_skipped,
            stats.parsed_swaps,
            stats.raw_transactions,
            stats.parsing_rate
        )
    }
}

// Helius enhanced-transaction fragments

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenTransfer {
    #[serde(default)]
    pub from_user_account: Option<String>,
    #[serde(default)]
    pub to_user_account: Option<String>,
    pub mint: String,
    #[serde(default)]
    pub token_amount: Option<f64>,
    #[serde(default)]
    pub decimals: Option<u32>,
    #[serde(default)]
    pub raw_token_amount: Option<RawTokenAmount>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTokenAmount {
    pub token_amount: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NativeTransfer {
    #[serde(default)]
    pub from_user_account: Option<String>,
    #[serde(default)]
    pub to_user_account: Option<String>,
    pub amount: u64,
}

/// `events.swap` as reported by the indexer.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapEvent {
    #[serde(default)]
    pub native_input: Option<NativeAmount>,
    #[serde(default)]
    pub native_output: Option<NativeAmount>,
    #[serde(default)]
    pub token_inputs: Vec<SwapTokenAmount>,
    #[serde(default)]
    pub token_outputs: Vec<SwapTokenAmount>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NativeAmount {
    /// Account the lamports move out of or into.
    #[serde(default)]
    pub account: Option<String>,
    pub amount: AmountValue,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapTokenAmount {
    pub mint: String,
    pub raw_token_amount: RawTokenAmount,
}

/// Indexers send integer amounts either as JSON numbers or strings.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AmountValue {
    Number(u64),
    Text(String),
}

impl AmountValue {
    pub fn as_u128(&self) -> Option<u128> {
        match self {
            AmountValue::Number(n) => Some(u128::from(*n)),
            AmountValue::Text(s) => s.trim().parse().ok(),
        }
    }
}
