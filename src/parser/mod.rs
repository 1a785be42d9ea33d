pub mod detector;
pub mod extractor;
pub mod processor;
pub mod whitelist;

use thiserror::Error;

/// Raydium AMM v4 program.
pub const RAYDIUM_AMM_V4_PROGRAM_ID: &str = "675kPX9MHTjS2zt1qfr1NYHuzeLXfQM9H24wFSUt1Mp8";

/// Wrapped SOL; native legs of a swap are recorded under this mint.
pub const WSOL_MINT: &str = "So11111111111111111111111111111111111111112";
pub const USDC_MINT: &str = "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v";
pub const USDT_MINT: &str = "Es9vMFrzaCERmJfrF4H2FYD4KCoNkY11McCe8BenwNYB";
pub const RAY_MINT: &str = "4k3Dyjzvzp8eMZWUXbBCjEvwSkkk59S5iCNLY3QrkX6R";
pub const MSOL_MINT: &str = "mSoLzYCxHdYgdzU16g5QSh3i5K3z3KZK7ytfqcJm7So";
pub const BONK_MINT: &str = "DezXAZ8z7PnrnRJjz3wXBoRgixCa6xjnB7YaB1pPB263";
pub const JITOSOL_MINT: &str = "J1toso1uCk3RLmjorhTtrVwY9HJ7X8V9yYac6Y7kGCPn";

/// Why an item did not qualify as a swap. These never abort a batch.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    #[error("transaction has no instruction list")]
    MissingInstructions,

    #[error("transaction has no account key list")]
    MissingAccountKeys,

    #[error("malformed transaction payload: {0}")]
    MalformedPayload(String),

    #[error("instruction references only {0} accounts")]
    InsufficientAccounts(usize),

    #[error("wallet has no outgoing leg")]
    MissingOutgoingLeg,

    #[error("wallet has no incoming leg")]
    MissingIncomingLeg,

    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("block time {0} is out of range")]
    InvalidBlockTime(i64),

    #[error("neither {from} nor {to} is whitelisted")]
    NotWhitelisted { from: String, to: String },
}

/// A skipped item, tagged with its signature when known.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("skipped {signature}: {reason}")]
pub struct Skip {
    pub signature: String,
    pub reason: SkipReason,
}

impl Skip {
    pub fn new(signature: impl Into<String>, reason: SkipReason) -> Self {
        Self {
            signature: signature.into(),
            reason,
        }
    }
}

/// Outcome of one pipeline stage for one item.
pub type StageResult<T> = Result<T, Skip>;

/// First characters of a signature or mint for log lines.
pub(crate) fn short(value: &str) -> &str {
    value.get(..10).unwrap_or(value)
}
