use crate::config::ExtractionMode;
use crate::models::{CanonicalSwap, NativeAmount, NativeTransfer, SwapEvent, TokenTransfer};
use crate::parser::detector::DetectedSwapInstruction;
use crate::parser::{short, Skip, SkipReason, StageResult, USDC_MINT, WSOL_MINT};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Identity of the transaction a swap is extracted from.
#[derive(Debug, Clone, Copy)]
pub struct SwapContext<'a> {
    pub signature: &'a str,
    pub block_time: i64,
    pub wallet_address: &'a str,
    pub ingestion_job_id: &'a str,
    pub raw_transaction_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct SwapLegs {
    from_mint: String,
    amount_in: u64,
    to_mint: String,
    amount_out: u64,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SwapExtractor {
    mode: ExtractionMode,
}

impl SwapExtractor {
    pub fn new(mode: ExtractionMode) -> Self {
        Self { mode }
    }

    /// Turn a detected swap instruction into a canonical swap record.
    pub fn extract(
        &self,
        detected: &DetectedSwapInstruction,
        tx: &Value,
        ctx: &SwapContext<'_>,
    ) -> StageResult<CanonicalSwap> {
        let legs = match self.mode {
            ExtractionMode::Transfers => wallet_legs(tx, ctx.wallet_address),
            ExtractionMode::Placeholder => placeholder_legs(detected),
        }
        .map_err(|reason| {
            warn!("Failed to extract swap legs from {}: {}", short(ctx.signature), reason);
            Skip::new(ctx.signature, reason)
        })?;

        let block_time = DateTime::<Utc>::from_timestamp(ctx.block_time, 0)
            .ok_or_else(|| Skip::new(ctx.signature, SkipReason::InvalidBlockTime(ctx.block_time)))?;

        info!(
            "Swap data extracted from {}: {} {} -> {} {}",
            short(ctx.signature),
            legs.amount_in,
            short(&legs.from_mint),
            legs.amount_out,
            short(&legs.to_mint)
        );

        Ok(CanonicalSwap {
            ingestion_job_id: ctx.ingestion_job_id.to_string(),
            raw_transaction_id: ctx.raw_transaction_id,
            wallet_address: ctx.wallet_address.to_string(),
            signature: ctx.signature.to_string(),
            block_time,
            from_token_mint: legs.from_mint,
            to_token_mint: legs.to_mint,
            amount_in: legs.amount_in,
            amount_out: legs.amount_out,
            created_at: Utc::now(),
        })
    }
}

fn placeholder_legs(detected: &DetectedSwapInstruction) -> Result<SwapLegs, SkipReason> {
    if detected.accounts.len() < 3 {
        return Err(SkipReason::InsufficientAccounts(detected.accounts.len()));
    }

    debug!("Placeholder legs used for instruction {}", detected.instruction_index);
    Ok(SwapLegs {
        from_mint: WSOL_MINT.to_string(),
        amount_in: 1_000_000_000,
        to_mint: USDC_MINT.to_string(),
        amount_out: 1_000_000,
    })
}

/// Legs from the wallet's net balance changes, falling back to the indexer's
/// swap event when transfers alone don't show both sides.
fn wallet_legs(tx: &Value, wallet: &str) -> Result<SwapLegs, SkipReason> {
    let mut deltas = token_deltas(tx, wallet)?;

    let has_outgoing = deltas.values().any(|d| *d < 0);
    let has_incoming = deltas.values().any(|d| *d > 0);
    if !(has_outgoing && has_incoming) && !deltas.contains_key(WSOL_MINT) {
        let native = native_delta(tx, wallet)?;
        if (native < 0 && !has_outgoing) || (native > 0 && !has_incoming) {
            deltas.insert(WSOL_MINT.to_string(), native);
        }
    }

    match legs_from_deltas(&deltas) {
        Ok(legs) => Ok(legs),
        Err(reason) => match swap_event_legs(tx, wallet)? {
            Some(legs) => {
                debug!("Swap legs taken from swap event");
                Ok(legs)
            }
            None => Err(reason),
        },
    }
}

fn field<T: DeserializeOwned + Default>(tx: &Value, pointer: &str) -> Result<T, SkipReason> {
    match tx.pointer(pointer) {
        None | Some(Value::Null) => Ok(T::default()),
        Some(value) => T::deserialize(value)
            .map_err(|e| SkipReason::MalformedPayload(format!("{}: {}", pointer, e))),
    }
}

/// Net base-unit change per mint for the wallet, from `tokenTransfers`.
fn token_deltas(tx: &Value, wallet: &str) -> Result<BTreeMap<String, i128>, SkipReason> {
    let transfers: Vec<TokenTransfer> = field(tx, "/tokenTransfers")?;
    let mut deltas = BTreeMap::new();

    for transfer in &transfers {
        let sent = transfer.from_user_account.as_deref() == Some(wallet);
        let received = transfer.to_user_account.as_deref() == Some(wallet);
        if sent == received {
            continue;
        }

        let amount = i128::try_from(token_base_units(transfer)?)
            .map_err(|_| SkipReason::InvalidAmount(transfer.mint.clone()))?;
        let delta = deltas.entry(transfer.mint.clone()).or_insert(0i128);
        let net = if sent {
            delta.checked_sub(amount)
        } else {
            delta.checked_add(amount)
        };
        *delta = net.ok_or_else(|| SkipReason::InvalidAmount(format!("net amount of {}", transfer.mint)))?;
    }

    deltas.retain(|_, delta| *delta != 0);
    Ok(deltas)
}

/// Raw amount when the indexer provides it, otherwise `tokenAmount × 10^decimals`.
fn token_base_units(transfer: &TokenTransfer) -> Result<u128, SkipReason> {
    if let Some(raw) = &transfer.raw_token_amount {
        return raw
            .token_amount
            .trim()
            .parse::<u128>()
            .map_err(|_| SkipReason::InvalidAmount(raw.token_amount.clone()));
    }

    let ui_amount = transfer.token_amount.unwrap_or(0.0);
    let decimals = i32::try_from(transfer.decimals.unwrap_or(0))
        .map_err(|_| SkipReason::InvalidAmount(format!("decimals for {}", transfer.mint)))?;
    let scaled = (ui_amount * 10f64.powi(decimals)).round();

    if !scaled.is_finite() || scaled < 0.0 || scaled >= u64::MAX as f64 {
        return Err(SkipReason::InvalidAmount(ui_amount.to_string()));
    }
    Ok(scaled as u128)
}

/// Net lamports moved in or out of the wallet by `nativeTransfers`.
fn native_delta(tx: &Value, wallet: &str) -> Result<i128, SkipReason> {
    let transfers: Vec<NativeTransfer> = field(tx, "/nativeTransfers")?;

    Ok(transfers.iter().fold(0i128, |acc, transfer| {
        let sent = transfer.from_user_account.as_deref() == Some(wallet);
        let received = transfer.to_user_account.as_deref() == Some(wallet);
        match (sent, received) {
            (true, false) => acc - i128::from(transfer.amount),
            (false, true) => acc + i128::from(transfer.amount),
            _ => acc,
        }
    }))
}

/// The biggest outflow is the from-leg and the biggest inflow the to-leg.
fn legs_from_deltas(deltas: &BTreeMap<String, i128>) -> Result<SwapLegs, SkipReason> {
    let (from_mint, outflow) = deltas
        .iter()
        .filter(|(_, d)| **d < 0)
        .min_by_key(|(_, d)| **d)
        .ok_or(SkipReason::MissingOutgoingLeg)?;
    let (to_mint, inflow) = deltas
        .iter()
        .filter(|(_, d)| **d > 0)
        .max_by_key(|(_, d)| **d)
        .ok_or(SkipReason::MissingIncomingLeg)?;

    Ok(SwapLegs {
        from_mint: from_mint.clone(),
        amount_in: checked_amount(outflow.unsigned_abs())?,
        to_mint: to_mint.clone(),
        amount_out: checked_amount(inflow.unsigned_abs())?,
    })
}

/// Legs from `events.swap`: token -> native, native -> token or token -> token.
/// Native legs credited to or debited from another account are ignored.
fn swap_event_legs(tx: &Value, wallet: &str) -> Result<Option<SwapLegs>, SkipReason> {
    let Some(event) = field::<Option<SwapEvent>>(tx, "/events/swap")? else {
        return Ok(None);
    };

    let token_in = event.token_inputs.first();
    let token_out = event.token_outputs.first();
    let native_in = event.native_input.as_ref().filter(|native| owned_by(native, wallet));
    let native_out = event.native_output.as_ref().filter(|native| owned_by(native, wallet));

    let (from_mint, raw_in, to_mint, raw_out) = match (token_in, native_in, token_out, native_out) {
        (Some(input), _, _, Some(native)) => (
            input.mint.clone(),
            parse_raw(&input.raw_token_amount.token_amount)?,
            WSOL_MINT.to_string(),
            native.amount.as_u128(),
        ),
        (_, Some(native), Some(output), _) => (
            WSOL_MINT.to_string(),
            native.amount.as_u128(),
            output.mint.clone(),
            parse_raw(&output.raw_token_amount.token_amount)?,
        ),
        (Some(input), _, Some(output), _) => (
            input.mint.clone(),
            parse_raw(&input.raw_token_amount.token_amount)?,
            output.mint.clone(),
            parse_raw(&output.raw_token_amount.token_amount)?,
        ),
        _ => return Ok(None),
    };

    let raw_in = raw_in.ok_or_else(|| SkipReason::InvalidAmount("native input".to_string()))?;
    let raw_out = raw_out.ok_or_else(|| SkipReason::InvalidAmount("native output".to_string()))?;

    Ok(Some(SwapLegs {
        from_mint,
        amount_in: checked_amount(raw_in)?,
        to_mint,
        amount_out: checked_amount(raw_out)?,
    }))
}

fn owned_by(native: &NativeAmount, wallet: &str) -> bool {
    match native.account.as_deref() {
        Some(account) => account == wallet,
        None => true,
    }
}

fn parse_raw(amount: &str) -> Result<Option<u128>, SkipReason> {
    amount
        .trim()
        .parse::<u128>()
        .map(Some)
        .map_err(|_| SkipReason::InvalidAmount(amount.to_string()))
}

/// Amounts are stored as signed 64-bit integers and must be positive.
fn checked_amount(amount: u128) -> Result<u64, SkipReason> {
    match u64::try_from(amount) {
        Ok(value) if value > 0 && value <= i64::MAX as u64 => Ok(value),
        _ => Err(SkipReason::InvalidAmount(amount.to_string())),
    }
}
