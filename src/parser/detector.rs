use crate::parser::{short, Skip, SkipReason, StageResult, RAYDIUM_AMM_V4_PROGRAM_ID};
use serde_json::Value;
use tracing::{debug, info};

/// `swapBaseIn` discriminator.
pub const SWAP_BASE_IN_DISCRIMINATOR: u64 = 9;
/// `swapBaseOut` discriminator.
pub const SWAP_BASE_OUT_DISCRIMINATOR: u64 = 11;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapKind {
    SwapBaseIn,
    SwapBaseOut,
}

impl SwapKind {
    pub fn from_discriminator(discriminator: u64) -> Option<Self> {
        match discriminator {
            SWAP_BASE_IN_DISCRIMINATOR => Some(Self::SwapBaseIn),
            SWAP_BASE_OUT_DISCRIMINATOR => Some(Self::SwapBaseOut),
            _ => None,
        }
    }
}

/// A swap instruction found in a transaction. Only lives for the duration of parsing.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectedSwapInstruction {
    pub instruction_index: usize,
    pub instruction: Value,
    pub accounts: Vec<String>,
    pub kind: SwapKind,
}

/// Find Raydium AMM v4 swap instructions in a transaction.
///
/// Never fails: a transaction that cannot be inspected simply has no swaps.
pub fn detect_swaps(tx: &Value) -> Vec<DetectedSwapInstruction> {
    match try_detect_swaps(tx) {
        Ok(detected) => {
            if !detected.is_empty() {
                info!(
                    "Raydium swaps detected in {}: {}",
                    short(signature_of(tx)),
                    detected.len()
                );
            }
            detected
        }
        Err(skip) => {
            debug!("{}", skip);
            Vec::new()
        }
    }
}

/// Same as [`detect_swaps`] but reports why a transaction could not be inspected.
pub fn try_detect_swaps(tx: &Value) -> StageResult<Vec<DetectedSwapInstruction>> {
    let (instructions, account_keys) = message_parts(tx)?;

    let accounts: Vec<String> = account_keys
        .iter()
        .filter_map(account_key)
        .map(str::to_string)
        .collect();

    let detected = instructions
        .iter()
        .enumerate()
        .filter_map(|(idx, instruction)| {
            let kind = swap_kind(instruction, account_keys)?;
            debug!("Raydium swap instruction detected at index {} ({:?})", idx, kind);
            Some(DetectedSwapInstruction {
                instruction_index: idx,
                instruction: instruction.clone(),
                accounts: accounts.clone(),
                kind,
            })
        })
        .collect();

    Ok(detected)
}

/// Instructions and account keys, from `transaction.message` (RPC layout) or
/// the top level (enhanced layout).
fn message_parts(tx: &Value) -> StageResult<(&Vec<Value>, &Vec<Value>)> {
    let signature = signature_of(tx);
    let message = tx
        .pointer("/transaction/message")
        .filter(|m| m.is_object())
        .unwrap_or(tx);

    let instructions = message
        .get("instructions")
        .and_then(Value::as_array)
        .ok_or_else(|| Skip::new(signature, SkipReason::MissingInstructions))?;
    let account_keys = message
        .get("accountKeys")
        .and_then(Value::as_array)
        .ok_or_else(|| Skip::new(signature, SkipReason::MissingAccountKeys))?;

    Ok((instructions, account_keys))
}

fn swap_kind(instruction: &Value, account_keys: &[Value]) -> Option<SwapKind> {
    let program_id = program_id(instruction, account_keys)?;
    if program_id != RAYDIUM_AMM_V4_PROGRAM_ID {
        return None;
    }

    let data = instruction.get("data").and_then(Value::as_str)?;
    let discriminator = decode_discriminator(data)?;
    SwapKind::from_discriminator(discriminator)
}

/// Resolve the invoked program through `programIdIndex`; fall back to an inline
/// `programId` when the index is absent.
fn program_id<'a>(instruction: &'a Value, account_keys: &'a [Value]) -> Option<&'a str> {
    match instruction.get("programIdIndex").and_then(Value::as_u64) {
        Some(index) => account_keys.get(usize::try_from(index).ok()?).and_then(account_key),
        None => instruction.get("programId").and_then(Value::as_str),
    }
}

/// Account keys are plain strings or `{ "pubkey": ... }` objects in jsonParsed output.
fn account_key(key: &Value) -> Option<&str> {
    key.as_str()
        .or_else(|| key.get("pubkey").and_then(Value::as_str))
}

/// First 8 bytes of the base58 payload as a little-endian integer.
pub fn decode_discriminator(data: &str) -> Option<u64> {
    let decoded = match bs58::decode(data).into_vec() {
        Ok(bytes) => bytes,
        Err(e) => {
            debug!("Failed to decode instruction data: {}", e);
            return None;
        }
    };

    let prefix: [u8; 8] = decoded.get(..8)?.try_into().ok()?;
    Some(u64::from_le_bytes(prefix))
}

fn signature_of(tx: &Value) -> &str {
    tx.get("signature")
        .and_then(Value::as_str)
        .or_else(|| tx.pointer("/transaction/signatures/0").and_then(Value::as_str))
        .unwrap_or("unknown")
}
