//! tests/extractor_tests.rs - Swap leg extraction from transfer records

#[cfg(test)]
mod tests {
    use crate::config::ExtractionMode;
    use crate::models::CanonicalSwap;
    use crate::parser::detector::detect_swaps;
    use crate::parser::extractor::{SwapContext, SwapExtractor};
    use crate::parser::{SkipReason, StageResult, USDC_MINT, WSOL_MINT};
    use crate::tests::fixtures::*;
    use serde_json::{json, Value};

    fn context(signature: &str) -> SwapContext<'_> {
        SwapContext {
            signature,
            block_time: BLOCK_TIME,
            wallet_address: WALLET,
            ingestion_job_id: "job-extract",
            raw_transaction_id: 7,
        }
    }

    fn extract_with(mode: ExtractionMode, tx: &Value, ctx: &SwapContext<'_>) -> StageResult<CanonicalSwap> {
        let detected = detect_swaps(tx);
        assert_eq!(detected.len(), 1, "fixture must carry one swap instruction");
        SwapExtractor::new(mode).extract(&detected[0], tx, ctx)
    }

    fn extract(tx: &Value) -> StageResult<CanonicalSwap> {
        let signature = tx["signature"].as_str().unwrap();
        extract_with(ExtractionMode::Transfers, tx, &context(signature))
    }

    fn swap_tx(signature: &str) -> Value {
        transaction(signature, vec![instruction(2, &instruction_data(9, 1))], vec![])
    }

    #[test]
    fn test_token_to_token_swap() {
        let swap = extract(&raydium_swap_tx("sig-t2t")).unwrap();

        assert_eq!(swap.from_token_mint, USDC_MINT);
        assert_eq!(swap.amount_in, 25_500_000);
        assert_eq!(swap.to_token_mint, UNLISTED_MINT);
        assert_eq!(swap.amount_out, 1_250_000_000);
        assert_eq!(swap.signature, "sig-t2t");
        assert_eq!(swap.wallet_address, WALLET);
        assert_eq!(swap.ingestion_job_id, "job-extract");
        assert_eq!(swap.raw_transaction_id, 7);
        assert_eq!(swap.block_time.timestamp(), BLOCK_TIME);
    }

    #[test]
    fn test_raw_token_amount_is_preferred_over_ui_amount() {
        let mut tx = swap_tx("sig-raw");
        tx["tokenTransfers"] = json!([
            token_transfer(WALLET, POOL, USDC_MINT, 0.1, 6),
            {
                "fromUserAccount": POOL,
                "toUserAccount": WALLET,
                "mint": UNLISTED_MINT,
                "tokenAmount": 1234.56789,
                "rawTokenAmount": { "tokenAmount": "123456789", "decimals": 5 }
            }
        ]);

        let swap = extract(&tx).unwrap();

        assert_eq!(swap.amount_in, 100_000);
        assert_eq!(swap.amount_out, 123_456_789);
    }

    #[test]
    fn test_token_to_native_swap_uses_native_transfers() {
        let mut tx = swap_tx("sig-t2n");
        tx["tokenTransfers"] = json!([token_transfer(WALLET, POOL, USDC_MINT, 300.0, 6)]);
        tx["nativeTransfers"] = json!([
            { "fromUserAccount": POOL, "toUserAccount": WALLET, "amount": 2_000_000_000u64 }
        ]);

        let swap = extract(&tx).unwrap();

        assert_eq!(swap.from_token_mint, USDC_MINT);
        assert_eq!(swap.amount_in, 300_000_000);
        assert_eq!(swap.to_token_mint, WSOL_MINT);
        assert_eq!(swap.amount_out, 2_000_000_000);
    }

    #[test]
    fn test_native_to_token_swap_falls_back_to_swap_event() {
        let mut tx = swap_tx("sig-n2t");
        tx["events"] = json!({
            "swap": {
                "nativeInput": { "account": WALLET, "amount": "1500000000" },
                "tokenOutputs": [
                    { "mint": UNLISTED_MINT, "rawTokenAmount": { "tokenAmount": "42000", "decimals": 6 } }
                ]
            }
        });

        let swap = extract(&tx).unwrap();

        assert_eq!(swap.from_token_mint, WSOL_MINT);
        assert_eq!(swap.amount_in, 1_500_000_000);
        assert_eq!(swap.to_token_mint, UNLISTED_MINT);
        assert_eq!(swap.amount_out, 42_000);
    }

    #[test]
    fn test_native_leg_of_another_account_is_ignored() {
        let mut tx = swap_tx("sig-foreign-native");
        tx["events"] = json!({
            "swap": {
                "nativeInput": { "account": POOL, "amount": 1_500_000_000u64 },
                "tokenOutputs": [
                    { "mint": UNLISTED_MINT, "rawTokenAmount": { "tokenAmount": "42000", "decimals": 6 } }
                ]
            }
        });

        let skip = extract(&tx).unwrap_err();
        assert_eq!(skip.reason, SkipReason::MissingOutgoingLeg);
    }

    #[test]
    fn test_overflowing_net_amount_is_skipped() {
        let huge = i128::MAX.to_string();
        let mut tx = swap_tx("sig-overflow");
        tx["tokenTransfers"] = json!([
            token_transfer(WALLET, POOL, USDC_MINT, 1.0, 6),
            {
                "fromUserAccount": POOL,
                "toUserAccount": WALLET,
                "mint": UNLISTED_MINT,
                "rawTokenAmount": { "tokenAmount": huge, "decimals": 0 }
            },
            {
                "fromUserAccount": POOL,
                "toUserAccount": WALLET,
                "mint": UNLISTED_MINT,
                "rawTokenAmount": { "tokenAmount": huge, "decimals": 0 }
            }
        ]);

        let skip = extract(&tx).unwrap_err();

        assert_eq!(skip.signature, "sig-overflow");
        assert!(matches!(skip.reason, SkipReason::InvalidAmount(_)));
    }

    #[test]
    fn test_only_outgoing_leg_is_skipped() {
        let mut tx = swap_tx("sig-out-only");
        tx["tokenTransfers"] = json!([token_transfer(WALLET, POOL, USDC_MINT, 10.0, 6)]);

        let skip = extract(&tx).unwrap_err();

        assert_eq!(skip.signature, "sig-out-only");
        assert_eq!(skip.reason, SkipReason::MissingIncomingLeg);
    }

    #[test]
    fn test_no_transfers_is_skipped() {
        let skip = extract(&swap_tx("sig-empty")).unwrap_err();
        assert_eq!(skip.reason, SkipReason::MissingOutgoingLeg);
    }

    #[test]
    fn test_transfers_of_other_accounts_are_ignored() {
        let mut tx = raydium_swap_tx("sig-noise");
        tx["tokenTransfers"]
            .as_array_mut()
            .unwrap()
            .push(token_transfer(POOL, UNLISTED_MINT_2, USDC_MINT, 999.0, 6));

        let swap = extract(&tx).unwrap();

        assert_eq!(swap.amount_in, 25_500_000);
        assert_eq!(swap.to_token_mint, UNLISTED_MINT);
    }

    #[test]
    fn test_malformed_transfer_list_is_skipped() {
        let mut tx = swap_tx("sig-malformed");
        tx["tokenTransfers"] = json!("not a list");

        let skip = extract(&tx).unwrap_err();
        assert!(matches!(skip.reason, SkipReason::MalformedPayload(_)));
    }

    #[test]
    fn test_out_of_range_block_time_is_skipped() {
        let tx = raydium_swap_tx("sig-time");
        let ctx = SwapContext {
            block_time: i64::MAX,
            ..context("sig-time")
        };

        let skip = extract_with(ExtractionMode::Transfers, &tx, &ctx).unwrap_err();
        assert_eq!(skip.reason, SkipReason::InvalidBlockTime(i64::MAX));
    }

    #[test]
    fn test_placeholder_mode_emits_fixed_legs() {
        let tx = swap_tx("sig-placeholder");

        let swap = extract_with(ExtractionMode::Placeholder, &tx, &context("sig-placeholder")).unwrap();

        assert_eq!(swap.from_token_mint, WSOL_MINT);
        assert_eq!(swap.amount_in, 1_000_000_000);
        assert_eq!(swap.to_token_mint, USDC_MINT);
        assert_eq!(swap.amount_out, 1_000_000);
    }

    #[test]
    fn test_placeholder_mode_requires_three_accounts() {
        let mut tx = swap_tx("sig-few-accounts");
        // Program must stay resolvable at index 1
        tx["accountKeys"] = json!([WALLET, crate::parser::RAYDIUM_AMM_V4_PROGRAM_ID]);
        tx["instructions"] = json!([instruction(1, &instruction_data(9, 1))]);

        let skip = extract_with(ExtractionMode::Placeholder, &tx, &context("sig-few-accounts")).unwrap_err();
        assert_eq!(skip.reason, SkipReason::InsufficientAccounts(2));
    }
}
