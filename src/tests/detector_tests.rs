//! tests/detector_tests.rs - Raydium swap instruction detection

#[cfg(test)]
mod tests {
    use crate::parser::detector::{decode_discriminator, detect_swaps, try_detect_swaps, SwapKind};
    use crate::parser::{SkipReason, RAYDIUM_AMM_V4_PROGRAM_ID};
    use crate::tests::fixtures::*;
    use serde_json::json;

    #[test]
    fn test_detects_swap_base_in() {
        let tx = raydium_swap_tx("sig-base-in");

        let detected = detect_swaps(&tx);

        assert_eq!(detected.len(), 1);
        assert_eq!(detected[0].instruction_index, 0);
        assert_eq!(detected[0].kind, SwapKind::SwapBaseIn);
        assert_eq!(detected[0].accounts.len(), 4);
        assert_eq!(detected[0].accounts[2], RAYDIUM_AMM_V4_PROGRAM_ID);
    }

    #[test]
    fn test_detects_swap_base_out_among_other_instructions() {
        let tx = transaction(
            "sig-base-out",
            vec![
                instruction(3, &instruction_data(12, 1)),
                instruction(2, &instruction_data(3, 0)),
                instruction(2, &instruction_data(11, 42)),
            ],
            vec![],
        );

        let detected = detect_swaps(&tx);

        assert_eq!(detected.len(), 1);
        assert_eq!(detected[0].instruction_index, 2);
        assert_eq!(detected[0].kind, SwapKind::SwapBaseOut);
    }

    #[test]
    fn test_raydium_instruction_with_other_discriminator_is_not_a_swap() {
        let tx = raydium_non_swap_tx("sig-deposit");
        assert!(detect_swaps(&tx).is_empty());
    }

    #[test]
    fn test_swap_discriminator_on_other_program_is_ignored() {
        let tx = transaction("sig-other", vec![instruction(3, &instruction_data(9, 10))], vec![]);
        assert!(detect_swaps(&tx).is_empty());
    }

    #[test]
    fn test_missing_account_keys_yields_no_swaps() {
        let tx = json!({
            "signature": "sig-no-keys",
            "instructions": [instruction(2, &instruction_data(9, 1))],
        });

        assert!(detect_swaps(&tx).is_empty());
        let skip = try_detect_swaps(&tx).unwrap_err();
        assert_eq!(skip.reason, SkipReason::MissingAccountKeys);
        assert_eq!(skip.signature, "sig-no-keys");
    }

    #[test]
    fn test_missing_instructions_yields_no_swaps() {
        let tx = json!({ "signature": "sig-no-ix", "accountKeys": [WALLET] });

        assert!(detect_swaps(&tx).is_empty());
        assert_eq!(try_detect_swaps(&tx).unwrap_err().reason, SkipReason::MissingInstructions);
    }

    #[test]
    fn test_out_of_range_program_index_is_ignored() {
        let tx = transaction("sig-oob", vec![instruction(42, &instruction_data(9, 1))], vec![]);
        assert!(detect_swaps(&tx).is_empty());
    }

    #[test]
    fn test_short_or_invalid_data_is_ignored() {
        let short_data = bs58::encode([9u8, 0, 0]).into_string();
        let tx = transaction(
            "sig-bad-data",
            vec![
                instruction(2, &short_data),
                instruction(2, "0OIl"),
                instruction(2, ""),
                json!({ "programIdIndex": 2, "accounts": [] }),
            ],
            vec![],
        );

        assert!(detect_swaps(&tx).is_empty());
    }

    #[test]
    fn test_rpc_message_layout_with_parsed_account_keys() {
        let tx = json!({
            "transaction": {
                "signatures": ["sig-rpc"],
                "message": {
                    "accountKeys": [
                        { "pubkey": WALLET, "signer": true, "writable": true },
                        { "pubkey": POOL, "signer": false, "writable": true },
                        { "pubkey": RAYDIUM_AMM_V4_PROGRAM_ID, "signer": false, "writable": false },
                    ],
                    "instructions": [instruction(2, &instruction_data(9, 5))],
                }
            }
        });

        let detected = detect_swaps(&tx);

        assert_eq!(detected.len(), 1);
        assert_eq!(detected[0].accounts, vec![WALLET, POOL, RAYDIUM_AMM_V4_PROGRAM_ID]);
    }

    #[test]
    fn test_inline_program_id_is_used_without_index() {
        let tx = transaction(
            "sig-inline",
            vec![json!({ "programId": RAYDIUM_AMM_V4_PROGRAM_ID, "data": instruction_data(11, 1) })],
            vec![],
        );

        let detected = detect_swaps(&tx);
        assert_eq!(detected.len(), 1);
        assert_eq!(detected[0].kind, SwapKind::SwapBaseOut);
    }

    #[test]
    fn test_decode_discriminator() {
        assert_eq!(decode_discriminator(&instruction_data(9, 123)), Some(9));
        assert_eq!(decode_discriminator(&instruction_data(11, 0)), Some(11));
        assert_eq!(decode_discriminator(&bs58::encode(9u64.to_le_bytes()).into_string()), Some(9));
        assert_eq!(decode_discriminator(""), None);
        assert_eq!(decode_discriminator("not-base58!"), None);
    }
}
