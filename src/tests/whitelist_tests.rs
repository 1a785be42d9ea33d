//! tests/whitelist_tests.rs - Token whitelist filter

#[cfg(test)]
mod tests {
    use crate::parser::whitelist::{TokenWhitelist, DEFAULT_WHITELIST};
    use crate::parser::{BONK_MINT, USDC_MINT, WSOL_MINT};
    use crate::tests::fixtures::{UNLISTED_MINT, UNLISTED_MINT_2};
    use std::sync::Arc;

    #[test]
    fn test_default_whitelist() {
        let whitelist = TokenWhitelist::default();

        assert_eq!(whitelist.len(), DEFAULT_WHITELIST.len());
        assert!(whitelist.contains(WSOL_MINT));
        assert!(whitelist.contains(BONK_MINT));
        assert!(!whitelist.contains(UNLISTED_MINT));
    }

    #[test]
    fn test_either_leg_whitelisted_passes() {
        let whitelist = TokenWhitelist::default();

        assert!(whitelist.is_whitelisted(WSOL_MINT, UNLISTED_MINT));
        assert!(whitelist.is_whitelisted(UNLISTED_MINT, USDC_MINT));
        assert!(whitelist.is_whitelisted(WSOL_MINT, USDC_MINT));
    }

    #[test]
    fn test_neither_leg_whitelisted_fails() {
        let whitelist = TokenWhitelist::default();
        assert!(!whitelist.is_whitelisted(UNLISTED_MINT, UNLISTED_MINT_2));
    }

    #[test]
    fn test_add_and_remove() {
        let whitelist = TokenWhitelist::default();

        assert!(whitelist.add(UNLISTED_MINT));
        assert!(!whitelist.add(UNLISTED_MINT), "duplicate add reports false");
        assert_eq!(whitelist.len(), DEFAULT_WHITELIST.len() + 1);
        assert!(whitelist.is_whitelisted(UNLISTED_MINT, UNLISTED_MINT_2));

        assert!(whitelist.remove(UNLISTED_MINT));
        assert!(!whitelist.remove(UNLISTED_MINT));
        assert!(!whitelist.is_whitelisted(UNLISTED_MINT, UNLISTED_MINT_2));
    }

    #[test]
    fn test_custom_list_replaces_defaults() {
        let whitelist = TokenWhitelist::new([UNLISTED_MINT, UNLISTED_MINT]);

        assert_eq!(whitelist.len(), 1);
        assert_eq!(whitelist.tokens(), vec![UNLISTED_MINT.to_string()]);
        assert!(!whitelist.is_whitelisted(WSOL_MINT, USDC_MINT));

        let empty = TokenWhitelist::new(Vec::<String>::new());
        assert!(empty.is_empty());
        assert!(!empty.is_whitelisted(WSOL_MINT, USDC_MINT));
    }

    #[test]
    fn test_concurrent_updates() {
        let whitelist = Arc::new(TokenWhitelist::new(Vec::<String>::new()));

        let handles: Vec<_> = (0..8)
            .map(|n| {
                let whitelist = Arc::clone(&whitelist);
                std::thread::spawn(move || {
                    whitelist.add(format!("mint-{}", n % 4));
                    whitelist.is_whitelisted("mint-0", "other")
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(whitelist.len(), 4);
    }
}
