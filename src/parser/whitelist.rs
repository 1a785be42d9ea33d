//! Token whitelist for swaps eligible for downstream analysis.

use crate::parser::{
    short, BONK_MINT, JITOSOL_MINT, MSOL_MINT, RAY_MINT, USDC_MINT, USDT_MINT, WSOL_MINT,
};
use std::collections::HashSet;
use std::sync::RwLock;
use tracing::{debug, info, warn};

pub const DEFAULT_WHITELIST: [&str; 7] = [
    WSOL_MINT,
    USDC_MINT,
    USDT_MINT,
    RAY_MINT,
    MSOL_MINT,
    BONK_MINT,
    JITOSOL_MINT,
];

/// Set of whitelisted mints, shareable across jobs and editable at runtime.
#[derive(Debug)]
pub struct TokenWhitelist {
    tokens: RwLock<HashSet<String>>,
}

impl Default for TokenWhitelist {
    fn default() -> Self {
        Self::new(DEFAULT_WHITELIST)
    }
}

impl TokenWhitelist {
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tokens: HashSet<String> = tokens.into_iter().map(Into::into).collect();
        info!("Token filter initialized with {} whitelisted tokens", tokens.len());

        Self {
            tokens: RwLock::new(tokens),
        }
    }

    /// True when either leg's mint is whitelisted. Fails closed if the set is unreadable.
    pub fn is_whitelisted(&self, from_mint: &str, to_mint: &str) -> bool {
        let tokens = match self.tokens.read() {
            Ok(tokens) => tokens,
            Err(e) => {
                warn!("Error checking token whitelist: {}", e);
                return false;
            }
        };

        let from_listed = tokens.contains(from_mint);
        let to_listed = tokens.contains(to_mint);
        debug!(
            "Token whitelist check {} ({}) -> {} ({})",
            short(from_mint),
            from_listed,
            short(to_mint),
            to_listed
        );

        from_listed || to_listed
    }

    pub fn contains(&self, mint: &str) -> bool {
        self.tokens
            .read()
            .map(|tokens| tokens.contains(mint))
            .unwrap_or(false)
    }

    /// Add a mint. Returns `false` if it was already listed.
    pub fn add(&self, mint: impl Into<String>) -> bool {
        let mint = mint.into();
        let Ok(mut tokens) = self.tokens.write() else {
            warn!("Token whitelist lock poisoned, cannot add {}", mint);
            return false;
        };

        let added = tokens.insert(mint.clone());
        if added {
            info!("Token added to whitelist: {}", mint);
        }
        added
    }

    /// Remove a mint. Returns `false` if it was not listed.
    pub fn remove(&self, mint: &str) -> bool {
        let Ok(mut tokens) = self.tokens.write() else {
            warn!("Token whitelist lock poisoned, cannot remove {}", mint);
            return false;
        };

        let removed = tokens.remove(mint);
        if removed {
            info!("Token removed from whitelist: {}", mint);
        }
        removed
    }

    pub fn tokens(&self) -> Vec<String> {
        self.tokens
            .read()
            .map(|tokens| tokens.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.tokens.read().map(|tokens| tokens.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
