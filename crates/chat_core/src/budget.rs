//! Token accounting for the session.
//!
//! The ledger is strictly additive and lives for the session only. The
//! ceiling is informational: the UI surfaces it, but nothing here blocks a
//! submission that would exceed it.

use serde::{Deserialize, Serialize};

use crate::config::TOTAL_TOKEN_LIMIT;

/// Tokens consumed by a single completed turn.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TurnUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl TurnUsage {
    pub fn total(&self) -> u32 {
        self.input_tokens.saturating_add(self.output_tokens)
    }
}

/// Running counter of consumed conversation tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenLedger {
    used: u64,
    limit: u64,
}

impl Default for TokenLedger {
    fn default() -> Self {
        Self::new(TOTAL_TOKEN_LIMIT)
    }
}

impl TokenLedger {
    pub fn new(limit: u64) -> Self {
        Self { used: 0, limit }
    }

    /// Add consumed tokens. The counter never decreases.
    pub fn add(&mut self, tokens: u32) {
        self.used = self.used.saturating_add(u64::from(tokens));
    }

    pub fn used(&self) -> u64 {
        self.used
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    /// Percentage of the display ceiling consumed, saturating at 100.
    pub fn percent_used(&self) -> u8 {
        if self.limit == 0 {
            return 100;
        }
        ((self.used.saturating_mul(100)) / self.limit).min(100) as u8
    }

    pub fn over_limit(&self) -> bool {
        self.used > self.limit
    }
}
