//! Shared limits and defaults.

use serde::{Deserialize, Serialize};

/// Maximum number of attached files per session.
pub const MAX_FILES: usize = 5;

/// Maximum size of a single attached file, in MiB.
pub const MAX_FILE_SIZE_MB: u64 = 10;

/// Maximum size of a single attached file, in bytes.
pub const MAX_FILE_SIZE_BYTES: u64 = MAX_FILE_SIZE_MB * 1024 * 1024;

/// Display-only token ceiling for a session. Not enforced as a hard stop.
pub const TOTAL_TOKEN_LIMIT: u64 = 10_000;

/// Default generation model.
pub const DEFAULT_MODEL: &str = "gemini-1.5-pro";

/// Tunable configuration for a chat session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    pub model: String,
    pub max_files: usize,
    pub max_file_size_bytes: u64,
    pub total_token_limit: u64,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            max_files: MAX_FILES,
            max_file_size_bytes: MAX_FILE_SIZE_BYTES,
            total_token_limit: TOTAL_TOKEN_LIMIT,
        }
    }
}
