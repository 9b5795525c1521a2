//! chat_core - Core domain types for the AgenticOne chat engine
//!
//! This crate provides the foundational types used across all chat-related crates:
//! - `agent` - the closed set of four agent personas
//! - `message` - transcript message types
//! - `conversation` - per-agent ordered transcripts
//! - `rag` - knowledge-source toggles and the request preamble
//! - `budget` - session token accounting
//! - `history` - bounded query history log
//! - `config` - shared limits and defaults

pub mod agent;
pub mod budget;
pub mod config;
pub mod conversation;
pub mod history;
pub mod message;
pub mod rag;

// Re-export commonly used types
pub use agent::{AgentId, AgentProfile};
pub use budget::{TokenLedger, TurnUsage};
pub use config::{ChatConfig, MAX_FILES, MAX_FILE_SIZE_BYTES, MAX_FILE_SIZE_MB, TOTAL_TOKEN_LIMIT};
pub use conversation::ConversationStore;
pub use history::{QueryHistory, QueryHistoryEntry, QUERY_HISTORY_CAPACITY};
pub use message::{Citation, Message, Role};
pub use rag::RagSources;
