//! Session data structures and the storage key scheme.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use chat_core::{AgentId, RagSources};

/// A signed-in user as supplied by the identity provider (or the guest
/// fallback).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthUser {
    pub id: String,
    pub email: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
    pub access_token: String,
}

/// Summary of an attached file, persisted in session metadata. The payload
/// itself is never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UploadSummary {
    pub name: String,
    pub mime_type: String,
    pub size_bytes: u64,
}

/// Per-user session metadata: selected agent, RAG toggles, attachment
/// summaries. Last write wins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionMeta {
    pub selected_agent: AgentId,
    pub rag_sources: RagSources,
    pub uploaded_files: Vec<UploadSummary>,
    pub updated_at: DateTime<Utc>,
}

impl Default for SessionMeta {
    fn default() -> Self {
        Self {
            selected_agent: AgentId::DisciplineHead,
            rag_sources: RagSources::default(),
            uploaded_files: Vec::new(),
            updated_at: Utc::now(),
        }
    }
}

/// Key prefix for persisted transcripts.
pub const CONVERSATION_KEY_PREFIX: &str = "agenticone_chat_";

/// Key prefix for persisted session metadata.
pub const USER_KEY_PREFIX: &str = "agenticone_user_";

/// Storage key for one user's transcript with one agent.
pub fn conversation_key(email: &str, agent: AgentId) -> String {
    format!("{CONVERSATION_KEY_PREFIX}{email}_{}", agent.role_key())
}

/// Storage key for one user's session metadata.
pub fn user_key(email: &str) -> String {
    format!("{USER_KEY_PREFIX}{email}")
}
