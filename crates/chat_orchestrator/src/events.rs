//! UI-facing chat events.
//!
//! A `Submitted` event marks the start of the "thinking" affordance; the
//! first `Token` replaces it with the in-progress streaming indicator.

use serde::{Deserialize, Serialize};

use chat_core::{AgentId, TurnUsage};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatEvent {
    /// A submission passed the guard; a turn is now in flight.
    Submitted { agent: AgentId },

    /// One streamed chunk was applied to the transcript.
    Token { content: String },

    /// The turn completed; usage covers both token counts.
    Complete { usage: TurnUsage },

    /// The turn aborted. The transcript already holds the fallback reply or
    /// the partial content.
    Error { message: String },
}
