//! Turn states - Defines all possible states of a chat turn
//!
//! One submission moves through these states in order; `Failed` is the
//! per-turn terminal reachable from any in-flight state.

use serde::{Deserialize, Serialize};

/// Defines the possible states of a turn's lifecycle.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TurnState {
    /// No turn in flight, awaiting user input.
    Idle,

    /// A submission was accepted; the outgoing request is being assembled.
    Submitting,

    /// Counting input tokens for the assembled request.
    CountingInputTokens,

    /// Actively receiving streamed response chunks.
    StreamingChunks {
        /// Chunks applied so far this turn.
        chunks_received: usize,
    },

    /// Stream exhausted; counting output tokens for the accumulated reply.
    CountingOutputTokens,

    /// The turn aborted. Terminal per turn; a new submission is accepted
    /// from here.
    Failed {
        error_message: String,
        failed_at: String, // ISO timestamp
    },
}

impl Default for TurnState {
    fn default() -> Self {
        TurnState::Idle
    }
}

impl TurnState {
    /// Check if a turn is currently in flight.
    pub fn is_in_flight(&self) -> bool {
        matches!(
            self,
            Self::Submitting
                | Self::CountingInputTokens
                | Self::StreamingChunks { .. }
                | Self::CountingOutputTokens
        )
    }

    /// Check if a new submission may be accepted from this state.
    pub fn accepts_submission(&self) -> bool {
        matches!(self, Self::Idle | Self::Failed { .. })
    }

    /// Check if the first chunk has not yet arrived (the UI shows the
    /// loading indicator exactly while this holds for an in-flight turn).
    pub fn awaiting_first_chunk(&self) -> bool {
        matches!(self, Self::Submitting | Self::CountingInputTokens)
            || matches!(self, Self::StreamingChunks { chunks_received: 0 })
    }

    /// Get a human-readable description of the current state.
    pub fn description(&self) -> &str {
        match self {
            Self::Idle => "Ready for input",
            Self::Submitting => "Preparing request",
            Self::CountingInputTokens => "Counting input tokens",
            Self::StreamingChunks { .. } => "Receiving response",
            Self::CountingOutputTokens => "Counting output tokens",
            Self::Failed { .. } => "Failed",
        }
    }
}
