//! Turn events - Defines events that trigger state transitions

use serde::{Deserialize, Serialize};

/// Defines the events that can trigger turn state transitions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnEvent {
    // ========== User Events ==========
    /// A submission passed the guard and was accepted.
    SubmissionAccepted,

    // ========== Request Pipeline Events ==========
    /// The outgoing request (preamble, history, file parts) is assembled.
    RequestPrepared,

    /// The input token count resolved.
    InputTokensCounted { tokens: u32 },

    /// One non-empty stream chunk was applied to the transcript.
    ChunkReceived,

    /// The chunk stream ended normally.
    StreamEnded,

    /// The output token count resolved; the turn is complete.
    OutputTokensCounted { tokens: u32 },

    // ========== Error Events ==========
    /// The turn aborted (network failure, API error, token-count failure,
    /// cancellation).
    TurnFailed { error: String },

    /// Return a settled machine to Idle.
    Reset,
}

impl TurnEvent {
    /// Check if this event reports token consumption.
    pub fn token_count(&self) -> Option<u32> {
        match self {
            Self::InputTokensCounted { tokens } | Self::OutputTokensCounted { tokens } => {
                Some(*tokens)
            }
            _ => None,
        }
    }

    /// Check if this is an error event.
    pub fn is_error_event(&self) -> bool {
        matches!(self, Self::TurnFailed { .. })
    }
}
