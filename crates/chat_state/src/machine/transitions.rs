//! State transitions - FSM transition logic
//!
//! Implements the state machine that handles event-driven turn transitions.

use super::events::TurnEvent;
use super::states::TurnState;

/// Represents a state transition result.
#[derive(Debug, Clone)]
pub struct TurnTransition {
    /// The state before the transition.
    pub from: TurnState,
    /// The state after the transition.
    pub to: TurnState,
    /// The event that triggered the transition.
    pub event: TurnEvent,
    /// Whether the state actually changed.
    pub changed: bool,
}

/// State machine for managing turn state transitions.
#[derive(Debug, Clone)]
pub struct StateMachine {
    /// Current state.
    current_state: TurnState,
    /// Transition history (limited).
    history: Vec<TurnTransition>,
    /// Max history entries to keep.
    max_history: usize,
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl StateMachine {
    /// Create a new state machine in Idle state.
    pub fn new() -> Self {
        Self {
            current_state: TurnState::Idle,
            history: Vec::new(),
            max_history: 50,
        }
    }

    /// Create a state machine with a specific initial state.
    pub fn with_state(state: TurnState) -> Self {
        Self {
            current_state: state,
            history: Vec::new(),
            max_history: 50,
        }
    }

    /// Get the current state.
    pub fn state(&self) -> &TurnState {
        &self.current_state
    }

    /// Get the transition history.
    pub fn history(&self) -> &[TurnTransition] {
        &self.history
    }

    /// Handle an event and transition to a new state.
    pub fn handle_event(&mut self, event: TurnEvent) -> TurnTransition {
        let old_state = self.current_state.clone();
        let new_state = self.compute_next_state(&old_state, &event);
        let changed = old_state != new_state;

        if !changed {
            tracing::debug!(state = ?old_state, event = ?event, "event caused no transition");
        }

        self.current_state = new_state.clone();

        let transition = TurnTransition {
            from: old_state,
            to: new_state,
            event,
            changed,
        };

        self.history.push(transition.clone());
        if self.history.len() > self.max_history {
            self.history.remove(0);
        }

        transition
    }

    /// Compute the next state given current state and event.
    fn compute_next_state(&self, state: &TurnState, event: &TurnEvent) -> TurnState {
        use TurnEvent::*;
        use TurnState::*;

        match (state, event) {
            // ========== Submission ==========
            (Idle, SubmissionAccepted) => Submitting,
            (Failed { .. }, SubmissionAccepted) => Submitting,

            // ========== Request Pipeline ==========
            (Submitting, RequestPrepared) => CountingInputTokens,

            (CountingInputTokens, InputTokensCounted { .. }) => {
                StreamingChunks { chunks_received: 0 }
            }

            (StreamingChunks { chunks_received }, ChunkReceived) => StreamingChunks {
                chunks_received: chunks_received + 1,
            },

            (StreamingChunks { .. }, StreamEnded) => CountingOutputTokens,

            (CountingOutputTokens, OutputTokensCounted { .. }) => Idle,

            // ========== Failure, from any in-flight state ==========
            (from, TurnFailed { error }) if from.is_in_flight() => Failed {
                error_message: error.clone(),
                failed_at: chrono::Utc::now().to_rfc3339(),
            },

            // ========== Reset ==========
            (Failed { .. }, Reset) | (Idle, Reset) => Idle,

            // ========== Default: No transition ==========
            _ => state.clone(),
        }
    }

    /// Check if a transition is valid without executing it.
    pub fn can_transition(&self, event: &TurnEvent) -> bool {
        let next = self.compute_next_state(&self.current_state, event);
        next != self.current_state
    }

    /// Reset to Idle state.
    pub fn reset(&mut self) {
        self.current_state = TurnState::Idle;
    }
}
