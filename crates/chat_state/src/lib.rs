//! chat_state - State machine for the chat turn lifecycle
//!
//! This crate provides the finite state machine that tracks one submission
//! from acceptance through streaming to completion or failure.

pub mod machine;

// Re-export commonly used types
pub use machine::{StateMachine, TurnEvent, TurnState, TurnTransition};
