//! State machine module
//!
//! Contains the FSM implementation for the chat turn lifecycle.

mod events;
mod states;
mod transitions;

pub use events::TurnEvent;
pub use states::TurnState;
pub use transitions::{StateMachine, TurnTransition};
