//! chat_orchestrator - The streaming response orchestrator
//!
//! Owns the per-session chat engine: conversation state, the
//! single-submission guard, request assembly, ordered chunk consumption,
//! token accounting, and the UI-facing event stream.

pub mod engine;
pub mod error;
pub mod events;
pub mod request;

pub use engine::{ChatEngine, SubmitOutcome, FALLBACK_ASSISTANT_REPLY};
pub use error::EngineError;
pub use events::ChatEvent;
pub use request::build_contents;
