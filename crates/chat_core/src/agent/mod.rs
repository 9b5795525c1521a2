//! Agent module - the closed set of chat personas
//!
//! The four personas are fixed at compile time; everything that varies per
//! persona lives in a static [`AgentProfile`] record.

mod profile;

pub use profile::{AgentId, AgentProfile};
