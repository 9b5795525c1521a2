//! ConversationStore - per-agent ordered transcripts.
//!
//! Invariants:
//! - a transcript, once initialized, starts with exactly one assistant
//!   welcome message;
//! - messages are appended in insertion order and never reordered;
//! - during streaming the in-progress assistant message is always the tail
//!   of its agent's transcript;
//! - the mapping is only emptied by an explicit sign-out.

use std::collections::HashMap;

use crate::agent::AgentId;
use crate::message::{Message, Role};

#[derive(Debug, Default)]
pub struct ConversationStore {
    conversations: HashMap<AgentId, Vec<Message>>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a welcome message for every agent that has no transcript yet.
    /// Idempotent: agents with existing transcripts are left untouched.
    pub fn initialize_if_empty(&mut self, user_name: &str) {
        for agent in AgentId::ALL {
            self.conversations
                .entry(agent)
                .or_insert_with(|| vec![Message::welcome(agent, user_name)]);
        }
    }

    pub fn messages(&self, agent: AgentId) -> &[Message] {
        self.conversations.get(&agent).map_or(&[], Vec::as_slice)
    }

    pub fn last_message(&self, agent: AgentId) -> Option<&Message> {
        self.conversations.get(&agent).and_then(|m| m.last())
    }

    /// Append the user's message. Called synchronously at submit time, before
    /// any network call resolves.
    pub fn append_user(&mut self, agent: AgentId, text: impl Into<String>) {
        self.conversations
            .entry(agent)
            .or_default()
            .push(Message::user(text));
    }

    /// Apply one streamed chunk. The first chunk of a turn appends a new
    /// assistant message; every later chunk extends the transcript tail.
    pub fn append_or_extend_assistant(&mut self, agent: AgentId, chunk: &str, is_first: bool) {
        let messages = self.conversations.entry(agent).or_default();
        match messages.last_mut() {
            Some(last) if !is_first && last.role == Role::Assistant => {
                last.content.push_str(chunk);
            }
            _ => messages.push(Message::assistant(agent, chunk)),
        }
    }

    /// Append a complete assistant message, e.g. the fixed error fallback.
    pub fn append_assistant(&mut self, agent: AgentId, text: impl Into<String>) {
        self.conversations
            .entry(agent)
            .or_default()
            .push(Message::assistant(agent, text));
    }

    /// Replace one agent's transcript wholesale (used when hydrating from
    /// persisted storage; last write wins).
    pub fn replace(&mut self, agent: AgentId, messages: Vec<Message>) {
        self.conversations.insert(agent, messages);
    }

    /// Sign-out path: drop every transcript.
    pub fn clear(&mut self) {
        self.conversations.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.conversations.is_empty()
    }
}
