//! Transcript message types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::agent::AgentId;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A reference attached to an assistant reply.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Citation {
    pub title: String,
    pub uri: String,
}

/// One entry in a conversation transcript.
///
/// Content is only mutated while the message is the in-progress streaming
/// tail of its transcript; everything else is written once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    #[serde(default = "generate_id")]
    pub id: Uuid,
    pub role: Role,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub citations: Option<Vec<Citation>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent: Option<AgentId>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

fn generate_id() -> Uuid {
    Uuid::new_v4()
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role: Role::User,
            content: content.into(),
            citations: None,
            agent: None,
            created_at: Utc::now(),
        }
    }

    pub fn assistant(agent: AgentId, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role: Role::Assistant,
            content: content.into(),
            citations: None,
            agent: Some(agent),
            created_at: Utc::now(),
        }
    }

    /// The single seeded assistant message that opens every conversation.
    pub fn welcome(agent: AgentId, user_name: &str) -> Self {
        Self::assistant(agent, agent.welcome_message(user_name))
    }

    pub fn is_assistant(&self) -> bool {
        self.role == Role::Assistant
    }
}
