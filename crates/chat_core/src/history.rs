//! QueryHistory - bounded, newest-first log of submitted prompts.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Entries retained before the oldest is dropped.
pub const QUERY_HISTORY_CAPACITY: usize = 50;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryHistoryEntry {
    pub id: Uuid,
    pub query: String,
    pub agent_name: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug)]
pub struct QueryHistory {
    entries: VecDeque<QueryHistoryEntry>,
    capacity: usize,
}

impl Default for QueryHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryHistory {
    pub fn new() -> Self {
        Self::with_capacity(QUERY_HISTORY_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            capacity,
        }
    }

    /// Prepend an entry, truncating to the most recent `capacity`.
    pub fn record(&mut self, query: impl Into<String>, agent_name: impl Into<String>) {
        self.entries.push_front(QueryHistoryEntry {
            id: Uuid::new_v4(),
            query: query.into(),
            agent_name: agent_name.into(),
            timestamp: Utc::now(),
        });
        self.entries.truncate(self.capacity);
    }

    /// Iterate newest first.
    pub fn iter(&self) -> impl Iterator<Item = &QueryHistoryEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
