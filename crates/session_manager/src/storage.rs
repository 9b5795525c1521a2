//! Session storage trait and implementations

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

use chat_core::{AgentId, Message};

use crate::error::{Result, SessionError};
use crate::structs::{conversation_key, user_key, SessionMeta};

/// Persisted session storage. Last write wins; no conflict resolution, no
/// TTL. The chat engine treats this collaborator as optional and
/// best-effort.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Load one user's transcript with one agent.
    async fn load_transcript(&self, email: &str, agent: AgentId) -> Result<Vec<Message>>;

    /// Save one user's transcript with one agent.
    async fn save_transcript(&self, email: &str, agent: AgentId, messages: &[Message])
        -> Result<()>;

    /// Load one user's session metadata.
    async fn load_meta(&self, email: &str) -> Result<SessionMeta>;

    /// Save one user's session metadata.
    async fn save_meta(&self, email: &str, meta: &SessionMeta) -> Result<()>;

    /// Delete everything stored for one user.
    async fn delete_user_data(&self, email: &str) -> Result<()>;
}

/// File-based session storage: one JSON document per key under a base
/// directory.
#[derive(Clone)]
pub struct FileSessionStore {
    base_path: PathBuf,
}

impl FileSessionStore {
    pub fn new<P: AsRef<Path>>(base_path: P) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    /// Keys embed emails; keep only filesystem-safe characters.
    fn key_path(&self, key: &str) -> PathBuf {
        let sanitized: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.base_path.join(format!("{sanitized}.json"))
    }

    async fn read_json<T: serde::de::DeserializeOwned>(&self, key: &str) -> Result<T> {
        let path = self.key_path(key);
        if !path.exists() {
            return Err(SessionError::NotFound);
        }
        let contents = fs::read_to_string(&path).await?;
        Ok(serde_json::from_str(&contents)?)
    }

    async fn write_json<T: serde::Serialize>(&self, key: &str, value: &T) -> Result<()> {
        fs::create_dir_all(&self.base_path).await?;
        let contents = serde_json::to_string_pretty(value)?;
        fs::write(self.key_path(key), contents).await?;
        Ok(())
    }

    async fn remove_key(&self, key: &str) -> Result<()> {
        let path = self.key_path(key);
        if path.exists() {
            fs::remove_file(&path).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn load_transcript(&self, email: &str, agent: AgentId) -> Result<Vec<Message>> {
        self.read_json(&conversation_key(email, agent)).await
    }

    async fn save_transcript(
        &self,
        email: &str,
        agent: AgentId,
        messages: &[Message],
    ) -> Result<()> {
        self.write_json(&conversation_key(email, agent), &messages)
            .await
    }

    async fn load_meta(&self, email: &str) -> Result<SessionMeta> {
        self.read_json(&user_key(email)).await
    }

    async fn save_meta(&self, email: &str, meta: &SessionMeta) -> Result<()> {
        self.write_json(&user_key(email), meta).await
    }

    async fn delete_user_data(&self, email: &str) -> Result<()> {
        self.remove_key(&user_key(email)).await?;
        for agent in AgentId::ALL {
            self.remove_key(&conversation_key(email, agent)).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const EMAIL: &str = "dana@example.com";

    #[tokio::test]
    async fn transcript_save_and_load() {
        let dir = tempdir().unwrap();
        let store = FileSessionStore::new(dir.path());

        let messages = vec![
            Message::welcome(AgentId::DisciplineHead, "Dana"),
            Message::user("status?"),
        ];
        store
            .save_transcript(EMAIL, AgentId::DisciplineHead, &messages)
            .await
            .unwrap();

        let loaded = store
            .load_transcript(EMAIL, AgentId::DisciplineHead)
            .await
            .unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[1].content, "status?");
    }

    #[tokio::test]
    async fn missing_key_is_not_found() {
        let dir = tempdir().unwrap();
        let store = FileSessionStore::new(dir.path());

        assert!(matches!(
            store.load_transcript(EMAIL, AgentId::SubseaEngineer).await,
            Err(SessionError::NotFound)
        ));
        assert!(matches!(
            store.load_meta(EMAIL).await,
            Err(SessionError::NotFound)
        ));
    }

    #[tokio::test]
    async fn last_write_wins() {
        let dir = tempdir().unwrap();
        let store = FileSessionStore::new(dir.path());

        let mut meta = SessionMeta::default();
        store.save_meta(EMAIL, &meta).await.unwrap();
        meta.selected_agent = AgentId::CorrosionEngineer;
        store.save_meta(EMAIL, &meta).await.unwrap();

        let loaded = store.load_meta(EMAIL).await.unwrap();
        assert_eq!(loaded.selected_agent, AgentId::CorrosionEngineer);
    }

    #[tokio::test]
    async fn delete_user_data_removes_all_keys() {
        let dir = tempdir().unwrap();
        let store = FileSessionStore::new(dir.path());

        store
            .save_meta(EMAIL, &SessionMeta::default())
            .await
            .unwrap();
        for agent in AgentId::ALL {
            store
                .save_transcript(EMAIL, agent, &[Message::welcome(agent, "Dana")])
                .await
                .unwrap();
        }

        store.delete_user_data(EMAIL).await.unwrap();

        assert!(matches!(
            store.load_meta(EMAIL).await,
            Err(SessionError::NotFound)
        ));
        for agent in AgentId::ALL {
            assert!(matches!(
                store.load_transcript(EMAIL, agent).await,
                Err(SessionError::NotFound)
            ));
        }
    }
}
