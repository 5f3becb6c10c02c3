use std::sync::Arc;

use super::Session;
use crate::core::error::AppResult;
use crate::core::types::{BotIdentity, ConversationId};
use crate::storage::KvStore;

/// Loads and saves [`Session`] records under `bot:<bot>:session:<chat>`
#[derive(Clone)]
pub struct SessionStore {
    kv: Arc<dyn KvStore>,
    bot: BotIdentity,
}

impl SessionStore {
    pub fn new(kv: Arc<dyn KvStore>, bot: BotIdentity) -> Self {
        Self { kv, bot }
    }

    pub fn key(&self, conversation: ConversationId) -> String {
        format!("bot:{}:session:{}", self.bot, conversation.0)
    }

    /// Persisted session, or a fresh default the first time a conversation is seen.
    ///
    /// A record that no longer parses is logged and replaced by a default
    /// one; store failures are returned to the caller.
    pub async fn load(&self, conversation: ConversationId) -> AppResult<Session> {
        let key = self.key(conversation);
        let Some(raw) = self.kv.read(&key).await? else {
            return Ok(Session::default());
        };

        match serde_json::from_str(&raw) {
            Ok(session) => Ok(session),
            Err(e) => {
                log::warn!("Discarding unreadable session under {}: {}", key, e);
                Ok(Session::default())
            }
        }
    }

    pub async fn save(&self, conversation: ConversationId, session: &Session) -> AppResult<()> {
        let key = self.key(conversation);
        let raw = serde_json::to_string(session)?;
        self.kv.write(&key, &raw).await?;
        log::debug!("Session saved under {}", key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::ChatId;
    use crate::storage::MemoryStore;
    use serde_json::json;

    fn store() -> (Arc<MemoryStore>, SessionStore) {
        let kv = Arc::new(MemoryStore::new());
        let sessions = SessionStore::new(kv.clone(), BotIdentity::new("test_bot"));
        (kv, sessions)
    }

    #[test]
    fn test_key_layout() {
        let (_, sessions) = store();
        assert_eq!(sessions.key(ChatId(42)), "bot:test_bot:session:42");
        assert_eq!(sessions.key(ChatId(-1001)), "bot:test_bot:session:-1001");
    }

    #[tokio::test]
    async fn test_load_unknown_conversation_is_default() {
        let (_, sessions) = store();
        assert_eq!(sessions.load(ChatId(1)).await.unwrap(), Session::default());
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let (_, sessions) = store();
        let mut session = Session::default();
        session.token = Some("tok".to_string());
        session.custom.set("profile.name", json!("Ann"));

        sessions.save(ChatId(5), &session).await.unwrap();
        assert_eq!(sessions.load(ChatId(5)).await.unwrap(), session);
        assert_eq!(sessions.load(ChatId(6)).await.unwrap(), Session::default());
    }

    #[tokio::test]
    async fn test_corrupt_record_falls_back_to_default() {
        let (kv, sessions) = store();
        kv.write(&sessions.key(ChatId(9)), "{not json").await.unwrap();
        assert_eq!(sessions.load(ChatId(9)).await.unwrap(), Session::default());
    }
}
