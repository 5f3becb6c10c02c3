use std::sync::Arc;

use serde_json::Value;

use crate::auth::{TokenError, TokenGate, TokenVerdict};
use crate::core::error::AppResult;
use crate::core::types::{ConversationId, InboundUpdate, Sender};
use crate::session::{Session, SessionStore, UpdateReport};
use crate::transport::{OutgoingMessage, Transport};

/// Everything a handler sees while processing one update
///
/// The session is owned here for the duration of the update and written
/// back through the [`SessionStore`] by [`Context::save`].
pub struct Context {
    update: InboundUpdate,
    pub session: Session,
    transport: Arc<dyn Transport>,
    sessions: SessionStore,
    token_gate: Option<Arc<TokenGate>>,
    persist: bool,
    callback_answered: bool,
}

impl Context {
    pub fn new(
        update: InboundUpdate,
        session: Session,
        transport: Arc<dyn Transport>,
        sessions: SessionStore,
    ) -> Self {
        Self {
            update,
            session,
            transport,
            sessions,
            token_gate: None,
            persist: true,
            callback_answered: false,
        }
    }

    pub fn with_token_gate(mut self, gate: Option<Arc<TokenGate>>) -> Self {
        self.token_gate = gate;
        self
    }

    /// Stops every save for this update. Used when the stored session could
    /// not be read, so the default stand-in never overwrites it.
    pub fn disable_persistence(&mut self) {
        self.persist = false;
    }

    pub fn update(&self) -> &InboundUpdate {
        &self.update
    }

    pub fn chat_id(&self) -> ConversationId {
        self.update.chat_id
    }

    pub fn sender(&self) -> &Sender {
        &self.update.sender
    }

    pub fn transport(&self) -> &dyn Transport {
        self.transport.as_ref()
    }

    pub async fn reply(&self, text: impl Into<String>) -> AppResult<()> {
        self.reply_with(OutgoingMessage::text(text)).await
    }

    pub async fn reply_with(&self, message: OutgoingMessage) -> AppResult<()> {
        self.transport.send_message(self.update.chat_id, message).await
    }

    /// Answers the pressed button. No-op for non-callback updates.
    pub async fn answer_callback(&mut self, text: Option<&str>, show_alert: bool) -> AppResult<()> {
        let Some(callback_id) = self.update.callback_id() else {
            return Ok(());
        };
        self.transport.answer_callback(callback_id, text, show_alert).await?;
        self.callback_answered = true;
        Ok(())
    }

    pub fn callback_answered(&self) -> bool {
        self.callback_answered
    }

    pub fn get_custom(&self, path: &str) -> Option<&Value> {
        self.session.custom.get(path)
    }

    /// Create-or-replace `path`, then save
    pub async fn set_custom(&mut self, path: &str, value: impl Into<Value>) {
        self.session.custom.set(path, value.into());
        self.flush().await;
    }

    /// Overwrites existing keys only; saves when at least one key applied
    pub async fn update_custom<I, K>(&mut self, updates: I) -> UpdateReport
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let report = self.session.custom.update(updates);
        if report.any_applied() {
            self.flush().await;
        }
        report
    }

    /// Removes `path`; saves on success
    pub async fn delete_custom(&mut self, path: &str) -> bool {
        let removed = self.session.custom.delete(path);
        if removed {
            self.flush().await;
        }
        removed
    }

    /// Writes the session now. The pipeline saves again when the update
    /// finishes.
    pub async fn save(&self) -> AppResult<()> {
        if !self.persist {
            log::debug!("Session save skipped for chat {}", self.update.chat_id);
            return Ok(());
        }
        self.sessions.save(self.update.chat_id, &self.session).await
    }

    async fn flush(&self) {
        if let Err(e) = self.save().await {
            log::error!("Failed to save session for chat {}: {}", self.update.chat_id, e);
        }
    }

    /// Runs the token gate over this session, storing a fresh credential
    /// when it was missing or rejected. [`TokenVerdict::Skipped`] when
    /// token auth is off.
    pub async fn ensure_token(&mut self) -> Result<TokenVerdict, TokenError> {
        let Some(gate) = self.token_gate.clone() else {
            return Ok(TokenVerdict::Skipped);
        };
        let verdict = gate.vet(&mut self.session, &self.update)?;
        if verdict.changed_session() {
            self.flush().await;
        }
        Ok(verdict)
    }
}
