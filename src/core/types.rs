//! Transport-neutral update model shared by every pipeline stage

use std::fmt;

pub use teloxide::types::{ChatId, UserId};

/// Chat identity the session and sequencing are keyed by
pub type ConversationId = ChatId;

/// Kind of conversation an update belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChatKind {
    Private,
    Group,
    Supergroup,
    Channel,
}

impl ChatKind {
    pub fn is_private(&self) -> bool {
        matches!(self, ChatKind::Private)
    }
}

/// The user that produced an update
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sender {
    pub id: UserId,
    pub username: Option<String>,
    pub first_name: String,
}

impl Sender {
    pub fn new(id: u64, first_name: impl Into<String>) -> Self {
        Self {
            id: UserId(id),
            username: None,
            first_name: first_name.into(),
        }
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// `@username` when known, `unknown` otherwise
    pub fn handle(&self) -> &str {
        self.username.as_deref().unwrap_or("unknown")
    }
}

/// What the update carries
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// A text message; commands are text starting with `/`
    Text { message_id: i32, text: String },
    /// An inline button press
    Callback {
        callback_id: String,
        data: String,
        message_id: Option<i32>,
    },
}

/// Coarse classification used for routing and diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum EventKind {
    Command,
    Message,
    Callback,
}

/// One inbound event as delivered by the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundUpdate {
    pub chat_id: ConversationId,
    pub chat_kind: ChatKind,
    pub sender: Sender,
    pub payload: Payload,
}

impl InboundUpdate {
    /// Text message in a private chat, where chat id equals user id
    pub fn private_text(sender: Sender, message_id: i32, text: impl Into<String>) -> Self {
        Self {
            chat_id: ChatId::from(sender.id),
            chat_kind: ChatKind::Private,
            sender,
            payload: Payload::Text {
                message_id,
                text: text.into(),
            },
        }
    }

    /// Button press in a private chat
    pub fn private_callback(sender: Sender, callback_id: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            chat_id: ChatId::from(sender.id),
            chat_kind: ChatKind::Private,
            sender,
            payload: Payload::Callback {
                callback_id: callback_id.into(),
                data: data.into(),
                message_id: None,
            },
        }
    }

    pub fn in_chat(mut self, chat_id: ChatId, chat_kind: ChatKind) -> Self {
        self.chat_id = chat_id;
        self.chat_kind = chat_kind;
        self
    }

    pub fn text(&self) -> Option<&str> {
        match &self.payload {
            Payload::Text { text, .. } => Some(text),
            Payload::Callback { .. } => None,
        }
    }

    pub fn callback_data(&self) -> Option<&str> {
        match &self.payload {
            Payload::Callback { data, .. } => Some(data),
            Payload::Text { .. } => None,
        }
    }

    pub fn callback_id(&self) -> Option<&str> {
        match &self.payload {
            Payload::Callback { callback_id, .. } => Some(callback_id),
            Payload::Text { .. } => None,
        }
    }

    /// Message the event refers to: the text message itself, or the message
    /// carrying the pressed button
    pub fn message_id(&self) -> Option<i32> {
        match &self.payload {
            Payload::Text { message_id, .. } => Some(*message_id),
            Payload::Callback { message_id, .. } => *message_id,
        }
    }

    pub fn is_private(&self) -> bool {
        self.chat_kind.is_private()
    }

    pub fn kind(&self) -> EventKind {
        match &self.payload {
            Payload::Text { text, .. } if text.starts_with('/') => EventKind::Command,
            Payload::Text { .. } => EventKind::Message,
            Payload::Callback { .. } => EventKind::Callback,
        }
    }
}

/// Username of the bot; namespaces every persisted key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BotIdentity(String);

impl BotIdentity {
    pub fn new(username: impl Into<String>) -> Self {
        let username = username.into();
        let trimmed = username.trim_start_matches('@');
        if trimmed.is_empty() {
            return Self("unknownbot".to_string());
        }
        Self(trimmed.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BotIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_kind_classification() {
        let sender = Sender::new(42, "Ann");
        assert_eq!(
            InboundUpdate::private_text(sender.clone(), 1, "/start").kind(),
            EventKind::Command
        );
        assert_eq!(
            InboundUpdate::private_text(sender.clone(), 2, "hello").kind(),
            EventKind::Message
        );
        assert_eq!(
            InboundUpdate::private_callback(sender, "cb1", "say_hi").kind(),
            EventKind::Callback
        );
    }

    #[test]
    fn test_private_update_uses_user_chat() {
        let update = InboundUpdate::private_text(Sender::new(7, "Bo"), 1, "hi");
        assert_eq!(update.chat_id, ChatId(7));
        assert!(update.is_private());

        let group = update.in_chat(ChatId(-100), ChatKind::Supergroup);
        assert!(!group.is_private());
    }

    #[test]
    fn test_bot_identity_strips_at() {
        assert_eq!(BotIdentity::new("@mangi_bot").as_str(), "mangi_bot");
        assert_eq!(BotIdentity::new("").as_str(), "unknownbot");
    }

    #[test]
    fn test_sender_handle() {
        assert_eq!(Sender::new(1, "A").handle(), "unknown");
        assert_eq!(Sender::new(1, "A").with_username("ann").handle(), "ann");
    }
}
