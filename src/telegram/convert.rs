//! Conversion of Telegram updates into [`InboundUpdate`]

use teloxide::types::{CallbackQuery, Chat, Message, Update, UpdateKind, User};

use crate::core::types::{ChatId, ChatKind, InboundUpdate, Payload, Sender};

fn sender(user: &User) -> Sender {
    Sender {
        id: user.id,
        username: user.username.clone(),
        first_name: user.first_name.clone(),
    }
}

fn chat_kind(chat: &Chat) -> ChatKind {
    if chat.is_private() {
        ChatKind::Private
    } else if chat.is_supergroup() {
        ChatKind::Supergroup
    } else if chat.is_channel() {
        ChatKind::Channel
    } else {
        ChatKind::Group
    }
}

fn from_message(msg: &Message) -> Option<InboundUpdate> {
    let user = msg.from.as_ref()?;
    let text = msg.text()?;
    Some(InboundUpdate {
        chat_id: msg.chat.id,
        chat_kind: chat_kind(&msg.chat),
        sender: sender(user),
        payload: Payload::Text {
            message_id: msg.id.0,
            text: text.to_string(),
        },
    })
}

fn from_callback(query: &CallbackQuery) -> Option<InboundUpdate> {
    let data = query.data.clone()?;
    // Inline-mode presses carry no message; treat them as the user's private chat.
    let (chat_id, chat_kind, message_id) = match &query.message {
        Some(message) => (message.chat().id, chat_kind(message.chat()), Some(message.id().0)),
        None => (ChatId::from(query.from.id), ChatKind::Private, None),
    };
    Some(InboundUpdate {
        chat_id,
        chat_kind,
        sender: sender(&query.from),
        payload: Payload::Callback {
            callback_id: query.id.0.clone(),
            data,
            message_id,
        },
    })
}

/// `None` for update kinds the pipeline does not handle, and for messages
/// without a sender or text
pub fn inbound_update(update: &Update) -> Option<InboundUpdate> {
    match &update.kind {
        UpdateKind::Message(msg) => from_message(msg),
        UpdateKind::CallbackQuery(query) => from_callback(query),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{EventKind, UserId};
    use serde_json::json;

    /// Goes through text: teloxide's `Update` does not deserialize from a `Value`
    fn parse(value: serde_json::Value) -> Update {
        serde_json::from_str(&value.to_string()).unwrap()
    }

    fn user() -> serde_json::Value {
        json!({"id": 42, "is_bot": false, "first_name": "Ann", "username": "ann"})
    }

    fn private_chat() -> serde_json::Value {
        json!({"id": 42, "type": "private", "first_name": "Ann", "username": "ann"})
    }

    #[test]
    fn test_private_text_message() {
        let update = parse(json!({
            "update_id": 1,
            "message": {
                "message_id": 5,
                "date": 1_700_000_000,
                "chat": private_chat(),
                "from": user(),
                "text": "/start"
            }
        }));

        let inbound = inbound_update(&update).unwrap();
        assert_eq!(inbound.chat_id, ChatId(42));
        assert_eq!(inbound.sender.id, UserId(42));
        assert_eq!(inbound.sender.handle(), "ann");
        assert!(inbound.is_private());
        assert_eq!(inbound.kind(), EventKind::Command);
        assert_eq!(inbound.message_id(), Some(5));
    }

    #[test]
    fn test_group_message() {
        let update = parse(json!({
            "update_id": 2,
            "message": {
                "message_id": 6,
                "date": 1_700_000_000,
                "chat": {"id": -100, "type": "group", "title": "Friends"},
                "from": user(),
                "text": "hello"
            }
        }));

        let inbound = inbound_update(&update).unwrap();
        assert_eq!(inbound.chat_kind, ChatKind::Group);
        assert_eq!(inbound.text(), Some("hello"));
    }

    #[test]
    fn test_callback_query() {
        let update = parse(json!({
            "update_id": 3,
            "callback_query": {
                "id": "cbq-1",
                "from": user(),
                "chat_instance": "ci",
                "data": "say_hi",
                "message": {
                    "message_id": 9,
                    "date": 1_700_000_000,
                    "chat": private_chat(),
                    "from": {"id": 1, "is_bot": true, "first_name": "Bot", "username": "mangi_bot"},
                    "text": "pick one"
                }
            }
        }));

        let inbound = inbound_update(&update).unwrap();
        assert_eq!(inbound.callback_id(), Some("cbq-1"));
        assert_eq!(inbound.callback_data(), Some("say_hi"));
        assert_eq!(inbound.message_id(), Some(9));
        assert_eq!(inbound.chat_id, ChatId(42));
    }

    #[test]
    fn test_message_without_text_is_skipped() {
        let update = parse(json!({
            "update_id": 4,
            "message": {
                "message_id": 7,
                "date": 1_700_000_000,
                "chat": private_chat(),
                "from": user()
            }
        }));
        assert!(inbound_update(&update).is_none());
    }
}
