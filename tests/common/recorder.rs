//! Transport that records every outbound call

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use mangibot::core::error::{AppError, AppResult};
use mangibot::core::types::ChatId;
use mangibot::transport::{CommandMenuEntry, OutgoingMessage, Transport};

/// One outbound call as seen by the platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportCall {
    Send {
        chat: ChatId,
        message: OutgoingMessage,
    },
    AnswerCallback {
        callback_id: String,
        text: Option<String>,
        show_alert: bool,
    },
    Edit {
        chat: ChatId,
        message_id: i32,
        text: String,
    },
    SetMenu(Vec<CommandMenuEntry>),
}

/// Records calls instead of talking to Telegram
#[derive(Default)]
pub struct RecordingTransport {
    calls: Mutex<Vec<TransportCall>>,
    fail_menu: bool,
}

impl RecordingTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Transport whose `set_command_menu` always fails
    pub fn failing_menu() -> Arc<Self> {
        Arc::new(Self {
            fail_menu: true,
            ..Self::default()
        })
    }

    fn record(&self, call: TransportCall) {
        self.calls.lock().unwrap().push(call);
    }

    pub fn calls(&self) -> Vec<TransportCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }

    /// Texts sent to `chat`, in order
    pub fn sent_to(&self, chat: ChatId) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                TransportCall::Send { chat: to, message } if to == chat => Some(message.text),
                _ => None,
            })
            .collect()
    }

    pub fn messages_to(&self, chat: ChatId) -> Vec<OutgoingMessage> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                TransportCall::Send { chat: to, message } if to == chat => Some(message),
                _ => None,
            })
            .collect()
    }

    pub fn answers(&self) -> Vec<(String, Option<String>, bool)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                TransportCall::AnswerCallback {
                    callback_id,
                    text,
                    show_alert,
                } => Some((callback_id, text, show_alert)),
                _ => None,
            })
            .collect()
    }

    pub fn edits(&self) -> Vec<(ChatId, i32, String)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                TransportCall::Edit { chat, message_id, text } => Some((chat, message_id, text)),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send_message(&self, chat: ChatId, message: OutgoingMessage) -> AppResult<()> {
        self.record(TransportCall::Send { chat, message });
        Ok(())
    }

    async fn answer_callback(&self, callback_id: &str, text: Option<&str>, show_alert: bool) -> AppResult<()> {
        self.record(TransportCall::AnswerCallback {
            callback_id: callback_id.to_string(),
            text: text.map(str::to_string),
            show_alert,
        });
        Ok(())
    }

    async fn edit_message_text(&self, chat: ChatId, message_id: i32, text: &str) -> AppResult<()> {
        self.record(TransportCall::Edit {
            chat,
            message_id,
            text: text.to_string(),
        });
        Ok(())
    }

    async fn set_command_menu(&self, entries: &[CommandMenuEntry]) -> AppResult<()> {
        if self.fail_menu {
            return Err(AppError::Transport("setMyCommands rejected".to_string()));
        }
        self.record(TransportCall::SetMenu(entries.to_vec()));
        Ok(())
    }
}
