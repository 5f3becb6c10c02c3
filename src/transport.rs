//! Outbound side of the platform
//!
//! The pipeline talks to the chat platform only through [`Transport`];
//! [`crate::telegram::TeloxideTransport`] is the production implementation.

use std::collections::HashSet;

use async_trait::async_trait;

use crate::core::error::AppResult;
use crate::core::types::ChatId;

/// Inline button that reports `callback_data` back when pressed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub text: String,
    pub callback_data: String,
}

impl Button {
    pub fn callback(text: impl Into<String>, callback_data: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            callback_data: callback_data.into(),
        }
    }
}

/// Rows of inline buttons attached to a message
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Keyboard {
    pub rows: Vec<Vec<Button>>,
}

impl Keyboard {
    pub fn new(rows: Vec<Vec<Button>>) -> Self {
        Self { rows }
    }

    pub fn single_row(buttons: Vec<Button>) -> Self {
        Self { rows: vec![buttons] }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.iter().all(Vec::is_empty)
    }
}

/// Message to send to a chat
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    pub text: String,
    pub keyboard: Option<Keyboard>,
    /// Render `text` as Telegram HTML
    pub html: bool,
}

impl OutgoingMessage {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            keyboard: None,
            html: false,
        }
    }

    pub fn html(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            keyboard: None,
            html: true,
        }
    }

    pub fn with_keyboard(mut self, keyboard: Keyboard) -> Self {
        self.keyboard = (!keyboard.is_empty()).then_some(keyboard);
        self
    }
}

/// One line of the platform's command menu
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandMenuEntry {
    pub command: String,
    pub description: String,
}

impl CommandMenuEntry {
    pub fn new(command: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            description: description.into(),
        }
    }
}

/// Keeps the first entry for each command, preserving order
pub fn dedupe_menu(entries: impl IntoIterator<Item = CommandMenuEntry>) -> Vec<CommandMenuEntry> {
    let mut seen = HashSet::new();
    entries
        .into_iter()
        .filter(|entry| seen.insert(entry.command.clone()))
        .collect()
}

/// Outbound calls the pipeline needs from the platform
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send_message(&self, chat: ChatId, message: OutgoingMessage) -> AppResult<()>;

    /// Acknowledges a button press, optionally with a toast or alert
    async fn answer_callback(&self, callback_id: &str, text: Option<&str>, show_alert: bool) -> AppResult<()>;

    async fn edit_message_text(&self, chat: ChatId, message_id: i32, text: &str) -> AppResult<()>;

    /// Replaces the command menu shown by the client
    async fn set_command_menu(&self, entries: &[CommandMenuEntry]) -> AppResult<()>;
}
