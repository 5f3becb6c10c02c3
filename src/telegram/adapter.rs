//! [`Transport`] over the Telegram Bot API

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{
    BotCommand, CallbackQueryId, InlineKeyboardButton, InlineKeyboardMarkup, MessageId, ParseMode,
};

use crate::core::error::AppResult;
use crate::transport::{CommandMenuEntry, Keyboard, OutgoingMessage, Transport};

/// Sends through a teloxide [`Bot`]
#[derive(Clone)]
pub struct TeloxideTransport {
    bot: Bot,
}

impl TeloxideTransport {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

pub(crate) fn keyboard_markup(keyboard: &Keyboard) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(keyboard.rows.iter().map(|row| {
        row.iter()
            .map(|button| InlineKeyboardButton::callback(button.text.clone(), button.callback_data.clone()))
            .collect::<Vec<_>>()
    }))
}

#[async_trait]
impl Transport for TeloxideTransport {
    async fn send_message(&self, chat: ChatId, message: OutgoingMessage) -> AppResult<()> {
        let mut request = self.bot.send_message(chat, message.text);
        if message.html {
            request = request.parse_mode(ParseMode::Html);
        }
        if let Some(keyboard) = &message.keyboard {
            request = request.reply_markup(keyboard_markup(keyboard));
        }
        request.await?;
        Ok(())
    }

    async fn answer_callback(&self, callback_id: &str, text: Option<&str>, show_alert: bool) -> AppResult<()> {
        let mut request = self
            .bot
            .answer_callback_query(CallbackQueryId(callback_id.to_string()));
        if let Some(text) = text {
            request = request.text(text);
        }
        if show_alert {
            request = request.show_alert(true);
        }
        request.await?;
        Ok(())
    }

    async fn edit_message_text(&self, chat: ChatId, message_id: i32, text: &str) -> AppResult<()> {
        self.bot.edit_message_text(chat, MessageId(message_id), text).await?;
        Ok(())
    }

    async fn set_command_menu(&self, entries: &[CommandMenuEntry]) -> AppResult<()> {
        let commands: Vec<BotCommand> = entries
            .iter()
            .map(|entry| BotCommand::new(entry.command.clone(), entry.description.clone()))
            .collect();
        self.bot.set_my_commands(commands).await?;
        Ok(())
    }
}
