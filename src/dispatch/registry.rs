use std::collections::HashMap;
use std::sync::Arc;

use super::handler::Handler;
use super::predicate::Predicate;
use super::Context;
use crate::core::error::{HandlerError, HandlerResult};
use crate::core::types::{BotIdentity, InboundUpdate, Payload};
use crate::transport::{dedupe_menu, Button, CommandMenuEntry, Keyboard, OutgoingMessage};

/// A `/command` registration
///
/// ```no_run
/// use mangibot::dispatch::Command;
/// use mangibot::transport::Button;
///
/// let start = Command::new("start")
///     .description("Start the bot")
///     .reply("Welcome!")
///     .buttons(vec![vec![Button::callback("Say hi!", "say_hi")]]);
/// ```
#[derive(Clone)]
pub struct Command {
    name: String,
    description: Option<String>,
    reply: Option<String>,
    buttons: Option<Keyboard>,
    handler: Option<Arc<dyn Handler>>,
    requires_auth: bool,
}

impl Command {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            name: name.trim_start_matches('/').to_string(),
            description: None,
            reply: None,
            buttons: None,
            handler: None,
            requires_auth: false,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// HTML text sent after the handler succeeds
    pub fn reply(mut self, text: impl Into<String>) -> Self {
        self.reply = Some(text.into());
        self
    }

    /// Inline keyboard attached to the reply
    pub fn buttons(mut self, rows: Vec<Vec<Button>>) -> Self {
        self.buttons = Some(Keyboard::new(rows));
        self
    }

    pub fn handler(mut self, handler: Arc<dyn Handler>) -> Self {
        self.handler = Some(handler);
        self
    }

    pub fn requires_auth(mut self) -> Self {
        self.requires_auth = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn menu_entry(&self) -> CommandMenuEntry {
        let description = self
            .description
            .clone()
            .unwrap_or_else(|| format!("Execute /{} command", self.name));
        CommandMenuEntry::new(self.name.clone(), description)
    }

    fn reply_message(&self) -> Option<OutgoingMessage> {
        let text = self.reply.as_ref()?;
        let message = OutgoingMessage::html(text.clone());
        Some(match &self.buttons {
            Some(keyboard) => message.with_keyboard(keyboard.clone()),
            None => message,
        })
    }
}

/// Predicate-guarded handler
#[derive(Clone)]
pub struct Route {
    predicate: Predicate,
    handler: Arc<dyn Handler>,
    requires_auth: bool,
}

impl Route {
    pub fn new<P>(predicate: P, handler: Arc<dyn Handler>) -> Self
    where
        P: Fn(&InboundUpdate) -> bool + Send + Sync + 'static,
    {
        Self {
            predicate: Arc::new(predicate),
            handler,
            requires_auth: false,
        }
    }

    pub fn with_auth(mut self) -> Self {
        self.requires_auth = true;
        self
    }

    fn matches(&self, update: &InboundUpdate) -> bool {
        (self.predicate)(update)
    }
}

/// What an update resolved to
pub enum Resolved<'a> {
    Command(&'a Command),
    Message(&'a Route),
    Callback(&'a Route),
}

impl Resolved<'_> {
    fn requires_auth(&self) -> bool {
        match self {
            Resolved::Command(command) => command.requires_auth,
            Resolved::Message(route) | Resolved::Callback(route) => route.requires_auth,
        }
    }
}

/// Outcome of [`Registry::dispatch`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatched {
    Command(String),
    Message,
    Callback,
    Unhandled,
}

/// Ordered handler registries
///
/// Resolution order: commands (exact name, optional `@<bot>` suffix), then
/// unconditional message routes, then auth-required message routes. For
/// callbacks: unconditional routes, then auth-required routes. The first
/// match runs and nothing else does.
pub struct Registry {
    bot: BotIdentity,
    auth_available: bool,
    commands: HashMap<String, Command>,
    menu: Vec<CommandMenuEntry>,
    messages: Vec<Route>,
    auth_messages: Vec<Route>,
    callbacks: Vec<Route>,
    auth_callbacks: Vec<Route>,
}

impl Registry {
    /// `auth_available` is false when token auth is off; auth-required
    /// registrations are refused in that case.
    pub fn new(bot: BotIdentity, auth_available: bool) -> Self {
        Self {
            bot,
            auth_available,
            commands: HashMap::new(),
            menu: Vec::new(),
            messages: Vec::new(),
            auth_messages: Vec::new(),
            callbacks: Vec::new(),
            auth_callbacks: Vec::new(),
        }
    }

    fn refuse_auth(&self, what: &str) -> bool {
        if self.auth_available {
            return false;
        }
        log::error!(
            "Cannot register auth-required {}: token authentication is not enabled",
            what
        );
        true
    }

    /// `false` when the registration was refused
    pub fn register_command(&mut self, command: Command) -> bool {
        if command.requires_auth && self.refuse_auth(&format!("command /{}", command.name)) {
            return false;
        }
        if self.commands.contains_key(&command.name) {
            log::warn!("Command /{} is already registered, keeping the first one", command.name);
            return false;
        }

        self.menu.push(command.menu_entry());
        self.commands.insert(command.name.clone(), command);
        true
    }

    pub fn register_message(&mut self, route: Route) -> bool {
        if route.requires_auth {
            if self.refuse_auth("message handler") {
                return false;
            }
            self.auth_messages.push(route);
        } else {
            self.messages.push(route);
        }
        true
    }

    pub fn register_callback(&mut self, route: Route) -> bool {
        if route.requires_auth {
            if self.refuse_auth("callback handler") {
                return false;
            }
            self.auth_callbacks.push(route);
        } else {
            self.callbacks.push(route);
        }
        true
    }

    /// Menu derived from registered commands
    pub fn menu(&self) -> Vec<CommandMenuEntry> {
        dedupe_menu(self.menu.iter().cloned())
    }

    /// Command named by `text`, if it is addressed to this bot
    fn command_for(&self, text: &str) -> Option<&Command> {
        let word = text.strip_prefix('/')?.split_whitespace().next()?;
        let name = match word.split_once('@') {
            Some((name, mention)) if mention.eq_ignore_ascii_case(self.bot.as_str()) => name,
            Some(_) => return None,
            None => word,
        };
        self.commands.get(name)
    }

    pub fn resolve(&self, update: &InboundUpdate) -> Option<Resolved<'_>> {
        match &update.payload {
            Payload::Text { text, .. } => {
                if let Some(command) = self.command_for(text) {
                    return Some(Resolved::Command(command));
                }
                self.messages
                    .iter()
                    .chain(&self.auth_messages)
                    .find(|route| route.matches(update))
                    .map(Resolved::Message)
            }
            Payload::Callback { .. } => self
                .callbacks
                .iter()
                .chain(&self.auth_callbacks)
                .find(|route| route.matches(update))
                .map(Resolved::Callback),
        }
    }

    /// Runs the single matching handler.
    ///
    /// Auth-required handlers get the token gate run on the session first.
    /// A command's reply is sent only when its handler succeeded. Callback
    /// queries are acknowledged afterwards unless the handler answered.
    pub async fn dispatch(&self, ctx: &mut Context) -> Result<Dispatched, HandlerError> {
        let Some(resolved) = self.resolve(ctx.update()) else {
            log::debug!(
                "No handler for {} in chat {}",
                ctx.update().kind(),
                ctx.chat_id()
            );
            return Ok(Dispatched::Unhandled);
        };

        if resolved.requires_auth() {
            ctx.ensure_token().await?;
        }

        match resolved {
            Resolved::Command(command) => {
                if let Some(handler) = &command.handler {
                    handler.handle(ctx).await?;
                }
                if let Some(reply) = command.reply_message() {
                    ctx.reply_with(reply).await?;
                }
                Ok(Dispatched::Command(command.name.clone()))
            }
            Resolved::Message(route) => {
                route.handler.handle(ctx).await?;
                Ok(Dispatched::Message)
            }
            Resolved::Callback(route) => {
                let result: HandlerResult = route.handler.handle(ctx).await;
                if !ctx.callback_answered() {
                    if let Err(e) = ctx.answer_callback(None, false).await {
                        log::warn!("Failed to acknowledge callback in chat {}: {}", ctx.chat_id(), e);
                    }
                }
                result.map(|()| Dispatched::Callback)
            }
        }
    }
}
