use std::sync::Arc;

use tokio::sync::oneshot;

use super::{ApprovalStage, Pipeline, Stage, TokenStage};
use crate::approval::{ApprovalGate, ApprovalStore};
use crate::auth::TokenGate;
use crate::core::config::{AuthMode, FeatureSet};
use crate::core::types::{BotIdentity, ConversationId, InboundUpdate};
use crate::dispatch::{Command, Handler, Registry, Route};
use crate::sequencer::UpdateSequencer;
use crate::session::SessionStore;
use crate::storage::KvStore;
use crate::transport::{dedupe_menu, CommandMenuEntry, Transport};

/// Collects registrations and assembles a [`Bot`]
///
/// ```no_run
/// # use std::sync::Arc;
/// use mangibot::core::{BotIdentity, FeatureSet};
/// use mangibot::dispatch::{handler_fn, predicate, Command};
/// use mangibot::pipeline::BotBuilder;
/// # fn demo(kv: Arc<dyn mangibot::storage::KvStore>, transport: Arc<dyn mangibot::transport::Transport>) {
/// let bot = BotBuilder::new(BotIdentity::new("mangi_bot"), kv, transport, FeatureSet::default())
///     .command(Command::new("start").reply("Welcome!"))
///     .on_message(
///         predicate::text_contains("hello"),
///         handler_fn(|ctx| Box::pin(async move {
///             ctx.reply("Hi there").await?;
///             Ok(())
///         })),
///     )
///     .build();
/// # }
/// ```
pub struct BotBuilder {
    identity: BotIdentity,
    kv: Arc<dyn KvStore>,
    transport: Arc<dyn Transport>,
    features: FeatureSet,
    registry: Registry,
    menu: Option<Vec<CommandMenuEntry>>,
}

impl BotBuilder {
    pub fn new(
        identity: BotIdentity,
        kv: Arc<dyn KvStore>,
        transport: Arc<dyn Transport>,
        features: FeatureSet,
    ) -> Self {
        let registry = Registry::new(identity.clone(), features.token_auth_enabled());
        Self {
            identity,
            kv,
            transport,
            features,
            registry,
            menu: None,
        }
    }

    pub fn command(mut self, command: Command) -> Self {
        self.registry.register_command(command);
        self
    }

    pub fn on_message<P>(mut self, predicate: P, handler: Arc<dyn Handler>) -> Self
    where
        P: Fn(&InboundUpdate) -> bool + Send + Sync + 'static,
    {
        self.registry.register_message(Route::new(predicate, handler));
        self
    }

    pub fn on_message_with_auth<P>(mut self, predicate: P, handler: Arc<dyn Handler>) -> Self
    where
        P: Fn(&InboundUpdate) -> bool + Send + Sync + 'static,
    {
        self.registry.register_message(Route::new(predicate, handler).with_auth());
        self
    }

    pub fn on_callback<P>(mut self, predicate: P, handler: Arc<dyn Handler>) -> Self
    where
        P: Fn(&InboundUpdate) -> bool + Send + Sync + 'static,
    {
        self.registry.register_callback(Route::new(predicate, handler));
        self
    }

    pub fn on_callback_with_auth<P>(mut self, predicate: P, handler: Arc<dyn Handler>) -> Self
    where
        P: Fn(&InboundUpdate) -> bool + Send + Sync + 'static,
    {
        self.registry.register_callback(Route::new(predicate, handler).with_auth());
        self
    }

    /// Replaces the menu derived from registered commands
    pub fn command_menu(mut self, entries: Vec<CommandMenuEntry>) -> Self {
        self.menu = Some(dedupe_menu(entries));
        self
    }

    pub fn build(self) -> Bot {
        let features = self.features;
        let sessions = SessionStore::new(self.kv.clone(), self.identity.clone());

        let token_gate = match &features.token_secret {
            Some(secret) if features.token_auth_enabled() => {
                Some(Arc::new(TokenGate::new(secret.clone(), features.dev_mode)))
            }
            _ => {
                if features.auth_mode != AuthMode::None {
                    log::error!(
                        "Token authentication is set to '{}' without a usable secret; authentication disabled",
                        features.auth_mode
                    );
                }
                None
            }
        };

        if features.admin_approval && !features.admin_approval_enabled() {
            log::error!("Admin approval is enabled without admin ids; admin approval disabled");
        }

        let mut stages: Vec<Arc<dyn Stage>> = Vec::new();
        if token_gate.is_some() && features.auth_mode == AuthMode::Fully {
            stages.push(Arc::new(TokenStage));
        }
        if features.admin_approval_enabled() {
            let store = ApprovalStore::new(self.kv.clone(), &self.identity);
            let gate = ApprovalGate::new(store, features.admin_ids.clone());
            stages.push(Arc::new(ApprovalStage::new(Arc::new(gate))));
        }

        log::info!(
            "Bot @{} ready: auth={}, admin approval={}, stages=[{}]",
            self.identity,
            if token_gate.is_some() { features.auth_mode } else { AuthMode::None },
            features.admin_approval_enabled(),
            stages.iter().map(|s| s.name()).collect::<Vec<_>>().join(", ")
        );

        let menu = self.menu.unwrap_or_else(|| self.registry.menu());
        let pipeline = Pipeline::new(
            sessions,
            self.transport.clone(),
            stages,
            self.registry,
            token_gate,
            features.dev_mode,
        );

        Bot {
            identity: self.identity,
            pipeline: Arc::new(pipeline),
            sequencer: UpdateSequencer::new(),
            transport: self.transport,
            menu,
        }
    }
}

/// Entry point for inbound updates
#[derive(Clone)]
pub struct Bot {
    identity: BotIdentity,
    pipeline: Arc<Pipeline>,
    sequencer: UpdateSequencer,
    transport: Arc<dyn Transport>,
    menu: Vec<CommandMenuEntry>,
}

impl Bot {
    pub fn identity(&self) -> &BotIdentity {
        &self.identity
    }

    /// Queues `update` behind earlier updates of its conversation. The
    /// receiver resolves once it has been fully processed.
    pub async fn submit(&self, update: InboundUpdate) -> oneshot::Receiver<()> {
        let pipeline = self.pipeline.clone();
        let chat = update.chat_id;
        self.sequencer
            .enqueue(chat, async move { pipeline.process(update).await })
            .await
    }

    /// Submits and waits for completion
    pub async fn handle(&self, update: InboundUpdate) {
        let chat = update.chat_id;
        if self.submit(update).await.await.is_err() {
            log::warn!("Update for chat {} was dropped before completion", chat);
        }
    }

    pub fn command_menu(&self) -> &[CommandMenuEntry] {
        &self.menu
    }

    /// Replaces the menu, keeping the first entry per command
    pub fn set_command_menu(&mut self, entries: Vec<CommandMenuEntry>) {
        self.menu = dedupe_menu(entries);
    }

    /// Sends the menu to the platform; `false` (logged) on failure
    pub async fn publish_command_menu(&self) -> bool {
        if self.menu.is_empty() {
            log::debug!("No commands to publish");
            return true;
        }
        match self.transport.set_command_menu(&self.menu).await {
            Ok(()) => {
                log::info!("Published {} command(s) to the menu", self.menu.len());
                true
            }
            Err(e) => {
                log::error!("Failed to publish command menu: {}", e);
                false
            }
        }
    }

    pub async fn pending_updates(&self, chat: ConversationId) -> usize {
        self.sequencer.pending(chat).await
    }
}
