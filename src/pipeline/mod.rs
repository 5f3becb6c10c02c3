//! Per-update processing: session load, gate stages, dispatch, session save

mod boundary;
mod bot;
mod stage;

pub use boundary::{ErrorBoundary, FAILURE_NOTICE};
pub use bot::{Bot, BotBuilder};
pub use stage::{ApprovalStage, Stage, StageOutcome, TokenStage};

use std::sync::Arc;
use std::time::Instant;

use crate::auth::TokenGate;
use crate::core::error::HandlerResult;
use crate::core::types::InboundUpdate;
use crate::dispatch::{Context, Registry};
use crate::session::{Session, SessionStore};
use crate::transport::Transport;

/// Runs one update end to end. Callers serialize per conversation.
pub struct Pipeline {
    sessions: SessionStore,
    transport: Arc<dyn Transport>,
    stages: Vec<Arc<dyn Stage>>,
    registry: Registry,
    token_gate: Option<Arc<TokenGate>>,
    dev_mode: bool,
}

impl Pipeline {
    pub fn new(
        sessions: SessionStore,
        transport: Arc<dyn Transport>,
        stages: Vec<Arc<dyn Stage>>,
        registry: Registry,
        token_gate: Option<Arc<TokenGate>>,
        dev_mode: bool,
    ) -> Self {
        Self {
            sessions,
            transport,
            stages,
            registry,
            token_gate,
            dev_mode,
        }
    }

    /// Never fails: errors end at the [`ErrorBoundary`] and persistence
    /// problems are logged.
    pub async fn process(&self, update: InboundUpdate) {
        let started = Instant::now();
        let chat = update.chat_id;
        let kind = update.kind();

        let (session, readable) = match self.sessions.load(chat).await {
            Ok(session) => (session, true),
            Err(e) => {
                log::error!("Failed to load session for chat {}, using a blank one: {}", chat, e);
                (Session::default(), false)
            }
        };

        let mut ctx = Context::new(update, session, self.transport.clone(), self.sessions.clone())
            .with_token_gate(self.token_gate.clone());
        if !readable {
            ctx.disable_persistence();
        }

        let completed = ErrorBoundary::guard(kind, chat, self.transport.as_ref(), self.run(&mut ctx)).await;

        if let Err(e) = ctx.save().await {
            log::error!("Failed to save session for chat {}: {}", chat, e);
        }

        if self.dev_mode {
            log::debug!(
                "Processed {} for chat {} in {:?} (ok: {})",
                kind,
                chat,
                started.elapsed(),
                completed
            );
        }
    }

    async fn run(&self, ctx: &mut Context) -> HandlerResult {
        for stage in &self.stages {
            match stage.run(ctx).await? {
                StageOutcome::Continue => {}
                StageOutcome::ShortCircuit(reply) => {
                    log::debug!("Stage '{}' stopped update for chat {}", stage.name(), ctx.chat_id());
                    if let Some(reply) = reply {
                        ctx.reply_with(reply).await?;
                    }
                    return Ok(());
                }
            }
        }

        let dispatched = self.registry.dispatch(ctx).await?;
        if self.dev_mode {
            log::debug!("Dispatched {:?} for chat {}", dispatched, ctx.chat_id());
        }
        Ok(())
    }
}
