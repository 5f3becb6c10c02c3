use std::sync::Arc;

use async_trait::async_trait;

use crate::approval::{AdminAction, ApprovalGate, PENDING_NOTICE};
use crate::auth::TokenVerdict;
use crate::core::error::AppResult;
use crate::dispatch::Context;
use crate::transport::OutgoingMessage;

/// What the driver does after a stage ran
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageOutcome {
    Continue,
    /// Stop here, optionally replying to the conversation first
    ShortCircuit(Option<OutgoingMessage>),
}

/// One step run before dispatch
#[async_trait]
pub trait Stage: Send + Sync {
    fn name(&self) -> &'static str;

    async fn run(&self, ctx: &mut Context) -> AppResult<StageOutcome>;
}

/// Vets the session token for every private update
pub struct TokenStage;

#[async_trait]
impl Stage for TokenStage {
    fn name(&self) -> &'static str {
        "token"
    }

    async fn run(&self, ctx: &mut Context) -> AppResult<StageOutcome> {
        if let TokenVerdict::Reissued(rejection) = ctx.ensure_token().await? {
            log::info!("Replaced token for chat {}: {:?}", ctx.chat_id(), rejection);
        }
        Ok(StageOutcome::Continue)
    }
}

/// Blocks users an admin has not approved, and handles approve/deny presses
pub struct ApprovalStage {
    gate: Arc<ApprovalGate>,
}

impl ApprovalStage {
    pub fn new(gate: Arc<ApprovalGate>) -> Self {
        Self { gate }
    }
}

#[async_trait]
impl Stage for ApprovalStage {
    fn name(&self) -> &'static str {
        "approval"
    }

    async fn run(&self, ctx: &mut Context) -> AppResult<StageOutcome> {
        if ctx.update().callback_data().is_some_and(AdminAction::is_admin_action) {
            self.gate.handle_action(ctx.update(), ctx.transport()).await?;
            return Ok(StageOutcome::ShortCircuit(None));
        }

        let admission = self.gate.admit(ctx.update(), ctx.transport()).await?;
        if admission.is_blocked() {
            return Ok(StageOutcome::ShortCircuit(Some(OutgoingMessage::text(PENDING_NOTICE))));
        }
        Ok(StageOutcome::Continue)
    }
}
