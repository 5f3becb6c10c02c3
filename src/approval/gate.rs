use std::collections::HashSet;

use super::{
    AdminAction, ApprovalStatus, ApprovalStore, APPROVED_NOTICE, DENIED_NOTICE, NOT_ADMIN_NOTICE,
    UNKNOWN_ACTION_NOTICE,
};
use crate::core::error::AppResult;
use crate::core::types::{ChatId, InboundUpdate, Sender, UserId};
use crate::transport::{Button, Keyboard, OutgoingMessage, Transport};

/// Gate decision for one update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Update is not subject to approval (not a private chat)
    Exempt,
    /// Sender may use the bot
    Allowed(ApprovalStatus),
    /// Sender already asked and waits for a decision
    Pending,
    /// First contact: the request was recorded and admins were notified
    Requested,
}

impl Admission {
    pub fn is_blocked(&self) -> bool {
        matches!(self, Admission::Pending | Admission::Requested)
    }
}

/// Applies the approval state machine and handles admin decisions
pub struct ApprovalGate {
    store: ApprovalStore,
    admins: HashSet<UserId>,
}

impl ApprovalGate {
    pub fn new(store: ApprovalStore, admins: HashSet<UserId>) -> Self {
        Self { store, admins }
    }

    pub fn is_admin(&self, user: UserId) -> bool {
        self.admins.contains(&user)
    }

    /// Resolves the sender's status, recording first-contact requests.
    ///
    /// Configured admins are written as `admin` on every pass. Unknown users
    /// become `pending` and every admin gets one request notification.
    pub async fn admit(&self, update: &InboundUpdate, transport: &dyn Transport) -> AppResult<Admission> {
        if !update.is_private() {
            return Ok(Admission::Exempt);
        }

        let user = update.sender.id;
        if self.is_admin(user) {
            self.store.set(user, ApprovalStatus::Admin).await?;
            return Ok(Admission::Allowed(ApprovalStatus::Admin));
        }

        match self.store.get(user).await? {
            Some(status) if status.is_allowed() => Ok(Admission::Allowed(status)),
            Some(_) => Ok(Admission::Pending),
            None => {
                self.store.set(user, ApprovalStatus::Pending).await?;
                log::info!("User {} requested access, notifying {} admin(s)", user, self.admins.len());
                self.notify_admins(&update.sender, transport).await;
                Ok(Admission::Requested)
            }
        }
    }

    async fn notify_admins(&self, requester: &Sender, transport: &dyn Transport) {
        let message = access_request(requester);
        for admin in &self.admins {
            if let Err(e) = transport.send_message(ChatId::from(*admin), message.clone()).await {
                log::warn!("Failed to notify admin {} about user {}: {}", admin, requester.id, e);
            }
        }
    }

    /// Handles a press of an approval button.
    ///
    /// Only configured admins may decide; anyone else gets an alert and
    /// nothing changes. Approving a configured admin leaves their stored
    /// status alone.
    pub async fn handle_action(&self, update: &InboundUpdate, transport: &dyn Transport) -> AppResult<()> {
        let (Some(callback_id), Some(data)) = (update.callback_id(), update.callback_data()) else {
            return Ok(());
        };

        let actor = update.sender.id;
        if !self.is_admin(actor) {
            log::warn!("User {} tried an admin action without being an admin", actor);
            return transport.answer_callback(callback_id, Some(NOT_ADMIN_NOTICE), true).await;
        }

        let action = match AdminAction::decode(data) {
            Ok(action) => action,
            Err(e) => {
                log::warn!("Rejected admin action '{}' from {}: {}", data, actor, e);
                return transport
                    .answer_callback(callback_id, Some(UNKNOWN_ACTION_NOTICE), true)
                    .await;
            }
        };

        let target = action.target();
        let (status, notice, outcome) = match action {
            AdminAction::Approve(_) => (ApprovalStatus::Member, APPROVED_NOTICE, "User approved."),
            AdminAction::Deny(_) => (ApprovalStatus::Pending, DENIED_NOTICE, "User denied."),
        };

        if self.is_admin(target) {
            log::debug!("User {} is a configured admin, status left unchanged", target);
        } else {
            self.store.set(target, status).await?;
        }
        log::info!("Admin {} set user {} to {}", actor, target, status);

        if let Err(e) = transport
            .send_message(ChatId::from(target), OutgoingMessage::text(notice))
            .await
        {
            log::warn!("Failed to tell user {} about the decision: {}", target, e);
        }

        if let Some(message_id) = update.message_id() {
            if let Err(e) = transport.edit_message_text(update.chat_id, message_id, outcome).await {
                log::warn!("Failed to update the request message for user {}: {}", target, e);
            }
        }

        transport.answer_callback(callback_id, Some(outcome), false).await
    }
}

/// Notification sent to each admin when a new user asks for access
pub fn access_request(requester: &Sender) -> OutgoingMessage {
    let user = requester.id;
    OutgoingMessage::html(format!(
        "User <code>{}</code> (@{}) requests access.",
        user.0,
        requester.handle()
    ))
    .with_keyboard(Keyboard::single_row(vec![
        Button::callback("Approve", AdminAction::Approve(user).encode()),
        Button::callback("Deny", AdminAction::Deny(user).encode()),
    ]))
}
