use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;

use futures_util::FutureExt;

use crate::core::error::HandlerResult;
use crate::core::types::{ConversationId, EventKind};
use crate::transport::{OutgoingMessage, Transport};

/// Notice sent to the conversation when processing fails
pub const FAILURE_NOTICE: &str = "Sorry, there was an error processing your request.";

/// Contains failures of one update's processing
///
/// Errors and panics are logged with the event kind and conversation, the
/// conversation gets [`FAILURE_NOTICE`], and the caller always sees normal
/// completion.
pub struct ErrorBoundary;

impl ErrorBoundary {
    /// `true` when `work` completed without error
    pub async fn guard<F>(kind: EventKind, chat: ConversationId, transport: &dyn Transport, work: F) -> bool
    where
        F: Future<Output = HandlerResult> + Send,
    {
        let error = match AssertUnwindSafe(work).catch_unwind().await {
            Ok(Ok(())) => return true,
            Ok(Err(e)) => e,
            Err(panic) => anyhow::anyhow!("handler panicked: {}", panic_message(panic.as_ref())),
        };

        log::error!("Error while handling {} for chat {}: {:#}", kind, chat, error);

        if let Err(e) = transport.send_message(chat, OutgoingMessage::text(FAILURE_NOTICE)).await {
            log::warn!("Failed to send error notice to chat {}: {}", chat, e);
        }
        false
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
