use std::str::FromStr;
use std::sync::Arc;

use super::ApprovalStatus;
use crate::core::error::AppResult;
use crate::core::types::{BotIdentity, UserId};
use crate::storage::KvStore;

/// Approval status hash `bot:<bot>:user_status`, one field per user id
#[derive(Clone)]
pub struct ApprovalStore {
    kv: Arc<dyn KvStore>,
    key: String,
}

impl ApprovalStore {
    pub fn new(kv: Arc<dyn KvStore>, bot: &BotIdentity) -> Self {
        Self {
            kv,
            key: format!("bot:{}:user_status", bot),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// `None` for users never seen before, and for unrecognized stored
    /// values so they go through the new-user path again
    pub async fn get(&self, user: UserId) -> AppResult<Option<ApprovalStatus>> {
        let Some(raw) = self.kv.hget(&self.key, &user.0.to_string()).await? else {
            return Ok(None);
        };
        match ApprovalStatus::from_str(&raw) {
            Ok(status) => Ok(Some(status)),
            Err(_) => {
                log::warn!("Unknown approval status '{}' for user {}, treating as new", raw, user.0);
                Ok(None)
            }
        }
    }

    pub async fn set(&self, user: UserId, status: ApprovalStatus) -> AppResult<()> {
        self.kv.hset(&self.key, &user.0.to_string(), status.as_ref()).await
    }
}
