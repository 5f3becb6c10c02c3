//! Update builders, stores and a ready-made bot harness

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use mangibot::core::error::AppResult;
use mangibot::core::types::{BotIdentity, ChatId, InboundUpdate, Payload, Sender};
use mangibot::core::FeatureSet;
use mangibot::pipeline::{Bot, BotBuilder};
use mangibot::storage::{KvStore, MemoryStore};

use super::recorder::RecordingTransport;

pub const BOT_USERNAME: &str = "test_bot";

static CALLBACK_SEQ: AtomicU64 = AtomicU64::new(1);

pub fn user(id: u64) -> Sender {
    Sender::new(id, format!("User{}", id)).with_username(format!("user{}", id))
}

/// Private text message from `user_id`
pub fn text(user_id: u64, body: &str) -> InboundUpdate {
    InboundUpdate::private_text(user(user_id), 1, body)
}

/// Private button press from `user_id` with a fresh callback id
pub fn press(user_id: u64, data: &str) -> InboundUpdate {
    let id = CALLBACK_SEQ.fetch_add(1, Ordering::SeqCst);
    InboundUpdate::private_callback(user(user_id), format!("cb-{}", id), data)
}

/// Button press on message `message_id` of the actor's private chat
pub fn press_on(user_id: u64, data: &str, message_id: i32) -> InboundUpdate {
    let mut update = press(user_id, data);
    if let Payload::Callback { message_id: slot, .. } = &mut update.payload {
        *slot = Some(message_id);
    }
    update
}

pub fn callback_id(update: &InboundUpdate) -> String {
    update.callback_id().unwrap_or_default().to_string()
}

pub fn chat(user_id: u64) -> ChatId {
    ChatId(user_id as i64)
}

/// Memory store that can be switched to fail reads or writes
#[derive(Default)]
pub struct FlakyStore {
    inner: MemoryStore,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl FlakyStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn unavailable() -> mangibot::AppError {
        redis::RedisError::from((redis::ErrorKind::IoError, "store unavailable")).into()
    }
}

#[async_trait]
impl KvStore for FlakyStore {
    async fn read(&self, key: &str) -> AppResult<Option<String>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(Self::unavailable());
        }
        self.inner.read(key).await
    }

    async fn write(&self, key: &str, value: &str) -> AppResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Self::unavailable());
        }
        self.inner.write(key, value).await
    }

    async fn hget(&self, key: &str, field: &str) -> AppResult<Option<String>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(Self::unavailable());
        }
        self.inner.hget(key, field).await
    }

    async fn hset(&self, key: &str, field: &str, value: &str) -> AppResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Self::unavailable());
        }
        self.inner.hset(key, field, value).await
    }
}

/// Store, transport and builder wired together
pub struct Harness {
    pub kv: Arc<dyn KvStore>,
    pub transport: Arc<RecordingTransport>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_store(Arc::new(MemoryStore::new()))
    }

    pub fn with_store(kv: Arc<dyn KvStore>) -> Self {
        Self {
            kv,
            transport: RecordingTransport::new(),
        }
    }

    pub fn builder(&self, features: FeatureSet) -> BotBuilder {
        BotBuilder::new(
            BotIdentity::new(BOT_USERNAME),
            self.kv.clone(),
            self.transport.clone(),
            features,
        )
    }

    pub async fn session_json(&self, chat: ChatId) -> Option<serde_json::Value> {
        let key = format!("bot:{}:session:{}", BOT_USERNAME, chat.0);
        let raw = self.kv.read(&key).await.unwrap()?;
        Some(serde_json::from_str(&raw).unwrap())
    }

    pub async fn status(&self, user_id: u64) -> Option<String> {
        let key = format!("bot:{}:user_status", BOT_USERNAME);
        self.kv.hget(&key, &user_id.to_string()).await.unwrap()
    }
}

/// Processes `updates` one after another, waiting for each
pub async fn run_all(bot: &Bot, updates: impl IntoIterator<Item = InboundUpdate>) {
    for update in updates {
        bot.handle(update).await;
    }
}
