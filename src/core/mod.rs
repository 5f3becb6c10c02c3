//! Core utilities: configuration, errors, logging and the shared update model

pub mod config;
pub mod error;
pub mod logging;
pub mod types;

// Re-exports for convenience
pub use config::{AuthMode, BotConfig, DeliveryMode, FeatureSet};
pub use error::{AppError, AppResult, HandlerError, HandlerResult};
pub use logging::init_logger;
pub use types::{BotIdentity, ChatId, ChatKind, ConversationId, EventKind, InboundUpdate, Payload, Sender, UserId};
