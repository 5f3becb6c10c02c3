//! Mangibot - per-conversation update pipeline for Telegram bots
//!
//! Updates are serialized per chat, run through optional token and admin
//! approval gates, and routed to exactly one registered handler, with a
//! Redis-backed session that handlers read and mutate by dotted path.
//!
//! # Module Structure
//!
//! - `core`: configuration, errors, logging and the shared update model
//! - `storage`: key/value store trait with Redis and in-memory backends
//! - `session`: session records, the custom-field tree and the session store
//! - `auth`: signed conversation tokens and the token gate
//! - `approval`: admin approval state machine
//! - `sequencer`: per-conversation FIFO execution
//! - `dispatch`: handler context, predicates and the registry
//! - `pipeline`: gate stages, error boundary and the bot builder
//! - `transport`: outbound platform interface
//! - `telegram`: teloxide adapter and update delivery

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

pub mod approval;
pub mod auth;
pub mod cli;
pub mod core;
pub mod dispatch;
pub mod pipeline;
pub mod sequencer;
pub mod session;
pub mod storage;
pub mod telegram;
pub mod transport;

// Re-export commonly used types for convenience
pub use core::{config, AppError, AppResult, BotConfig, FeatureSet};
pub use dispatch::{handler_fn, Command, Context};
pub use pipeline::{Bot, BotBuilder};
