//! Common test utilities
//!
//! This module is shared across all integration tests

pub mod fixtures;
pub mod recorder;

#[allow(unused_imports)]
pub use fixtures::{callback_id, chat, press, press_on, run_all, text, user, FlakyStore, Harness, BOT_USERNAME};
#[allow(unused_imports)]
pub use recorder::{RecordingTransport, TransportCall};
