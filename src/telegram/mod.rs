//! Telegram integration via teloxide

mod adapter;
pub mod convert;
mod runner;

pub use adapter::TeloxideTransport;
pub use convert::inbound_update;
pub use runner::{run_polling, run_webhook};
