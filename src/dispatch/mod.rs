//! Routing of updates to user handlers
//!
//! Handlers receive a [`Context`] holding the update, the conversation's
//! session and the outbound transport. [`Registry`] picks exactly one
//! handler per update.

mod context;
mod handler;
pub mod predicate;
mod registry;

pub use context::Context;
pub use handler::{handler_fn, Handler};
pub use predicate::Predicate;
pub use registry::{Command, Dispatched, Registry, Resolved, Route};
