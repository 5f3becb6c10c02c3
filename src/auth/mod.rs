//! Token authentication: a signed credential bound to one conversation

mod gate;
pub mod token;

pub use gate::{Rejection, TokenGate, TokenVerdict};
pub use token::{sign, verify, CredentialPayload, TokenError};
