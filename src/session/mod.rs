//! Per-conversation session records
//!
//! A [`Session`] is plain data: the credential token and the custom tree.
//! Loading and saving go through [`SessionStore`], never through methods on
//! the record itself.

pub mod custom;
mod store;

pub use custom::{CustomTree, UpdateReport};
pub use store::SessionStore;

use serde::{Deserialize, Serialize};

/// One record per conversation
///
/// Serialized as `{"jwtToken": "...", "custom": {...}}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Signed credential bound to this conversation
    #[serde(rename = "jwtToken", default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default)]
    pub custom: CustomTree,
}
