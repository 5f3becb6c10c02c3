//! Admin approval: users must be promoted by an admin before using the bot
//!
//! Status is kept per `(bot, user)` in its own hash, separate from sessions,
//! so approval survives session loss. Configured admin ids always resolve to
//! [`ApprovalStatus::Admin`].

mod action;
mod gate;
mod store;

pub use action::{ActionParseError, AdminAction, ADMIN_ACTION_PREFIX};
pub use gate::{access_request, Admission, ApprovalGate};
pub use store::ApprovalStore;

/// Reply sent to users whose access is not approved yet
pub const PENDING_NOTICE: &str = "Your approval is pending. Please wait for an admin to approve your access.";
pub const APPROVED_NOTICE: &str = "You have been approved by an admin. You can now use the bot.";
pub const DENIED_NOTICE: &str = "Your request was denied by an admin.";
pub const NOT_ADMIN_NOTICE: &str = "Only admins can approve/deny requests.";
pub const UNKNOWN_ACTION_NOTICE: &str = "Unknown admin action.";

/// Stored access level of a user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumString, strum::AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum ApprovalStatus {
    Pending,
    Member,
    Admin,
}

impl ApprovalStatus {
    /// Whether this status lets updates through the gate
    pub fn is_allowed(&self) -> bool {
        matches!(self, ApprovalStatus::Member | ApprovalStatus::Admin)
    }
}
