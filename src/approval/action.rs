use thiserror::Error;

use crate::core::types::UserId;

/// Callback data prefix reserved for approval buttons
pub const ADMIN_ACTION_PREFIX: &str = "adminauth:";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ActionParseError {
    #[error("not an admin action")]
    NotAdminAction,
    #[error("expected adminauth:<action>:<user id>")]
    Malformed,
    #[error("unknown admin action '{0}'")]
    UnknownAction(String),
    #[error("invalid user id '{0}'")]
    InvalidUserId(String),
}

/// Decision an admin takes on an access request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminAction {
    Approve(UserId),
    Deny(UserId),
}

impl AdminAction {
    pub fn target(&self) -> UserId {
        match self {
            AdminAction::Approve(user) | AdminAction::Deny(user) => *user,
        }
    }

    /// Callback data carried by the button, e.g. `adminauth:approve:42`
    pub fn encode(&self) -> String {
        let (verb, user) = match self {
            AdminAction::Approve(user) => ("approve", user),
            AdminAction::Deny(user) => ("deny", user),
        };
        format!("{ADMIN_ACTION_PREFIX}{verb}:{}", user.0)
    }

    pub fn decode(data: &str) -> Result<Self, ActionParseError> {
        let rest = data
            .strip_prefix(ADMIN_ACTION_PREFIX)
            .ok_or(ActionParseError::NotAdminAction)?;
        let (verb, user) = rest.split_once(':').ok_or(ActionParseError::Malformed)?;
        let user = user
            .parse::<u64>()
            .map(UserId)
            .map_err(|_| ActionParseError::InvalidUserId(user.to_string()))?;

        match verb {
            "approve" => Ok(AdminAction::Approve(user)),
            "deny" => Ok(AdminAction::Deny(user)),
            other => Err(ActionParseError::UnknownAction(other.to_string())),
        }
    }

    pub fn is_admin_action(data: &str) -> bool {
        data.starts_with(ADMIN_ACTION_PREFIX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode() {
        assert_eq!(AdminAction::Approve(UserId(42)).encode(), "adminauth:approve:42");
        assert_eq!(AdminAction::Deny(UserId(7)).encode(), "adminauth:deny:7");
    }

    #[test]
    fn test_decode_valid() {
        assert_eq!(
            AdminAction::decode("adminauth:approve:42"),
            Ok(AdminAction::Approve(UserId(42)))
        );
        assert_eq!(AdminAction::decode("adminauth:deny:7").unwrap().target(), UserId(7));
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert_eq!(AdminAction::decode("say_hi"), Err(ActionParseError::NotAdminAction));
        assert_eq!(AdminAction::decode("adminauth:approve"), Err(ActionParseError::Malformed));
        assert_eq!(
            AdminAction::decode("adminauth:ban:5"),
            Err(ActionParseError::UnknownAction("ban".to_string()))
        );
        assert_eq!(
            AdminAction::decode("adminauth:approve:5:6"),
            Err(ActionParseError::InvalidUserId("5:6".to_string()))
        );
        assert_eq!(
            AdminAction::decode("adminauth:deny:-3"),
            Err(ActionParseError::InvalidUserId("-3".to_string()))
        );
    }

    #[test]
    fn test_prefix_check() {
        assert!(AdminAction::is_admin_action("adminauth:whatever"));
        assert!(!AdminAction::is_admin_action("xyz"));
    }
}
