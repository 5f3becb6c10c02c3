use thiserror::Error;

use crate::auth::TokenError;

/// Centralized error types for the bot core
///
/// Store, codec and transport failures are all converted to this enum so the
/// pipeline can log them uniformly. Uses `thiserror` for automatic error
/// conversion and display formatting.
///
/// # Example
///
/// ```no_run
/// use mangibot::core::error::AppError;
///
/// fn handle_error(err: AppError) {
///     log::error!("Error: {}", err);
/// }
/// ```
#[derive(Error, Debug)]
pub enum AppError {
    /// Key/value store errors
    #[error("Store error: {0}")]
    Store(#[from] redis::RedisError),

    /// JSON (de)serialization of persisted records
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Credential token errors
    #[error("Token error: {0}")]
    Token(#[from] TokenError),

    /// Telegram API errors
    #[error("Telegram error: {0}")]
    Telegram(#[from] teloxide::RequestError),

    /// Configuration loading errors
    #[error("Configuration error: {0}")]
    Config(#[from] Box<figment::Error>),

    /// Transport errors that do not come from the Telegram API itself
    #[error("Transport error: {0}")]
    Transport(String),

    /// Errors raised by user-registered handlers
    #[error("Handler error: {0}")]
    Handler(#[from] anyhow::Error),
}

impl From<figment::Error> for AppError {
    fn from(err: figment::Error) -> Self {
        AppError::Config(Box::new(err))
    }
}

/// Type alias for Result with AppError
pub type AppResult<T> = Result<T, AppError>;

/// Error type returned by user handlers
pub type HandlerError = anyhow::Error;

/// Result type returned by user handlers
pub type HandlerResult = Result<(), HandlerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handler_error_converts() {
        let err: AppError = anyhow::anyhow!("boom").into();
        assert!(matches!(err, AppError::Handler(_)));
        assert_eq!(err.to_string(), "Handler error: boom");
    }
}
