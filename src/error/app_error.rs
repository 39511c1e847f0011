use thiserror::Error;

use crate::services::MessengerError;

/// Application-wide error type for the HTTP layer.
///
/// Variants carry enough detail for server-side logs. Only the fixed
/// public message of each variant ever reaches the caller.
#[derive(Error, Debug)]
pub enum AppError {
    /// Request could not be accepted as sent
    #[error("Bad request: {message}")]
    BadRequest { message: String },

    /// The selected messenger failed to deliver the message
    #[error("Delivery through {provider} failed")]
    Delivery {
        provider: String,
        #[source]
        source: MessengerError,
    },
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        AppError::BadRequest {
            message: message.into(),
        }
    }

    pub fn delivery(provider: impl Into<String>, source: MessengerError) -> Self {
        AppError::Delivery {
            provider: provider.into(),
            source,
        }
    }

    /// Message safe to return to the caller
    pub fn public_message(&self) -> &str {
        match self {
            AppError::BadRequest { message } => message,
            AppError::Delivery { .. } => "error sending message",
        }
    }
}

/// Type alias for Result with AppError to simplify function signatures
pub type AppResult<T> = Result<T, AppError>;
