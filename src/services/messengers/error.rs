//! Error types shared by all messengers.

use thiserror::Error;

use super::message::AttribError;

/// Boxed error for failures raised by the signing library.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors raised while building a messenger or pushing a message through it.
#[derive(Debug, Error)]
pub enum MessengerError {
    /// A required configuration value is missing or malformed
    #[error("invalid {field}: {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    /// The provider configuration block could not be decoded
    #[error("failed to decode {provider} config")]
    ConfigDecode {
        provider: String,
        #[source]
        source: serde_json::Error,
    },

    /// A configured messenger name has no adapter
    #[error("unknown messenger: {0}")]
    UnknownMessenger(String),

    /// A configured messenger name has no `[messenger.<name>]` block
    #[error("missing configuration for messenger: {0}")]
    MissingConfig(String),

    /// A subscriber attribute needed by the channel is absent or mistyped
    #[error("could not read subscriber attribute")]
    Attribute(#[from] AttribError),

    /// No usable sender address on the message or campaign
    #[error("could not find sender address")]
    MissingSender,

    /// A sender or recipient address did not parse
    #[error("invalid email address")]
    Address(#[from] lettre::address::AddressError),

    /// The MIME message could not be assembled
    #[error("failed to build email")]
    Email(#[from] lettre::error::Error),

    /// A message header name is not valid ASCII
    #[error("invalid header name: {0}")]
    HeaderName(String),

    /// The provider request body could not be encoded
    #[error("failed to encode request")]
    Encode(#[source] serde_json::Error),

    /// Request signing failed
    #[error("failed to sign request")]
    Signing(#[source] BoxError),

    /// Credentials could not be resolved
    #[error("failed to resolve credentials")]
    Credentials(#[from] aws_credential_types::provider::error::CredentialsError),

    /// The HTTP exchange with the provider failed
    #[error("{provider} request failed")]
    Transport {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// The provider answered with a non-success status
    #[error("{provider} rejected the request with status {status}: {body}")]
    Rejected {
        provider: &'static str,
        status: u16,
        body: String,
    },
}

impl MessengerError {
    /// Create a new configuration error
    pub fn invalid_config(field: &'static str, reason: impl Into<String>) -> Self {
        MessengerError::InvalidConfig {
            field,
            reason: reason.into(),
        }
    }

    /// Wrap a transport error for the named provider
    pub fn transport(provider: &'static str, source: reqwest::Error) -> Self {
        MessengerError::Transport { provider, source }
    }
}
