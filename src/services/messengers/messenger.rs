//! Core messenger trait.
//!
//! A messenger delivers one [`Message`] through one external channel.
//! Adapters are built once at startup and shared read-only between requests.

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use super::error::MessengerError;
use super::message::Message;

/// Trait for delivery channels (SMS gateways, transactional email, ...)
///
/// Uses `async_trait` to support async methods with dynamic dispatch.
/// All messengers must be Send + Sync so the registry can be shared
/// across concurrent requests.
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Stable provider identifier used in logs
    fn name(&self) -> &'static str;

    /// Submit the message through the underlying channel.
    ///
    /// Errors are returned as-is. Nothing is retried.
    async fn push(&self, message: &Message) -> Result<(), MessengerError>;

    /// Flush buffered messages. A no-op for request/response providers.
    async fn flush(&self) -> Result<(), MessengerError> {
        Ok(())
    }

    /// Release held resources. A no-op for request/response providers.
    async fn close(&self) -> Result<(), MessengerError> {
        Ok(())
    }
}

/// Turn a non-2xx provider response into [`MessengerError::Rejected`].
pub(crate) async fn ensure_success(
    provider: &'static str,
    response: reqwest::Response,
) -> Result<reqwest::Response, MessengerError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(MessengerError::Rejected {
        provider,
        status: status.as_u16(),
        body,
    })
}

/// Decode the body of an accepted request. The message is already
/// delivered, so an unreadable body only costs the log details.
pub(crate) async fn read_receipt<T>(provider: &'static str, response: reqwest::Response) -> T
where
    T: DeserializeOwned + Default,
{
    match response.json().await {
        Ok(receipt) => receipt,
        Err(e) => {
            tracing::debug!(provider, error = %e, "Could not decode provider response");
            T::default()
        }
    }
}
