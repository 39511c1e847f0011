//! Name-keyed set of messengers built once at startup.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use futures::future::join_all;
use reqwest::Client;

use super::error::MessengerError;
use super::messenger::Messenger;
use super::pinpoint::PinpointMessenger;
use super::ses::SesMessenger;
use super::twilio::TwilioMessenger;

/// Provider names this build knows how to construct.
pub const KNOWN_MESSENGERS: &[&str] = &["pinpoint", "twilio", "ses"];

/// Read-only after startup; shared across requests behind an `Arc`.
#[derive(Clone, Default)]
pub struct MessengerRegistry {
    messengers: HashMap<String, Arc<dyn Messenger>>,
}

impl MessengerRegistry {
    /// Build every enabled messenger from its raw configuration block.
    ///
    /// Any unknown name, missing block or failing constructor aborts the
    /// whole load.
    pub async fn load(
        names: &[String],
        configs: &HashMap<String, Vec<u8>>,
        client: Client,
    ) -> Result<Self, MessengerError> {
        let mut messengers: HashMap<String, Arc<dyn Messenger>> = HashMap::new();

        for name in names {
            let raw = configs
                .get(name)
                .ok_or_else(|| MessengerError::MissingConfig(name.clone()))?;

            let messenger: Arc<dyn Messenger> = match name.as_str() {
                "pinpoint" => Arc::new(PinpointMessenger::new(raw, client.clone())?),
                "twilio" => Arc::new(TwilioMessenger::new(raw, client.clone())?),
                "ses" => Arc::new(SesMessenger::new(raw, client.clone()).await?),
                other => return Err(MessengerError::UnknownMessenger(other.to_string())),
            };

            tracing::info!(messenger = %name, "Messenger initialized");
            messengers.insert(name.clone(), messenger);
        }

        Ok(Self { messengers })
    }

    /// Registry over already-built messengers.
    pub fn from_messengers<I>(messengers: I) -> Self
    where
        I: IntoIterator<Item = (String, Arc<dyn Messenger>)>,
    {
        Self {
            messengers: messengers.into_iter().collect(),
        }
    }

    /// Whether `name` is a messenger this build can construct.
    pub fn is_known(name: &str) -> bool {
        KNOWN_MESSENGERS.contains(&name)
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Messenger>> {
        self.messengers.get(name).cloned()
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.messengers.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.messengers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messengers.is_empty()
    }

    /// Flush then close every messenger. Failures are logged, not returned.
    pub async fn shutdown(&self) {
        let tasks = self.messengers.iter().map(|(name, messenger)| async move {
            if let Err(e) = messenger.flush().await {
                tracing::warn!(messenger = %name, error = %e, "Failed to flush messenger");
            }
            if let Err(e) = messenger.close().await {
                tracing::warn!(messenger = %name, error = %e, "Failed to close messenger");
            }
        });
        join_all(tasks).await;
        tracing::info!(count = self.messengers.len(), "Messengers closed");
    }
}

impl fmt::Debug for MessengerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessengerRegistry")
            .field("messengers", &self.names())
            .finish()
    }
}
