//! SMS messenger backed by the AWS Pinpoint `SendMessages` API.

use std::collections::HashMap;
use std::time::Instant;

use async_trait::async_trait;
use reqwest::{Client, Method};
use serde::{Deserialize, Serialize};

use super::aws::AwsSigner;
use super::error::MessengerError;
use super::message::{Message, redact_phone};
use super::messenger::{Messenger, ensure_success, read_receipt};

const NAME: &str = "pinpoint";
const SIGNING_SERVICE: &str = "mobiletargeting";
const CHANNEL_TYPE: &str = "SMS";
const PHONE_ATTRIBUTE: &str = "phone";
const MESSAGE_TYPES: &[&str] = &["TRANSACTIONAL", "PROMOTIONAL"];

/// `[messenger.pinpoint]` configuration block
#[derive(Clone, Deserialize)]
pub struct PinpointConfig {
    /// Application id; TOML may carry it as a bare integer
    #[serde(default, deserialize_with = "super::de::string_or_number")]
    pub app_id: String,
    #[serde(default)]
    pub access_key: String,
    #[serde(default)]
    pub secret_key: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub message_type: String,
    #[serde(default)]
    pub sender_id: String,
    #[serde(default, deserialize_with = "super::de::flag")]
    pub log: bool,
    /// Override for the regional API endpoint
    #[serde(default)]
    pub endpoint: Option<String>,
}

impl PinpointConfig {
    fn validate(&mut self) -> Result<(), MessengerError> {
        require("app_id", &self.app_id)?;
        require("region", &self.region)?;
        require("access_key", &self.access_key)?;
        require("secret_key", &self.secret_key)?;
        require("sender_id", &self.sender_id)?;

        let message_type = self.message_type.trim().to_ascii_uppercase();
        if !MESSAGE_TYPES.contains(&message_type.as_str()) {
            return Err(MessengerError::invalid_config(
                "message_type",
                format!("must be one of {}", MESSAGE_TYPES.join(", ")),
            ));
        }
        self.message_type = message_type;

        Ok(())
    }

    fn messages_url(&self) -> String {
        let base = self
            .endpoint
            .clone()
            .unwrap_or_else(|| format!("https://pinpoint.{}.amazonaws.com", self.region));
        format!(
            "{}/v1/apps/{}/messages",
            base.trim_end_matches('/'),
            self.app_id
        )
    }
}

fn require(field: &'static str, value: &str) -> Result<(), MessengerError> {
    if value.trim().is_empty() {
        return Err(MessengerError::invalid_config(field, "must not be empty"));
    }
    Ok(())
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct MessageRequest<'a> {
    addresses: HashMap<&'a str, AddressConfiguration>,
    message_configuration: DirectMessageConfiguration<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct AddressConfiguration {
    channel_type: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct DirectMessageConfiguration<'a> {
    #[serde(rename = "SMSMessage")]
    sms_message: SmsMessage<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct SmsMessage<'a> {
    body: String,
    message_type: &'a str,
    sender_id: &'a str,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct MessageResponse {
    #[serde(default)]
    result: HashMap<String, MessageResult>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct MessageResult {
    delivery_status: Option<String>,
    status_code: Option<u16>,
    status_message: Option<String>,
    message_id: Option<String>,
}

/// SMS-A: sends one SMS per message through Pinpoint.
pub struct PinpointMessenger {
    config: PinpointConfig,
    signer: AwsSigner,
    client: Client,
    url: String,
}

impl PinpointMessenger {
    /// Decode and validate the raw configuration block.
    pub fn new(raw_config: &[u8], client: Client) -> Result<Self, MessengerError> {
        let mut config: PinpointConfig =
            serde_json::from_slice(raw_config).map_err(|source| MessengerError::ConfigDecode {
                provider: NAME.to_string(),
                source,
            })?;
        config.validate()?;

        let signer = AwsSigner::with_static_keys(
            SIGNING_SERVICE,
            config.region.clone(),
            &config.access_key,
            &config.secret_key,
        );
        let url = config.messages_url();

        Ok(Self {
            config,
            signer,
            client,
            url,
        })
    }
}

#[async_trait]
impl Messenger for PinpointMessenger {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn push(&self, message: &Message) -> Result<(), MessengerError> {
        let phone = message.subscriber.attribs.get_str(PHONE_ATTRIBUTE)?;
        let start = Instant::now();

        let payload = MessageRequest {
            addresses: HashMap::from([(
                phone,
                AddressConfiguration {
                    channel_type: CHANNEL_TYPE,
                },
            )]),
            message_configuration: DirectMessageConfiguration {
                sms_message: SmsMessage {
                    body: message.body_text(),
                    message_type: &self.config.message_type,
                    sender_id: &self.config.sender_id,
                },
            },
        };
        let body = serde_json::to_vec(&payload).map_err(MessengerError::Encode)?;

        let response = self
            .signer
            .request(&self.client, Method::POST, &self.url, body)
            .await?
            .send()
            .await
            .map_err(|e| MessengerError::transport(NAME, e))?;
        let response = ensure_success(NAME, response).await?;

        let outcome: MessageResponse = read_receipt(NAME, response).await;
        let duration_ms = start.elapsed().as_millis() as u64;

        for (address, result) in &outcome.result {
            let delivered = result.delivery_status.as_deref() == Some("SUCCESSFUL");
            if !delivered {
                tracing::warn!(
                    provider = NAME,
                    phone = %redact_phone(address),
                    delivery_status = ?result.delivery_status,
                    status_code = ?result.status_code,
                    status_message = ?result.status_message,
                    "SMS not accepted for delivery"
                );
            } else if self.config.log {
                tracing::info!(
                    provider = NAME,
                    phone = %redact_phone(address),
                    message_id = ?result.message_id,
                    duration_ms,
                    "Successfully sent SMS"
                );
            }
        }

        Ok(())
    }
}
