//! SMS/MMS messenger backed by the Twilio Messages API.

use std::time::Instant;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;

use super::error::MessengerError;
use super::message::{Message, redact_phone};
use super::messenger::{Messenger, ensure_success, read_receipt};

const NAME: &str = "twilio";
const DEFAULT_API_BASE: &str = "https://api.twilio.com";
const PHONE_ATTRIBUTE: &str = "phone";

/// `[messenger.twilio]` configuration block
#[derive(Clone, Deserialize)]
pub struct TwilioConfig {
    #[serde(default)]
    pub account_id: String,
    #[serde(default)]
    pub auth_token: String,
    #[serde(default)]
    pub sender_id: String,
    /// Public base URL under which attachments are already hosted
    #[serde(default)]
    pub upload_path: String,
    #[serde(default, deserialize_with = "super::de::flag")]
    pub log: bool,
    #[serde(default)]
    pub api_base: Option<String>,
}

impl TwilioConfig {
    /// Returns the parsed upload base URL.
    fn validate(&self) -> Result<Url, MessengerError> {
        for (field, value) in [
            ("account_id", &self.account_id),
            ("auth_token", &self.auth_token),
            ("sender_id", &self.sender_id),
            ("upload_path", &self.upload_path),
        ] {
            if value.trim().is_empty() {
                return Err(MessengerError::invalid_config(field, "must not be empty"));
            }
        }

        let upload = Url::parse(&self.upload_path).map_err(|e| {
            MessengerError::invalid_config("upload_path", format!("not a URL: {e}"))
        })?;
        if !matches!(upload.scheme(), "http" | "https") {
            return Err(MessengerError::invalid_config(
                "upload_path",
                "must be an http or https URL",
            ));
        }

        Ok(upload)
    }
}

#[derive(Debug, Default, Deserialize)]
struct MessageResource {
    sid: Option<String>,
    status: Option<String>,
}

/// SMS-B: sends one message per push, with attachments as media URLs.
pub struct TwilioMessenger {
    config: TwilioConfig,
    client: Client,
    url: String,
    upload_base: Url,
}

impl TwilioMessenger {
    /// Decode and validate the raw configuration block.
    pub fn new(raw_config: &[u8], client: Client) -> Result<Self, MessengerError> {
        let config: TwilioConfig =
            serde_json::from_slice(raw_config).map_err(|source| MessengerError::ConfigDecode {
                provider: NAME.to_string(),
                source,
            })?;
        let upload_base = config.validate()?;

        let base = config.api_base.as_deref().unwrap_or(DEFAULT_API_BASE);
        let url = format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            base.trim_end_matches('/'),
            config.account_id
        );

        Ok(Self {
            config,
            client,
            url,
            upload_base,
        })
    }

    /// Public URL of an attachment that was uploaded ahead of time.
    /// The name becomes a single percent-encoded path segment.
    fn media_url(&self, name: &str) -> String {
        let mut url = self.upload_base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(name);
        }
        url.to_string()
    }

    fn form(&self, phone: &str, message: &Message) -> Vec<(&'static str, String)> {
        let mut form = vec![
            ("To", phone.to_string()),
            ("From", self.config.sender_id.clone()),
            ("Body", message.body_text()),
        ];
        form.extend(
            message
                .attachments
                .iter()
                .map(|attachment| ("MediaUrl", self.media_url(&attachment.name))),
        );
        form
    }
}

#[async_trait]
impl Messenger for TwilioMessenger {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn push(&self, message: &Message) -> Result<(), MessengerError> {
        let phone = message.subscriber.attribs.get_str(PHONE_ATTRIBUTE)?;
        let start = Instant::now();

        let response = self
            .client
            .post(&self.url)
            .basic_auth(&self.config.account_id, Some(&self.config.auth_token))
            .form(&self.form(phone, message))
            .send()
            .await
            .map_err(|e| MessengerError::transport(NAME, e))?;
        let response = ensure_success(NAME, response).await?;

        if self.config.log {
            let resource: MessageResource = read_receipt(NAME, response).await;
            tracing::info!(
                provider = NAME,
                phone = %redact_phone(phone),
                sid = ?resource.sid,
                status = ?resource.status,
                media = message.attachments.len(),
                duration_ms = start.elapsed().as_millis() as u64,
                "Successfully sent SMS"
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::messengers::message::{Attachment, Attribs, Subscriber};
    use crate::services::messengers::testing::{ProviderStub, test_client};
    use axum::http::StatusCode;
    use serde_json::json;

    fn config_json(api_base: &str) -> Vec<u8> {
        serde_json::to_vec(&json!({
            "account_id": "AC123",
            "auth_token": "token",
            "sender_id": "+15550000000",
            "upload_path": "https://cdn.example.com/uploads/",
            "log": true,
            "api_base": api_base,
        }))
        .unwrap()
    }

    fn message_to(phone: &str, attachments: &[&str]) -> Message {
        let mut attribs = serde_json::Map::new();
        attribs.insert("phone".to_string(), json!(phone));
        Message {
            body: b"Your code is 1234".to_vec(),
            attachments: attachments
                .iter()
                .map(|name| Attachment {
                    name: name.to_string(),
                    ..Default::default()
                })
                .collect(),
            subscriber: Subscriber {
                attribs: Attribs::new(attribs),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_new_requires_every_field() {
        for missing in ["account_id", "auth_token", "sender_id", "upload_path"] {
            let mut raw = json!({
                "account_id": "AC123",
                "auth_token": "token",
                "sender_id": "+15550000000",
                "upload_path": "https://cdn.example.com",
            });
            raw.as_object_mut().unwrap().remove(missing);

            let result = TwilioMessenger::new(&serde_json::to_vec(&raw).unwrap(), test_client());
            match result {
                Err(MessengerError::InvalidConfig { field, .. }) => assert_eq!(field, missing),
                _ => panic!("expected invalid {missing}"),
            }
        }
    }

    #[test]
    fn test_new_rejects_non_http_upload_path() {
        let raw = json!({
            "account_id": "AC123",
            "auth_token": "token",
            "sender_id": "+15550000000",
            "upload_path": "ftp://cdn.example.com",
        });
        let result = TwilioMessenger::new(&serde_json::to_vec(&raw).unwrap(), test_client());
        assert!(matches!(
            result,
            Err(MessengerError::InvalidConfig {
                field: "upload_path",
                ..
            })
        ));
    }

    #[test]
    fn test_media_url_joins_upload_path_and_name() {
        let messenger = TwilioMessenger::new(&config_json(DEFAULT_API_BASE), test_client()).unwrap();
        assert_eq!(
            messenger.media_url("flyer.png"),
            "https://cdn.example.com/uploads/flyer.png"
        );
    }

    #[test]
    fn test_media_url_encodes_the_name() {
        let messenger = TwilioMessenger::new(&config_json(DEFAULT_API_BASE), test_client()).unwrap();
        assert_eq!(
            messenger.media_url("spring flyer#2.png"),
            "https://cdn.example.com/uploads/spring%20flyer%232.png"
        );
        assert_eq!(
            messenger.media_url("../secret"),
            "https://cdn.example.com/uploads/..%2Fsecret"
        );
    }

    #[tokio::test]
    async fn test_push_posts_form_with_basic_auth() {
        let stub =
            ProviderStub::start(StatusCode::CREATED, r#"{"sid":"SM1","status":"queued"}"#).await;
        let messenger = TwilioMessenger::new(&config_json(&stub.base_url), test_client()).unwrap();

        messenger
            .push(&message_to("+15551234567", &["a.png", "b.jpg"]))
            .await
            .unwrap();

        let requests = stub.requests();
        assert_eq!(requests.len(), 1);
        let request = &requests[0];
        assert_eq!(request.path, "/2010-04-01/Accounts/AC123/Messages.json");
        // base64("AC123:token")
        assert_eq!(request.header("authorization"), Some("Basic QUMxMjM6dG9rZW4="));

        let form = request.form();
        let field = |name: &str| -> Vec<String> {
            form.iter()
                .filter(|(k, _)| k == name)
                .map(|(_, v)| v.clone())
                .collect()
        };
        assert_eq!(field("To"), vec!["+15551234567"]);
        assert_eq!(field("From"), vec!["+15550000000"]);
        assert_eq!(field("Body"), vec!["Your code is 1234"]);
        assert_eq!(
            field("MediaUrl"),
            vec![
                "https://cdn.example.com/uploads/a.png",
                "https://cdn.example.com/uploads/b.jpg"
            ]
        );
    }

    #[tokio::test]
    async fn test_push_without_attachments_sends_no_media() {
        let stub = ProviderStub::start(StatusCode::CREATED, "{}").await;
        let messenger = TwilioMessenger::new(&config_json(&stub.base_url), test_client()).unwrap();

        messenger.push(&message_to("+15551234567", &[])).await.unwrap();

        let form = stub.requests()[0].form();
        assert!(form.iter().all(|(k, _)| k != "MediaUrl"));
    }

    #[tokio::test]
    async fn test_push_propagates_rejection() {
        let stub = ProviderStub::start(
            StatusCode::BAD_REQUEST,
            r#"{"code":21211,"message":"Invalid 'To' Phone Number"}"#,
        )
        .await;
        let messenger = TwilioMessenger::new(&config_json(&stub.base_url), test_client()).unwrap();

        let err = messenger
            .push(&message_to("nope", &[]))
            .await
            .unwrap_err();
        match err {
            MessengerError::Rejected { status, body, .. } => {
                assert_eq!(status, 400);
                assert!(body.contains("21211"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
