//! Transactional email messenger backed by the AWS SES v2 API.
//!
//! Messages are rendered to raw MIME with `lettre` and submitted through
//! `SendEmail` with raw content, so headers and attachments survive as-is.

use std::time::Instant;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use lettre::message::header::{
    ContentDisposition, ContentType as MimeType, Header, HeaderName, HeaderValue,
};
use lettre::message::{Mailbox, MultiPart, SinglePart};
use lettre::Address;
use reqwest::{Client, Method};
use serde::{Deserialize, Serialize};

use super::aws::AwsSigner;
use super::error::{BoxError, MessengerError};
use super::message::{Attachment, ContentType, Message, Subscriber, redact_email};
use super::messenger::{Messenger, ensure_success, read_receipt};

const NAME: &str = "ses";
const SIGNING_SERVICE: &str = "ses";
const DEFAULT_ATTACHMENT_TYPE: &str = "application/octet-stream";

/// `[messenger.ses]` configuration block
///
/// `access_key` and `secret_key` are optional as a pair. Without them the
/// default AWS credential chain is used.
#[derive(Clone, Deserialize)]
pub struct SesConfig {
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub access_key: String,
    #[serde(default)]
    pub secret_key: String,
    #[serde(default, deserialize_with = "super::de::flag")]
    pub log: bool,
    #[serde(default)]
    pub endpoint: Option<String>,
}

impl SesConfig {
    /// Returns whether static keys are configured.
    fn validate(&self) -> Result<bool, MessengerError> {
        if self.region.trim().is_empty() {
            return Err(MessengerError::invalid_config("region", "must not be empty"));
        }

        match (
            self.access_key.trim().is_empty(),
            self.secret_key.trim().is_empty(),
        ) {
            (true, true) => Ok(false),
            (false, false) => Ok(true),
            (false, true) => Err(MessengerError::invalid_config(
                "secret_key",
                "required when access_key is set",
            )),
            (true, false) => Err(MessengerError::invalid_config(
                "access_key",
                "required when secret_key is set",
            )),
        }
    }

    fn base_url(&self) -> String {
        self.endpoint
            .clone()
            .unwrap_or_else(|| format!("https://email.{}.amazonaws.com", self.region))
            .trim_end_matches('/')
            .to_string()
    }
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct SendEmailRequest {
    from_email_address: String,
    destination: Destination,
    content: EmailContent,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct Destination {
    to_addresses: Vec<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct EmailContent {
    raw: RawMessage,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct RawMessage {
    data: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct SendEmailResponse {
    message_id: Option<String>,
}

/// Email: one raw MIME message to the subscriber per push.
pub struct SesMessenger {
    config: SesConfig,
    signer: AwsSigner,
    client: Client,
    send_url: String,
    account_url: String,
}

impl SesMessenger {
    /// Decode the configuration, resolve credentials and verify them against
    /// the account endpoint. Fails if the credentials do not authenticate.
    pub async fn new(raw_config: &[u8], client: Client) -> Result<Self, MessengerError> {
        let config: SesConfig =
            serde_json::from_slice(raw_config).map_err(|source| MessengerError::ConfigDecode {
                provider: NAME.to_string(),
                source,
            })?;

        let signer = if config.validate()? {
            AwsSigner::with_static_keys(
                SIGNING_SERVICE,
                config.region.clone(),
                &config.access_key,
                &config.secret_key,
            )
        } else {
            tracing::info!(
                provider = NAME,
                region = %config.region,
                "No static keys configured, using the default credential chain"
            );
            AwsSigner::from_default_chain(SIGNING_SERVICE, &config.region).await?
        };

        let base = config.base_url();
        let messenger = Self {
            send_url: format!("{base}/v2/email/outbound-emails"),
            account_url: format!("{base}/v2/email/account"),
            config,
            signer,
            client,
        };
        messenger.verify_credentials().await?;

        Ok(messenger)
    }

    async fn verify_credentials(&self) -> Result<(), MessengerError> {
        let response = self
            .signer
            .request(&self.client, Method::GET, &self.account_url, Vec::new())
            .await?
            .send()
            .await
            .map_err(|e| MessengerError::transport(NAME, e))?;
        ensure_success(NAME, response).await?;

        tracing::debug!(provider = NAME, region = %self.signer.region(), "Credentials verified");
        Ok(())
    }
}

#[async_trait]
impl Messenger for SesMessenger {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn push(&self, message: &Message) -> Result<(), MessengerError> {
        let start = Instant::now();
        let from: Mailbox = message.sender().ok_or(MessengerError::MissingSender)?.parse()?;
        let to = recipient(&message.subscriber)?;
        let email = build_email(message, from.clone(), to.clone())?;

        let payload = SendEmailRequest {
            from_email_address: from.email.to_string(),
            destination: Destination {
                to_addresses: vec![to.email.to_string()],
            },
            content: EmailContent {
                raw: RawMessage {
                    data: STANDARD.encode(email.formatted()),
                },
            },
        };
        let body = serde_json::to_vec(&payload).map_err(MessengerError::Encode)?;

        let response = self
            .signer
            .request(&self.client, Method::POST, &self.send_url, body)
            .await?
            .send()
            .await
            .map_err(|e| MessengerError::transport(NAME, e))?;
        let response = ensure_success(NAME, response).await?;

        if self.config.log {
            let sent: SendEmailResponse = read_receipt(NAME, response).await;
            tracing::info!(
                provider = NAME,
                to = %redact_email(&message.subscriber.email),
                message_id = ?sent.message_id,
                attachments = message.attachments.len(),
                duration_ms = start.elapsed().as_millis() as u64,
                "Successfully sent email"
            );
        }

        Ok(())
    }
}

/// The single destination: the subscriber's own address.
fn recipient(subscriber: &Subscriber) -> Result<Mailbox, MessengerError> {
    let address: Address = subscriber.email.trim().parse()?;
    let name = Some(subscriber.name.trim())
        .filter(|name| !name.is_empty())
        .map(str::to_string);
    Ok(Mailbox::new(name, address))
}

enum Body {
    Single(SinglePart),
    Multi(MultiPart),
}

fn body_part(message: &Message) -> Body {
    let body = message.body_text();
    match message.content_type {
        ContentType::Plain => Body::Single(SinglePart::plain(body)),
        ContentType::Html if !message.alt_body.is_empty() => {
            let alt = String::from_utf8_lossy(&message.alt_body).into_owned();
            Body::Multi(MultiPart::alternative_plain_html(alt, body))
        }
        ContentType::Html => Body::Single(SinglePart::html(body)),
    }
}

/// A header carried through verbatim from the postback.
///
/// Only `display` is used when a part is built, so the name is whatever the
/// wrapped value says.
#[derive(Clone)]
struct PassthroughHeader(HeaderValue);

impl Header for PassthroughHeader {
    fn name() -> HeaderName {
        HeaderName::new_from_ascii_str("X-Passthrough")
    }

    fn parse(_s: &str) -> Result<Self, BoxError> {
        Err("passthrough headers are write-only".into())
    }

    fn display(&self) -> HeaderValue {
        self.0.clone()
    }
}

fn header_name(name: &str) -> Result<HeaderName, MessengerError> {
    HeaderName::new_from_ascii(name.to_string())
        .map_err(|_| MessengerError::HeaderName(name.to_string()))
}

/// An attachment part. Headers sent with the attachment override the
/// defaults (`attachment` disposition, declared or octet-stream type).
fn attachment_part(attachment: &Attachment) -> Result<SinglePart, MessengerError> {
    let content_type = attachment
        .content_type()
        .and_then(|declared| MimeType::parse(declared).ok())
        .map(|parsed| parsed.display())
        .unwrap_or_else(|| {
            HeaderValue::new(
                HeaderName::new_from_ascii_str("Content-Type"),
                DEFAULT_ATTACHMENT_TYPE.to_string(),
            )
        });

    let mut builder = SinglePart::builder()
        .header(ContentDisposition::attachment(&attachment.name))
        .header(PassthroughHeader(content_type));

    for (name, values) in &attachment.header {
        if name.eq_ignore_ascii_case("content-type") {
            continue;
        }
        let name = header_name(name)?;
        for value in values {
            builder = builder.header(PassthroughHeader(HeaderValue::new(name.clone(), value.clone())));
        }
    }

    Ok(builder.body(attachment.content.clone()))
}

/// Render the message as a MIME email from `from` to `to`.
pub(crate) fn build_email(
    message: &Message,
    from: Mailbox,
    to: Mailbox,
) -> Result<lettre::Message, MessengerError> {
    let mut builder = lettre::Message::builder()
        .from(from)
        .to(to)
        .subject(message.subject.clone());

    for (name, values) in &message.headers {
        let name = header_name(name)?;
        for value in values {
            builder = builder.raw_header(HeaderValue::new(name.clone(), value.clone()));
        }
    }

    let body = body_part(message);
    if message.attachments.is_empty() {
        let email = match body {
            Body::Single(part) => builder.singlepart(part)?,
            Body::Multi(part) => builder.multipart(part)?,
        };
        return Ok(email);
    }

    let mut mixed = match body {
        Body::Single(part) => MultiPart::mixed().singlepart(part),
        Body::Multi(part) => MultiPart::mixed().multipart(part),
    };
    for attachment in &message.attachments {
        mixed = mixed.singlepart(attachment_part(attachment)?);
    }

    Ok(builder.multipart(mixed)?)
}
