//! Postback payload sent by the list manager for each message.
//!
//! Decoding is tolerant: `null` for a list, map or string means empty.
//! Attachment content is standard base64.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Deserializer, Serialize, de::Error as _};
use utoipa::ToSchema;

use crate::services::messengers::{
    Attachment, Attribs, Campaign, ContentType, Message, MimeHeader, Subscriber,
};

fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn base64_content<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(Vec::new()),
        Some(encoded) => STANDARD
            .decode(encoded.trim())
            .map_err(|e| D::Error::custom(format!("attachment content is not base64: {e}"))),
    }
}

/// One message to deliver.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "subject": "",
    "content_type": "plain",
    "body": "Hello",
    "recipients": [{"uuid": "u1", "email": "a@b.com", "attribs": {"phone": "+15551234567"}}]
}))]
pub struct PostbackRequest {
    #[serde(default, deserialize_with = "nullable")]
    pub subject: String,
    /// `plain`, or an HTML-rendered type (`html`, `richtext`, `markdown`, `visual`)
    #[serde(default, deserialize_with = "nullable")]
    pub content_type: String,
    #[serde(default, deserialize_with = "nullable")]
    pub body: String,
    /// Must hold exactly one recipient
    #[serde(default, deserialize_with = "nullable")]
    pub recipients: Vec<RecipientDto>,
    #[serde(default)]
    pub campaign: Option<CampaignDto>,
    #[serde(default, deserialize_with = "nullable")]
    pub attachments: Vec<AttachmentDto>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct RecipientDto {
    #[serde(default, deserialize_with = "nullable")]
    pub uuid: String,
    #[serde(default, deserialize_with = "nullable")]
    pub email: String,
    #[serde(default, deserialize_with = "nullable")]
    pub name: String,
    /// Free-form subscriber attributes, e.g. `phone`
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Object)]
    pub attribs: Attribs,
    #[serde(default, deserialize_with = "nullable")]
    pub status: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct CampaignDto {
    #[serde(default, deserialize_with = "nullable")]
    pub from_email: String,
    #[serde(default, deserialize_with = "nullable")]
    pub uuid: String,
    #[serde(default, deserialize_with = "nullable")]
    pub name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct AttachmentDto {
    #[serde(default, deserialize_with = "nullable")]
    pub name: String,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Object)]
    pub header: MimeHeader,
    /// Base64-encoded bytes
    #[serde(default, deserialize_with = "base64_content", skip_serializing)]
    #[schema(value_type = String, format = Byte)]
    pub content: Vec<u8>,
}

impl PostbackRequest {
    /// Build the message for one recipient. Attachment bytes are copied.
    pub fn to_message(&self, recipient: &RecipientDto) -> Message {
        Message {
            subject: self.subject.clone(),
            content_type: ContentType::from_postback(&self.content_type),
            body: self.body.as_bytes().to_vec(),
            to: vec![recipient.email.clone()],
            subscriber: Subscriber {
                uuid: recipient.uuid.clone(),
                email: recipient.email.clone(),
                name: recipient.name.clone(),
                status: recipient.status.clone(),
                attribs: recipient.attribs.clone(),
            },
            campaign: self.campaign.as_ref().map(|c| Campaign {
                from_email: c.from_email.clone(),
                uuid: c.uuid.clone(),
                name: c.name.clone(),
                tags: c.tags.clone(),
            }),
            attachments: self
                .attachments
                .iter()
                .map(|a| Attachment {
                    name: a.name.clone(),
                    header: a.header.clone(),
                    content: a.content.to_vec(),
                })
                .collect(),
            ..Default::default()
        }
    }
}
