//! Provider-agnostic message model.
//!
//! A [`Message`] is built once per webhook request and handed to exactly one
//! messenger. It owns all of its buffers.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// MIME-style header map: one name, many values.
pub type MimeHeader = HashMap<String, Vec<String>>;

/// How the message body should be rendered by channels that care.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    /// Plain text body
    Plain,
    /// HTML body
    #[default]
    Html,
}

impl ContentType {
    /// Map a postback content type onto a body rendering.
    ///
    /// Everything other than `plain` arrives already rendered to HTML
    /// (`html`, `richtext`, `markdown`, `visual`).
    pub fn from_postback(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("plain") {
            ContentType::Plain
        } else {
            ContentType::Html
        }
    }
}

/// A file attached to a message.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Attachment {
    pub name: String,
    pub header: MimeHeader,
    pub content: Vec<u8>,
}

impl Attachment {
    /// First `Content-Type` value from the attachment header, if any.
    pub fn content_type(&self) -> Option<&str> {
        self.header
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case("content-type"))
            .and_then(|(_, values)| values.first())
            .map(String::as_str)
    }
}

/// Failure to read a typed value out of [`Attribs`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttribError {
    #[error("subscriber attribute '{key}' is missing")]
    Missing { key: String },

    #[error("subscriber attribute '{key}' must be a {expected}, found {found}")]
    WrongType {
        key: String,
        expected: &'static str,
        found: &'static str,
    },
}

/// Loosely typed subscriber attributes with checked accessors.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Attribs(Map<String, Value>);

impl Attribs {
    pub fn new(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// Look up `key` and require it to be a JSON string.
    pub fn get_str(&self, key: &str) -> Result<&str, AttribError> {
        match self.0.get(key) {
            None | Some(Value::Null) => Err(AttribError::Missing {
                key: key.to_string(),
            }),
            Some(Value::String(value)) => Ok(value.as_str()),
            Some(other) => Err(AttribError::WrongType {
                key: key.to_string(),
                expected: "string",
                found: json_kind(other),
            }),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// The subscriber a message is addressed to.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Subscriber {
    pub uuid: String,
    pub email: String,
    pub name: String,
    pub status: String,
    pub attribs: Attribs,
}

/// Bulk-send context shared by the messages of one campaign.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Campaign {
    pub from_email: String,
    pub uuid: String,
    pub name: String,
    pub tags: Vec<String>,
}

/// A single message pushed to a messenger.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Message {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub content_type: ContentType,
    pub body: Vec<u8>,
    pub alt_body: Vec<u8>,
    pub headers: MimeHeader,
    pub attachments: Vec<Attachment>,
    pub subscriber: Subscriber,
    pub campaign: Option<Campaign>,
}

impl Message {
    /// Body as text, replacing invalid UTF-8.
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Sender address: the campaign's from-address when present, else `from`.
    pub fn sender(&self) -> Option<&str> {
        self.campaign
            .as_ref()
            .map(|c| c.from_email.trim())
            .filter(|from| !from.is_empty())
            .or_else(|| Some(self.from.trim()).filter(|from| !from.is_empty()))
    }
}

/// Mask everything but the last four characters of a phone number.
pub fn redact_phone(phone: &str) -> String {
    let chars: Vec<char> = phone.chars().collect();
    let keep = chars.len().min(4);
    let masked = chars.len() - keep;
    std::iter::repeat_n('*', masked)
        .chain(chars[masked..].iter().copied())
        .collect()
}

/// Keep the first character of the local part and the whole domain.
pub fn redact_email(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) => {
            let first = local.chars().next().map(String::from).unwrap_or_default();
            format!("{first}***@{domain}")
        }
        None => redact_phone(email),
    }
}
