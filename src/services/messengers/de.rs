//! Deserialize helpers for provider configuration blocks.
//!
//! Blocks may arrive from environment variables, where every value is a
//! string, as well as from TOML.

use serde::de::{Deserializer, Error};
use serde::Deserialize;
use serde_json::Value;

/// A boolean toggle written as `true`/`false`, `"true"`/`"false"` or `"1"`/`"0"`.
pub(crate) fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(false),
        Value::Bool(b) => Ok(b),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(true),
            "false" | "0" | "no" | "off" | "" => Ok(false),
            other => Err(D::Error::custom(format!("invalid boolean '{other}'"))),
        },
        other => Err(D::Error::custom(format!("expected a boolean, found {other}"))),
    }
}

/// An identifier written either as a string or as a bare integer.
pub(crate) fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(String::new()),
        Value::String(s) => Ok(s),
        Value::Number(n) if n.is_u64() || n.is_i64() => Ok(n.to_string()),
        other => Err(D::Error::custom(format!(
            "expected a string or integer, found {other}"
        ))),
    }
}
