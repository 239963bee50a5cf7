use serde::de::Error;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::models::MessageType;

/// Deserializes a message type leniently.
///
/// `image` and `transcript` (any case) map to their variants; every other string,
/// including `text`, `video_file` and unknown values, maps to [`MessageType::Text`].
/// `null` is also read as text.
pub fn deserialize_message_type<'de, D>(deserializer: D) -> Result<MessageType, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    match value {
        Value::String(s) => Ok(match s.trim().to_ascii_lowercase().as_str() {
            "image" => MessageType::Image,
            "transcript" => MessageType::Transcript,
            _ => MessageType::Text,
        }),
        Value::Null => Ok(MessageType::Text),
        _ => Err(Error::custom("message type must be a string")),
    }
}

/// Deserializes a string field that may be `null`, mapping `null` to `""`
pub fn deserialize_nullable_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Deserializes an optional URL, treating `null`, `""` and whitespace as absent
pub fn deserialize_optional_url<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|url| !url.trim().is_empty()))
}
