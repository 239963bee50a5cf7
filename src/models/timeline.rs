use serde::{Deserialize, Serialize};

/// Ordered collection of day groups
pub type Timeline = Vec<TimelineDay>;

/// Declared message type.
///
/// Anything that is not `image` or `transcript` is read as [`MessageType::Text`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    #[default]
    Text,
    Image,
    Transcript,
}

impl MessageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageType::Text => "text",
            MessageType::Image => "image",
            MessageType::Transcript => "transcript",
        }
    }
}

impl<'de> Deserialize<'de> for MessageType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        crate::parsers::deserializers::deserialize_message_type(deserializer)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    #[serde(
        default,
        deserialize_with = "crate::parsers::deserializers::deserialize_nullable_string"
    )]
    pub sender: String,
    #[serde(
        default,
        deserialize_with = "crate::parsers::deserializers::deserialize_nullable_string"
    )]
    pub time: String,
    #[serde(rename = "type", default)]
    pub message_type: MessageType,
    /// Display text for text and transcript messages, asset path for images
    #[serde(
        default,
        deserialize_with = "crate::parsers::deserializers::deserialize_nullable_string"
    )]
    pub content: String,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "crate::parsers::deserializers::deserialize_optional_url"
    )]
    pub video_url: Option<String>,
}

impl Message {
    pub fn new(
        sender: impl Into<String>,
        time: impl Into<String>,
        message_type: MessageType,
        content: impl Into<String>,
    ) -> Self {
        Self {
            sender: sender.into(),
            time: time.into(),
            message_type,
            content: content.into(),
            video_url: None,
        }
    }

    pub fn text(
        sender: impl Into<String>,
        time: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self::new(sender, time, MessageType::Text, content)
    }

    pub fn image(
        sender: impl Into<String>,
        time: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self::new(sender, time, MessageType::Image, path)
    }

    pub fn transcript(
        sender: impl Into<String>,
        time: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self::new(sender, time, MessageType::Transcript, content)
    }

    pub fn with_video_url(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        self.video_url = if url.trim().is_empty() { None } else { Some(url) };
        self
    }

    /// Video link, if the message carries a non-empty one
    pub fn video_url(&self) -> Option<&str> {
        self.video_url.as_deref().filter(|url| !url.trim().is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineDay {
    pub date: String,
    #[serde(default)]
    pub messages: Vec<Message>,
}

impl TimelineDay {
    pub fn new(date: impl Into<String>, messages: Vec<Message>) -> Self {
        Self { date: date.into(), messages }
    }
}
