//! Data models for the conversation archive.
//!
//! - [`TimelineDay`] - One calendar day of messages, in display order
//! - [`Message`] - A single chat message (text, image or transcript)
//! - [`MessageType`] - The declared message type as stored in the timeline document
//!
//! These models use serde for JSON (de)serialization. Lenient field handling
//! (null URLs, unknown message types) lives in [`crate::parsers::deserializers`].

pub mod timeline;

pub use timeline::{Message, MessageType, Timeline, TimelineDay};
