//! Parsers for timeline documents and raw chat exports
//!
//! # Error Handling Strategy
//!
//! - **Timeline documents** are parsed strictly: a document that is not a JSON
//!   array of day groups is an error, returned with context. Individual fields are
//!   lenient (null URLs, unknown message types) so one odd message does not
//!   reject a whole archive.
//!
//! - **Chat exports** degrade gracefully: lines with unparseable timestamps are
//!   logged and skipped, system notices are dropped, transcript blocks without a
//!   matching video are counted as orphans. The caller gets the counters in
//!   [`chat_export::ImportStats`].

pub mod chat_export;
pub mod deserializers;
pub mod timeline;

pub use chat_export::{ChatImport, ImportStats, parse_chat_export, parse_chat_export_file};
pub use timeline::{parse_timeline_file, parse_timeline_str, write_timeline_file};
