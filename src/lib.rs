//! Chat Archive Explorer - browse, search and summarize an archived group chat
//!
//! The archive is a timeline document: an ordered list of days, each holding
//! the messages sent that day. This library provides:
//!
//! - Loading the timeline from a backend endpoint or a static file, with one fallback
//! - Case-insensitive literal search and date filtering with match highlighting
//! - Message classification (images, transcripts, long text, video thumbnails)
//! - Summaries of long messages through an OpenAI-compatible API
//! - Importing WhatsApp-style chat exports into a timeline document
//!
//! # Example
//!
//! ```no_run
//! use std::path::PathBuf;
//!
//! use chat_archive_explorer::{TimelineLoader, TimelineSource, filter};
//!
//! let loader = TimelineLoader::default();
//! let source = TimelineSource::File { path: PathBuf::from("timeline.json") };
//! let timeline = loader.load_source(&source)?;
//! let hits = filter(&timeline, "sleep", None);
//! println!("{} days mention sleep", hits.len());
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod classify;
pub mod cli;
pub mod config;
pub mod credentials;
pub mod filters;
pub mod loader;
pub mod models;
pub mod parsers;
pub mod state;
pub mod summarize;
pub mod tui;
pub mod utils;

// Re-export commonly used types
pub use classify::{Classification, MessageKind, classify};
pub use config::{AppConfig, Environment};
pub use filters::{Segment, filter, highlight};
pub use loader::{TimelineLoader, TimelineSource, TimelineSources};
pub use models::{Message, MessageType, Timeline, TimelineDay};
pub use parsers::{parse_chat_export, parse_timeline_file};
pub use state::ArchiveState;
pub use summarize::{Summarizer, SummaryError, request_summary};
pub use utils::format_path_with_tilde;
