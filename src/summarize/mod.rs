//! Message summarization through an OpenAI-compatible chat completions API.
//!
//! [`request_summary`] is the single entry point: it refuses to call the
//! remote service without a credential, so callers can open the key-entry flow
//! on [`SummaryError::MissingCredential`]. [`SummaryDispatcher`] runs requests
//! off the UI thread, where only the most recent request may report back.

mod client;
mod dispatcher;

use thiserror::Error;

pub use client::{ChatCompletionClient, GENERIC_FAILURE_MESSAGE};
pub use dispatcher::{CancelToken, SummaryDispatcher, SummaryOutcome};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SummaryError {
    #[error("No API key configured")]
    MissingCredential,

    /// Non-success response; `message` is the server's `error.message` when present
    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Unexpected response: {0}")]
    InvalidResponse(String),

    #[error("Summary request cancelled")]
    Cancelled,
}

impl SummaryError {
    /// Whether the user should be asked for a (new) API key
    pub fn is_credential_related(&self) -> bool {
        match self {
            SummaryError::MissingCredential => true,
            SummaryError::Api { status, message } => {
                matches!(status, 401 | 403) || message.to_lowercase().contains("api key")
            }
            _ => false,
        }
    }
}

/// Something that turns text into a summary
pub trait Summarizer: Send + Sync {
    fn summarize(&self, api_key: &str, text: &str) -> Result<String, SummaryError>;
}

/// Summarize `text`, or fail with `MissingCredential` without any remote call
pub fn request_summary(
    summarizer: &dyn Summarizer,
    api_key: Option<&str>,
    text: &str,
) -> Result<String, SummaryError> {
    let key = api_key.map(str::trim).filter(|k| !k.is_empty());
    let Some(key) = key else {
        return Err(SummaryError::MissingCredential);
    };
    summarizer.summarize(key, text)
}
