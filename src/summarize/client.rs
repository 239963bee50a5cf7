use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{SummaryError, Summarizer};
use crate::config::SummaryConfig;

/// Shown when the server gives no usable error message
pub const GENERIC_FAILURE_MESSAGE: &str = "Failed to generate summary";

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<ErrorDetail>,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: Option<String>,
}

/// Blocking client for a chat completions endpoint
pub struct ChatCompletionClient {
    agent: ureq::Agent,
    endpoint: String,
    model: String,
    max_tokens: u32,
    system_prompt: String,
}

impl ChatCompletionClient {
    pub fn new(config: &SummaryConfig) -> Self {
        Self::with_timeout(config, config.timeout())
    }

    pub fn with_timeout(config: &SummaryConfig, timeout: Duration) -> Self {
        Self {
            agent: ureq::AgentBuilder::new().timeout(timeout).build(),
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            system_prompt: config.system_prompt.clone(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Summarizer for ChatCompletionClient {
    fn summarize(&self, api_key: &str, text: &str) -> Result<String, SummaryError> {
        let request = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage { role: "system", content: &self.system_prompt },
                ChatMessage { role: "user", content: text },
            ],
            max_tokens: self.max_tokens,
        };

        debug!(
            endpoint = %self.endpoint,
            model = %self.model,
            chars = text.chars().count(),
            "Requesting summary"
        );

        let response = self
            .agent
            .post(&self.endpoint)
            .set("Authorization", &format!("Bearer {}", api_key))
            .set("Content-Type", "application/json")
            .send_json(&request);

        match response {
            Ok(response) => {
                let body: ChatResponse = response
                    .into_json()
                    .map_err(|e| SummaryError::InvalidResponse(e.to_string()))?;
                body.choices
                    .into_iter()
                    .next()
                    .and_then(|choice| choice.message.content)
                    .map(|content| content.trim().to_string())
                    .filter(|content| !content.is_empty())
                    .ok_or_else(|| {
                        SummaryError::InvalidResponse("response has no summary text".into())
                    })
            }
            Err(ureq::Error::Status(status, response)) => {
                let body = response.into_string().unwrap_or_default();
                let message = api_error_message(&body);
                warn!(status, "Summary request rejected: {}", message);
                Err(SummaryError::Api { status, message })
            }
            Err(ureq::Error::Transport(transport)) => {
                warn!("Summary request failed: {}", transport);
                Err(SummaryError::Network(transport.to_string()))
            }
        }
    }
}

/// `error.message` from an error body, or the generic failure text
fn api_error_message(body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|body| body.error)
        .and_then(|detail| detail.message)
        .filter(|message| !message.trim().is_empty())
        .unwrap_or_else(|| GENERIC_FAILURE_MESSAGE.to_string())
}
