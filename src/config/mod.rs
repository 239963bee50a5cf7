//! Application configuration.
//!
//! Settings come from `<config dir>/chat-archive-explorer/config.toml` (missing
//! file means defaults), then environment variables, then CLI flags. The
//! development/production split lives here and nowhere else: the loader and the
//! TUI only ever see the resolved [`TimelineSources`] and asset URLs.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use crate::loader::{TimelineSource, TimelineSources};
use crate::utils::get_config_dir;

pub const CONFIG_FILENAME: &str = "config.toml";

pub const ENV_ENVIRONMENT: &str = "CHAT_ARCHIVE_ENV";
pub const ENV_TIMELINE_URL: &str = "CHAT_ARCHIVE_TIMELINE_URL";
pub const ENV_TIMELINE_FILE: &str = "CHAT_ARCHIVE_TIMELINE_FILE";
pub const ENV_SUMMARY_ENDPOINT: &str = "CHAT_ARCHIVE_SUMMARY_ENDPOINT";
pub const ENV_SUMMARY_MODEL: &str = "CHAT_ARCHIVE_SUMMARY_MODEL";

/// Deployment environment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Environment {
    /// Static `timeline.json`, assets under the site base URL
    #[default]
    Production,
    /// Local backend API with a static-file fallback
    Development,
}

impl Environment {
    pub fn parse(value: &str) -> Result<Self> {
        match value.trim().to_lowercase().as_str() {
            "production" | "prod" => Ok(Self::Production),
            "development" | "dev" => Ok(Self::Development),
            _ => bail!("invalid environment: must be production or development"),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            Environment::Production => "production",
            Environment::Development => "development",
        };
        write!(f, "{value}")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryConfig {
    /// OpenAI-compatible chat completions endpoint
    #[serde(default = "default_summary_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_summary_model")]
    pub model: String,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,

    #[serde(default = "default_summary_timeout_secs")]
    pub timeout_secs: u64,
}

impl SummaryConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            endpoint: default_summary_endpoint(),
            model: default_summary_model(),
            max_tokens: default_max_tokens(),
            system_prompt: default_system_prompt(),
            timeout_secs: default_summary_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub environment: Environment,

    /// Backend origin used in development (timeline API and assets)
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Base URL of the published site; assets and `timeline.json` live under it
    #[serde(default)]
    pub site_base_url: String,

    /// Local static timeline document
    #[serde(default = "default_timeline_file")]
    pub timeline_file: PathBuf,

    /// Timeout for timeline fetches, in seconds
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,

    #[serde(default)]
    pub summary: SummaryConfig,

    /// Explicit primary source from the command line, overrides the environment
    #[serde(skip)]
    pub timeline_override: Option<TimelineSource>,
}

fn default_api_url() -> String {
    "http://localhost:8001".to_string()
}

fn default_timeline_file() -> PathBuf {
    PathBuf::from("timeline.json")
}

fn default_http_timeout_secs() -> u64 {
    30
}

fn default_summary_endpoint() -> String {
    "https://api.groq.com/openai/v1/chat/completions".to_string()
}

fn default_summary_model() -> String {
    "llama-3.3-70b-versatile".to_string()
}

fn default_max_tokens() -> u32 {
    512
}

fn default_system_prompt() -> String {
    "You are a helpful assistant that summarizes chat messages and video transcripts. \
     Reply with a concise summary of 3-5 sentences that keeps the key facts and advice."
        .to_string()
}

fn default_summary_timeout_secs() -> u64 {
    60
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            environment: Environment::default(),
            api_url: default_api_url(),
            site_base_url: String::new(),
            timeline_file: default_timeline_file(),
            http_timeout_secs: default_http_timeout_secs(),
            summary: SummaryConfig::default(),
            timeline_override: None,
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(get_config_dir()?.join(CONFIG_FILENAME))
}

impl AppConfig {
    /// Load the config file (defaults when missing), then apply environment overrides
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&config_path()?)?;
        config.apply_env(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    /// Load a config file, returning defaults if it does not exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config: {}", path.display()))
    }

    /// Apply overrides from environment variables, looked up through `lookup`
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(env) = lookup(ENV_ENVIRONMENT) {
            self.environment = Environment::parse(&env)
                .with_context(|| format!("Invalid value in {}", ENV_ENVIRONMENT))?;
        }
        if let Some(file) = lookup(ENV_TIMELINE_FILE) {
            self.timeline_file = PathBuf::from(file);
        }
        if let Some(url) = lookup(ENV_TIMELINE_URL) {
            self.timeline_override = Some(TimelineSource::Http { url });
        }
        if let Some(endpoint) = lookup(ENV_SUMMARY_ENDPOINT) {
            self.summary.endpoint = endpoint;
        }
        if let Some(model) = lookup(ENV_SUMMARY_MODEL) {
            self.summary.model = model;
        }
        Ok(())
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    /// Primary and fallback timeline sources for the configured environment
    ///
    /// - explicit override: that source, with the static file as fallback when
    ///   the override is remote
    /// - development: `{api_url}/api/timeline`, falling back to the static file
    /// - production: `{site_base_url}timeline.json` when a site is configured
    ///   (static file as fallback), else the static file alone
    pub fn timeline_sources(&self) -> TimelineSources {
        let static_file = TimelineSource::File { path: self.timeline_file.clone() };

        if let Some(source) = &self.timeline_override {
            let fallback = match source {
                TimelineSource::Http { .. } => Some(static_file),
                TimelineSource::File { .. } => None,
            };
            return TimelineSources { primary: source.clone(), fallback };
        }

        match self.environment {
            Environment::Development => TimelineSources {
                primary: TimelineSource::Http {
                    url: format!("{}/api/timeline", self.api_url.trim_end_matches('/')),
                },
                fallback: Some(static_file),
            },
            Environment::Production if !self.site_base_url.trim().is_empty() => TimelineSources {
                primary: TimelineSource::Http {
                    url: format!("{}timeline.json", with_trailing_slash(&self.site_base_url)),
                },
                fallback: Some(static_file),
            },
            Environment::Production => TimelineSources { primary: static_file, fallback: None },
        }
    }

    /// Map an image asset path from the timeline to a displayable location
    ///
    /// Absolute `http(s)` URLs pass through. Otherwise the path is joined to the
    /// site base URL in production or to the backend origin in development.
    pub fn resolve_asset_url(&self, path: &str) -> String {
        if path.is_empty() {
            return String::new();
        }
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }

        match self.environment {
            Environment::Production => {
                if self.site_base_url.trim().is_empty() {
                    return path.to_string();
                }
                let clean = path.strip_prefix('/').unwrap_or(path);
                format!("{}{}", with_trailing_slash(&self.site_base_url), clean)
            }
            Environment::Development => {
                let origin = self.api_url.trim_end_matches('/');
                if path.starts_with('/') {
                    format!("{}{}", origin, path)
                } else {
                    format!("{}/{}", origin, path)
                }
            }
        }
    }
}

fn with_trailing_slash(base: &str) -> String {
    let base = base.trim();
    if base.ends_with('/') { base.to_string() } else { format!("{}/", base) }
}
