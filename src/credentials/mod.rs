//! Persistent storage for the summarization API key.
//!
//! Storage sits behind [`KeyValueStore`] so the application state can be built
//! with an in-memory store in tests and a TOML file on disk otherwise.

mod file;

use std::collections::BTreeMap;

use anyhow::{Result, bail};
use tracing::warn;

pub use file::{CREDENTIALS_FILENAME, FileKeyValueStore};

/// Key under which the API key is stored
pub const API_KEY_NAME: &str = "groq_api_key";

/// Environment variable consulted when no key is stored
pub const API_KEY_ENV: &str = "GROQ_API_KEY";

/// String key/value persistence
pub trait KeyValueStore: Send {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
}

#[derive(Debug, Default, Clone)]
pub struct MemoryKeyValueStore {
    entries: BTreeMap<String, String>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Where the active API key came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySource {
    Stored,
    Environment,
}

/// API key access on top of a [`KeyValueStore`]
pub struct CredentialStore {
    store: Box<dyn KeyValueStore>,
    env_fallback: Option<String>,
}

impl CredentialStore {
    pub fn new(store: Box<dyn KeyValueStore>) -> Self {
        Self { store, env_fallback: None }
    }

    /// In-memory store with nothing saved
    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryKeyValueStore::new()))
    }

    /// File-backed store in the config directory, falling back to `GROQ_API_KEY`
    pub fn open_default() -> Result<Self> {
        let store = FileKeyValueStore::open_default()?;
        Ok(Self::new(Box::new(store)).with_env_fallback(std::env::var(API_KEY_ENV).ok()))
    }

    /// Key used when nothing is stored
    pub fn with_env_fallback(mut self, key: Option<String>) -> Self {
        self.env_fallback = key.map(|k| k.trim().to_string()).filter(|k| !k.is_empty());
        self
    }

    /// Current API key, stored value first
    ///
    /// Read failures are logged and treated as "no key".
    pub fn api_key(&self) -> Option<String> {
        self.api_key_with_source().map(|(key, _)| key)
    }

    pub fn api_key_with_source(&self) -> Option<(String, KeySource)> {
        match self.store.get(API_KEY_NAME) {
            Ok(Some(key)) if !key.trim().is_empty() => {
                return Some((key.trim().to_string(), KeySource::Stored));
            }
            Ok(_) => {}
            Err(e) => warn!("Failed to read stored API key: {:#}", e),
        }
        self.env_fallback.clone().map(|key| (key, KeySource::Environment))
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key().is_some()
    }

    /// Store a new API key, trimmed; blank keys are rejected
    pub fn set_api_key(&mut self, key: &str) -> Result<()> {
        let key = key.trim();
        if key.is_empty() {
            bail!("API key cannot be empty");
        }
        self.store.set(API_KEY_NAME, key)
    }

    /// Remove the stored key; the environment fallback, if any, still applies
    pub fn clear_api_key(&mut self) -> Result<()> {
        self.store.remove(API_KEY_NAME)
    }
}
