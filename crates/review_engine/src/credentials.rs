//! Provider credentials, loaded once from a key-value store.
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::TaskError;

const SELECTED_PROVIDER_KEY: &str = "selected_provider";

/// LLM providers the backend accepts keys for, in the backend's precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Google,
    OpenAi,
    Anthropic,
    Mistral,
    Perplexity,
}

impl Provider {
    pub const ALL: [Provider; 5] = [
        Provider::Google,
        Provider::OpenAi,
        Provider::Anthropic,
        Provider::Mistral,
        Provider::Perplexity,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Provider::Google => "google",
            Provider::OpenAi => "openai",
            Provider::Anthropic => "anthropic",
            Provider::Mistral => "mistral",
            Provider::Perplexity => "perplexity",
        }
    }

    /// Request header carrying this provider's key.
    pub fn header_name(self) -> &'static str {
        match self {
            Provider::Google => "X-Google-API-Key",
            Provider::OpenAi => "X-OpenAI-API-Key",
            Provider::Anthropic => "X-Anthropic-API-Key",
            Provider::Mistral => "X-Mistral-API-Key",
            Provider::Perplexity => "X-Perplexity-API-Key",
        }
    }

    fn storage_key(self) -> String {
        format!("api_key.{}", self.as_str())
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let wanted = value.trim().to_ascii_lowercase();
        Provider::ALL
            .into_iter()
            .find(|provider| provider.as_str() == wanted)
            .ok_or_else(|| format!("unknown provider '{}'", value.trim()))
    }
}

/// The key to send with a request.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    pub provider: Provider,
    pub api_key: String,
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("provider", &self.provider)
            .field("api_key", &mask_key(&self.api_key))
            .finish()
    }
}

/// Snapshot of the configured keys and the preferred provider.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct CredentialConfig {
    pub selected: Option<Provider>,
    pub keys: BTreeMap<Provider, String>,
}

impl fmt::Debug for CredentialConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let masked: BTreeMap<_, _> = self
            .keys
            .iter()
            .map(|(provider, key)| (*provider, mask_key(key)))
            .collect();
        f.debug_struct("CredentialConfig")
            .field("selected", &self.selected)
            .field("keys", &masked)
            .finish()
    }
}

impl CredentialConfig {
    /// Selected provider's key, else the first configured provider in
    /// precedence order. Blank keys count as missing.
    pub fn active_credential(&self) -> Result<Credential, TaskError> {
        let usable = |provider: Provider| {
            self.keys
                .get(&provider)
                .map(|key| key.trim())
                .filter(|key| !key.is_empty())
                .map(|key| Credential {
                    provider,
                    api_key: key.to_string(),
                })
        };

        if let Some(selected) = self.selected {
            return usable(selected).ok_or_else(|| {
                TaskError::Auth(format!("no API key configured for {selected}"))
            });
        }
        Provider::ALL
            .into_iter()
            .find_map(usable)
            .ok_or_else(|| TaskError::Auth("no API key configured".to_string()))
    }
}

/// Shows only the last four characters of a key.
pub fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.trim().chars().collect();
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}{tail}", "*".repeat(chars.len() - 4))
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("credential storage unavailable: {0}")]
    Unavailable(String),
    #[error("credential storage corrupt: {0}")]
    Corrupt(String),
}

/// Minimal persistent string map.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.values.remove(key);
        Ok(())
    }
}

/// Credential configuration backed by a [`KeyValueStore`]. The store is read
/// once in [`CredentialStore::load`]; later changes write through.
pub struct CredentialStore<S: KeyValueStore> {
    store: S,
    config: CredentialConfig,
}

impl<S: KeyValueStore> CredentialStore<S> {
    pub fn load(store: S) -> Result<Self, StoreError> {
        let mut config = CredentialConfig::default();
        for provider in Provider::ALL {
            if let Some(key) = store.get(&provider.storage_key())? {
                if !key.trim().is_empty() {
                    config.keys.insert(provider, key);
                }
            }
        }
        config.selected = match store.get(SELECTED_PROVIDER_KEY)? {
            Some(raw) => Some(raw.parse().map_err(StoreError::Corrupt)?),
            None => None,
        };
        Ok(Self { store, config })
    }

    pub fn config(&self) -> &CredentialConfig {
        &self.config
    }

    pub fn set_key(&mut self, provider: Provider, key: &str) -> Result<(), StoreError> {
        let key = key.trim();
        if key.is_empty() {
            return self.clear_key(provider);
        }
        self.store.set(&provider.storage_key(), key)?;
        self.config.keys.insert(provider, key.to_string());
        Ok(())
    }

    pub fn clear_key(&mut self, provider: Provider) -> Result<(), StoreError> {
        self.store.remove(&provider.storage_key())?;
        self.config.keys.remove(&provider);
        Ok(())
    }

    /// Pins the provider to use; `None` falls back to precedence order.
    pub fn select_provider(&mut self, provider: Option<Provider>) -> Result<(), StoreError> {
        match provider {
            Some(provider) => self.store.set(SELECTED_PROVIDER_KEY, provider.as_str())?,
            None => self.store.remove(SELECTED_PROVIDER_KEY)?,
        }
        self.config.selected = provider;
        Ok(())
    }

    pub fn active_credential(&self) -> Result<Credential, TaskError> {
        self.config.active_credential()
    }

    pub fn into_inner(self) -> S {
        self.store
    }
}
