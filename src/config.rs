use crate::battle::rules::BattleRules;
use crate::errors::ConfigError;
use crate::provider::pokeapi::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS};
use crate::provider::{CreatureProvider, MemoryProvider, PokeApiProvider};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Where creature data comes from.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum ProviderConfig {
    PokeApi { base_url: String, timeout_secs: u64 },
    /// A RON dex file; `None` uses the dex compiled into the binary.
    Offline { data_file: Option<PathBuf> },
}

impl Default for ProviderConfig {
    fn default() -> Self {
        ProviderConfig::PokeApi {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(default)]
pub struct ArenaConfig {
    pub rules: BattleRules,
    pub provider: ProviderConfig,
}

impl ArenaConfig {
    pub fn from_ron_str(source: &str) -> Result<Self, ConfigError> {
        ron::from_str(source).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_ron_str(&source)
    }

    /// Build the configuration from the environment.
    ///
    /// Optional: ARENA_CONFIG (path to a RON config file, defaults otherwise)
    /// Optional: POKEAPI_URL (overrides the PokeAPI base URL)
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = match std::env::var("ARENA_CONFIG") {
            Ok(path) if !path.is_empty() => Self::load(path)?,
            _ => Self::default(),
        };

        if let Ok(url) = std::env::var("POKEAPI_URL") {
            config.provider = match config.provider {
                ProviderConfig::PokeApi { timeout_secs, .. } => ProviderConfig::PokeApi {
                    base_url: url,
                    timeout_secs,
                },
                ProviderConfig::Offline { .. } => ProviderConfig::PokeApi {
                    base_url: url,
                    timeout_secs: DEFAULT_TIMEOUT_SECS,
                },
            };
        }
        Ok(config)
    }

    /// Switch to the offline dex, keeping a configured data file if there is one.
    pub fn offline(mut self) -> Self {
        if !matches!(self.provider, ProviderConfig::Offline { .. }) {
            self.provider = ProviderConfig::Offline { data_file: None };
        }
        self
    }

    pub fn build_provider(&self) -> Result<Arc<dyn CreatureProvider>, ConfigError> {
        match &self.provider {
            ProviderConfig::PokeApi {
                base_url,
                timeout_secs,
            } => {
                tracing::info!(%base_url, "using PokeAPI provider");
                let provider = PokeApiProvider::new(base_url.clone(), Duration::from_secs(*timeout_secs))
                    .map_err(|e| ConfigError::Provider(e.to_string()))?;
                Ok(Arc::new(provider))
            }
            ProviderConfig::Offline { data_file } => {
                let provider = match data_file {
                    Some(path) => MemoryProvider::load(path)?,
                    None => MemoryProvider::bundled()?,
                };
                tracing::info!(creatures = provider.len(), "using offline dex");
                Ok(Arc::new(provider))
            }
        }
    }
}
