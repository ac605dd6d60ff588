//! Configuration management for Sociaux

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::cache::{CacheConfig, DEFAULT_CACHE_MAX_CAPACITY, TTL_CACHE_TIME};
use crate::error::{ConfigError, Result};

/// Raw credential mapping for one provider, as found in the config file
pub type Credentials = BTreeMap<String, String>;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Credential maps keyed by provider id (e.g. "twitter")
    #[serde(default)]
    pub providers: BTreeMap<String, Credentials>,
    #[serde(default)]
    pub cache: CacheSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheSettings {
    #[serde(default = "default_ttl_seconds")]
    pub ttl_seconds: u64,
    #[serde(default = "default_max_capacity")]
    pub max_capacity: u64,
}

fn default_ttl_seconds() -> u64 {
    TTL_CACHE_TIME.as_secs()
}

fn default_max_capacity() -> u64 {
    DEFAULT_CACHE_MAX_CAPACITY
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            ttl_seconds: default_ttl_seconds(),
            max_capacity: default_max_capacity(),
        }
    }
}

impl CacheSettings {
    pub fn to_cache_config(&self) -> CacheConfig {
        CacheConfig {
            ttl: Duration::from_secs(self.ttl_seconds),
            max_capacity: self.max_capacity,
        }
    }
}

impl Config {
    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        let config_path = resolve_config_path()?;
        Self::load_from_path(&config_path)
    }

    /// Load configuration from an explicit path (tilde-expanded), else the default location
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from_path(&expand_path(path)),
            None => Self::load(),
        }
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        let config: Config = toml::from_str(&content).map_err(ConfigError::ParseError)?;
        Ok(config)
    }

    /// Credentials configured for the given provider id
    pub fn provider(&self, id: &str) -> Result<&Credentials> {
        self.providers
            .get(id)
            .ok_or_else(|| ConfigError::MissingField(format!("providers.{}", id)).into())
    }
}

/// Validated Twitter credentials
///
/// Built from a credential map; every OAuth 1.0a key must be present and
/// non-blank.
#[derive(Debug)]
pub struct TwitterConfig {
    pub consumer_key: SecretString,
    pub consumer_secret: SecretString,
    pub access_token: SecretString,
    pub access_token_secret: SecretString,
    /// Base URL of the v1.1 REST API
    pub api_url: String,
}

pub const DEFAULT_TWITTER_API_URL: &str = "https://api.twitter.com/1.1";

impl TwitterConfig {
    pub const REQUIRED_KEYS: [&'static str; 4] = [
        "consumer_key",
        "consumer_secret",
        "access_token",
        "access_token_secret",
    ];

    pub fn from_map(credentials: &Credentials) -> Result<Self> {
        let required = |key: &str| -> Result<SecretString> {
            match credentials.get(key).map(|v| v.trim()) {
                Some(value) if !value.is_empty() => Ok(SecretString::from(value.to_string())),
                _ => Err(ConfigError::MissingField(format!("twitter.{}", key)).into()),
            }
        };

        let [consumer_key, consumer_secret, access_token, access_token_secret] = Self::REQUIRED_KEYS;

        Ok(Self {
            consumer_key: required(consumer_key)?,
            consumer_secret: required(consumer_secret)?,
            access_token: required(access_token)?,
            access_token_secret: required(access_token_secret)?,
            api_url: credentials
                .get("api_url")
                .map(|url| url.trim().trim_end_matches('/').to_string())
                .filter(|url| !url.is_empty())
                .unwrap_or_else(|| DEFAULT_TWITTER_API_URL.to_string()),
        })
    }
}

/// Resolve the configuration file path (`$SOCIAUX_CONFIG`, else the XDG config dir)
pub fn resolve_config_path() -> Result<PathBuf> {
    if let Ok(path) = std::env::var("SOCIAUX_CONFIG") {
        return Ok(expand_path(Path::new(&path)));
    }

    let config_dir = dirs::config_dir()
        .ok_or_else(|| ConfigError::MissingField("config directory".to_string()))?;

    Ok(config_dir.join("sociaux").join("config.toml"))
}

/// Expand a leading `~` to the home directory
pub fn expand_path(path: &Path) -> PathBuf {
    PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).into_owned())
}
