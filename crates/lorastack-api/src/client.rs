//! Registry client for looking up model versions by content hash

use crate::messages::{ModelVersion, RegistryLookup};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Default registry API root
pub const DEFAULT_BASE_URL: &str = "https://civitai.com/api/v1";

/// Per-request timeout used unless configured otherwise
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Environment variable overriding the registry API root
pub const REGISTRY_URL_ENV: &str = "LORASTACK_REGISTRY_URL";

/// Client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// API root, without trailing slash
    pub base_url: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// User agent sent with requests
    pub user_agent: String,
    /// Set to false to skip all network lookups
    pub enabled: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            base_url: std::env::var(REGISTRY_URL_ENV)
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: format!("lorastack/{}", env!("CARGO_PKG_VERSION")),
            enabled: true,
        }
    }
}

impl RegistryConfig {
    /// Config with lookups switched off
    pub fn offline() -> Self {
        Self {
            enabled: false,
            ..Default::default()
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), RegistryError> {
        if self.base_url.trim().is_empty() {
            return Err(RegistryError::Config("base_url cannot be empty".to_string()));
        }
        if self.timeout_secs == 0 {
            return Err(RegistryError::Config("timeout_secs must be > 0".to_string()));
        }
        Ok(())
    }

    /// URL of the by-hash lookup for a hex digest
    pub fn lookup_url(&self, hex_digest: &str) -> String {
        format!(
            "{}/model-versions/by-hash/{}",
            self.base_url.trim_end_matches('/'),
            hex_digest
        )
    }
}

/// Registry errors
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected status: {0}")]
    Status(StatusCode),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Looks up trigger-word metadata for a content hash.
///
/// Implementations never return errors: failures are folded into
/// [`RegistryLookup::Failed`] so one bad lookup cannot sink a whole run.
#[async_trait]
pub trait RegistryClient: Send + Sync {
    async fn lookup(&self, hex_digest: &str) -> RegistryLookup;
}

/// HTTP client for the registry API
pub struct HttpRegistry {
    client: reqwest::Client,
    config: RegistryConfig,
}

impl HttpRegistry {
    /// Create a client
    pub fn new(config: RegistryConfig) -> Result<Self, RegistryError> {
        config.validate()?;
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client, config })
    }

    /// Get configuration
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Fetch a model version. `Ok(None)` means the registry has no entry.
    pub async fn fetch(&self, hex_digest: &str) -> Result<Option<ModelVersion>, RegistryError> {
        let url = self.config.lookup_url(hex_digest);
        debug!(%url, "Registry lookup");

        let response = self.client.get(&url).send().await?;
        match response.status() {
            StatusCode::OK => Ok(Some(response.json::<ModelVersion>().await?)),
            StatusCode::NOT_FOUND => Ok(None),
            status => Err(RegistryError::Status(status)),
        }
    }
}

#[async_trait]
impl RegistryClient for HttpRegistry {
    async fn lookup(&self, hex_digest: &str) -> RegistryLookup {
        if !self.config.enabled {
            return RegistryLookup::Disabled;
        }

        match self.fetch(hex_digest).await {
            Ok(Some(version)) => RegistryLookup::Found(version),
            Ok(None) => RegistryLookup::NotFound,
            Err(e) => {
                warn!(hash = hex_digest, error = %e, "Registry lookup failed");
                RegistryLookup::Failed(e.to_string())
            }
        }
    }
}

/// In-memory registry for testing and offline use
#[derive(Default)]
pub struct MockRegistry {
    versions: HashMap<String, ModelVersion>,
    failing: HashSet<String>,
    calls: Mutex<Vec<String>>,
}

impl MockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `hex_digest` with `version`
    pub fn with_version(mut self, hex_digest: impl Into<String>, version: ModelVersion) -> Self {
        self.versions.insert(hex_digest.into(), version);
        self
    }

    /// Answer `hex_digest` with a failure
    pub fn with_failure(mut self, hex_digest: impl Into<String>) -> Self {
        self.failing.insert(hex_digest.into());
        self
    }

    /// Digests looked up so far, in order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl RegistryClient for MockRegistry {
    async fn lookup(&self, hex_digest: &str) -> RegistryLookup {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(hex_digest.to_string());
        }

        if self.failing.contains(hex_digest) {
            return RegistryLookup::Failed("mock failure".to_string());
        }
        match self.versions.get(hex_digest) {
            Some(version) => RegistryLookup::Found(version.clone()),
            None => RegistryLookup::NotFound,
        }
    }
}
