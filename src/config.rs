use std::env;

use anyhow::{anyhow, Result};
use serde::Deserialize;

/// Catalog REST endpoint used when no override is configured.
pub const DEFAULT_BASE_URL: &str = "https://www.flickr.com/services/rest/";

/// Number of photos requested per page.
pub const DEFAULT_PER_PAGE: u32 = 30;

/// Transport timeout for a single request, in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Environment variable holding the catalog API key.
pub const API_KEY_ENV: &str = "FLICKR_API_KEY";

/// Rendition labels in order of preference when picking a preferred size.
pub const SIZE_PREFERENCE: [&str; 4] = ["Small", "Medium", "Large", "Original"];

/// Host suffix for static photo resources (`farm{N}.staticflickr.com`).
pub const RESOURCE_HOST_SUFFIX: &str = "staticflickr.com";

/// Top-level configuration for the pager.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PagerConfig {
    /// Base URL of the catalog REST endpoint.
    pub base_url: String,
    /// Page size used by search and trending feeds.
    pub per_page: u32,
    /// Timeout handed to the live transport.
    pub request_timeout_secs: u64,
}

impl Default for PagerConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            per_page: DEFAULT_PER_PAGE,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

/// Catalog API key. The value is never printed by `Debug`.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Build a key, rejecting blank input.
    pub fn new(value: impl Into<String>) -> Result<Self> {
        let value = value.into().trim().to_string();
        if value.is_empty() {
            return Err(anyhow!("api key is empty"));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

/// Synchronous lookup of the credential used to build every request.
///
/// A failed lookup is a startup error: callers are expected to abort rather
/// than retry.
pub trait CredentialProvider {
    fn api_key(&self) -> Result<ApiKey>;
}

/// Reads the API key from an environment variable.
pub struct EnvCredentials {
    var: String,
}

impl EnvCredentials {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl Default for EnvCredentials {
    fn default() -> Self {
        Self::new(API_KEY_ENV)
    }
}

impl CredentialProvider for EnvCredentials {
    fn api_key(&self) -> Result<ApiKey> {
        let value = env::var(&self.var)
            .map_err(|_| anyhow!("credential not found: ${} is not set", self.var))?;
        ApiKey::new(value).map_err(|e| anyhow!("credential ${} unusable: {}", self.var, e))
    }
}

/// A fixed key, e.g. from a host application's own settings store.
pub struct StaticCredentials(ApiKey);

impl StaticCredentials {
    pub fn new(key: ApiKey) -> Self {
        Self(key)
    }
}

impl CredentialProvider for StaticCredentials {
    fn api_key(&self) -> Result<ApiKey> {
        Ok(self.0.clone())
    }
}
