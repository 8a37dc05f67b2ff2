//! Provider configuration.
//!
//! The provider block is deserialized from JSON and then resolved against
//! the environment. Explicit configuration always wins over the environment.
//!
//! | attribute  | environment variable   | default                       |
//! |------------|------------------------|-------------------------------|
//! | `api_key`  | `BRAINTRUST_API_KEY`   | required                      |
//! | `api_url`  | `BRAINTRUST_API_URL`   | `https://api.braintrust.dev`  |
//! | `org_name` | `BRAINTRUST_ORG_NAME`  | none                          |

use std::fmt;

use serde::Deserialize;
use tracing::debug;

use crate::error::ProviderError;

/// Environment variable holding the API key.
pub const ENV_API_KEY: &str = "BRAINTRUST_API_KEY";
/// Environment variable holding the API base URL.
pub const ENV_API_URL: &str = "BRAINTRUST_API_URL";
/// Environment variable holding the default organization.
pub const ENV_ORG_NAME: &str = "BRAINTRUST_ORG_NAME";
/// API base URL used when nothing else is configured.
pub const DEFAULT_API_URL: &str = "https://api.braintrust.dev";

/// The provider block as written by the user.
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProviderConfig {
    /// API key used to authenticate.
    pub api_key: Option<String>,
    /// Base URL of the API.
    pub api_url: Option<String>,
    /// Organization used when a resource does not name one.
    pub org_name: Option<String>,
}

impl ProviderConfig {
    /// Create an empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the provider block.
    pub fn from_value(value: serde_json::Value) -> Result<Self, ProviderError> {
        if value.is_null() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_value(value)?)
    }

    /// Set the API key.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set the API base URL.
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = Some(api_url.into());
        self
    }

    /// Set the default organization.
    pub fn with_org_name(mut self, org_name: impl Into<String>) -> Self {
        self.org_name = Some(org_name.into());
        self
    }

    /// Resolve against the process environment.
    pub fn resolve(self) -> Result<ResolvedConfig, ProviderError> {
        self.resolve_with(|key| std::env::var(key).ok())
    }

    /// Resolve against an arbitrary variable lookup.
    pub fn resolve_with<F>(self, env: F) -> Result<ResolvedConfig, ProviderError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |explicit: Option<String>, var: &str| {
            explicit
                .or_else(|| env(var))
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let api_key = lookup(self.api_key, ENV_API_KEY).ok_or_else(|| {
            ProviderError::Configuration(format!(
                "an API key is required: set 'api_key' or {}",
                ENV_API_KEY
            ))
        })?;

        let api_url = lookup(self.api_url, ENV_API_URL)
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        if !(api_url.starts_with("https://") || api_url.starts_with("http://")) {
            return Err(ProviderError::Configuration(format!(
                "api_url must be an http(s) URL, got '{}'",
                api_url
            )));
        }

        let org_name = lookup(self.org_name, ENV_ORG_NAME);

        debug!(api_url = %api_url, org_name = ?org_name, "Resolved provider configuration");
        Ok(ResolvedConfig {
            api_key,
            api_url,
            org_name,
        })
    }
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("api_url", &self.api_url)
            .field("org_name", &self.org_name)
            .finish()
    }
}

/// Configuration after environment fallback and defaults.
#[derive(Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    /// API key used to authenticate.
    pub api_key: String,
    /// Base URL of the API, without a trailing slash.
    pub api_url: String,
    /// Default organization, if any.
    pub org_name: Option<String>,
}

impl fmt::Debug for ResolvedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedConfig")
            .field("api_key", &"<redacted>")
            .field("api_url", &self.api_url)
            .field("org_name", &self.org_name)
            .finish()
    }
}
