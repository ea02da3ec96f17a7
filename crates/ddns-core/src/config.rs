//! Configuration types for the DDNS reconciler
//!
//! This module defines all configuration structures used throughout the crate.

use crate::locator::SelectionStrategy;
use crate::zone::ZoneMatchPolicy;
use serde::{Deserialize, Serialize};

/// Default Cloudflare API base URL
pub const DEFAULT_CLOUDFLARE_API_BASE: &str = "https://api.cloudflare.com/client/v4";

/// Default public-IP discovery endpoint (answers with IPv6 when available)
pub const DEFAULT_IP_DISCOVERY_URL: &str = "https://api64.ipify.org";

/// Default delimiter between host names in the raw host list
pub const DEFAULT_HOST_DELIMITER: &str = "---";

/// Main DDNS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DdnsConfig {
    /// DNS provider configuration
    pub provider: ProviderConfig,

    /// Public-IP discovery, `None` disables it
    #[serde(default)]
    pub ip_source: Option<IpSourceConfig>,

    /// Reconciliation settings
    #[serde(default)]
    pub reconcile: ReconcileConfig,
}

impl DdnsConfig {
    /// Create a configuration for the given provider with defaults elsewhere
    pub fn new(provider: ProviderConfig) -> Self {
        Self {
            provider,
            ip_source: Some(IpSourceConfig::default()),
            reconcile: ReconcileConfig::default(),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        self.provider.validate()?;
        if let Some(ip_source) = &self.ip_source {
            ip_source.validate()?;
        }
        self.reconcile.validate()?;

        Ok(())
    }
}

/// DNS provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProviderConfig {
    /// Cloudflare provider
    Cloudflare {
        /// Cloudflare API token
        api_token: String,
        /// API base URL (defaults to the public v4 endpoint)
        #[serde(default)]
        api_base: Option<String>,
        /// HTTP timeout in seconds
        #[serde(default = "default_timeout_secs")]
        timeout_secs: u64,
        /// Perform lookups but skip PATCH requests
        #[serde(default)]
        dry_run: bool,
    },
}

impl ProviderConfig {
    /// Cloudflare configuration with defaults for everything but the token
    pub fn cloudflare(api_token: impl Into<String>) -> Self {
        ProviderConfig::Cloudflare {
            api_token: api_token.into(),
            api_base: None,
            timeout_secs: default_timeout_secs(),
            dry_run: false,
        }
    }

    /// Validate the provider configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            ProviderConfig::Cloudflare {
                api_token,
                api_base,
                timeout_secs,
                ..
            } => {
                if api_token.trim().is_empty() {
                    return Err(crate::Error::config("Cloudflare API token cannot be empty"));
                }
                if let Some(base) = api_base {
                    validate_http_url("Cloudflare API base", base)?;
                }
                validate_timeout(*timeout_secs)
            }
        }
    }
}

/// Public-IP discovery configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IpSourceConfig {
    /// HTTP-based IP source (plain-text "what is my IP" service)
    Http {
        /// URL to fetch IP from
        url: String,
        /// HTTP timeout in seconds
        #[serde(default = "default_discovery_timeout_secs")]
        timeout_secs: u64,
    },
}

impl IpSourceConfig {
    /// Validate the IP source configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            IpSourceConfig::Http { url, timeout_secs } => {
                if url.is_empty() {
                    return Err(crate::Error::config("HTTP IP source URL cannot be empty"));
                }
                validate_http_url("HTTP IP source URL", url)?;
                validate_timeout(*timeout_secs)
            }
        }
    }
}

impl Default for IpSourceConfig {
    fn default() -> Self {
        IpSourceConfig::Http {
            url: DEFAULT_IP_DISCOVERY_URL.to_string(),
            timeout_secs: default_discovery_timeout_secs(),
        }
    }
}

/// Reconciler settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconcileConfig {
    /// How to pick the owning zone when several match a host
    #[serde(default)]
    pub zone_match: ZoneMatchPolicy,

    /// How to treat several records matching one (zone, name, type)
    #[serde(default)]
    pub record_selection: SelectionStrategy,

    /// Skip the PATCH when the record already holds the target address
    ///
    /// The run still reports success for skipped records.
    #[serde(default)]
    pub skip_unchanged: bool,

    /// Separator between host names in the raw host list
    #[serde(default = "default_host_delimiter")]
    pub host_delimiter: String,
}

impl ReconcileConfig {
    /// Validate the reconciler settings
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.host_delimiter.is_empty() {
            return Err(crate::Error::config("Host delimiter cannot be empty"));
        }
        if self.host_delimiter.contains('.') {
            return Err(crate::Error::config(
                "Host delimiter cannot contain '.', it would split host names",
            ));
        }
        Ok(())
    }
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            zone_match: ZoneMatchPolicy::default(),
            record_selection: SelectionStrategy::default(),
            skip_unchanged: false,
            host_delimiter: default_host_delimiter(),
        }
    }
}

fn validate_http_url(what: &str, url: &str) -> Result<(), crate::Error> {
    if !url.starts_with("https://") && !url.starts_with("http://") {
        return Err(crate::Error::config(format!(
            "{} must use HTTP or HTTPS scheme. Got: {}",
            what, url
        )));
    }
    Ok(())
}

fn validate_timeout(timeout_secs: u64) -> Result<(), crate::Error> {
    if !(1..=300).contains(&timeout_secs) {
        return Err(crate::Error::config(format!(
            "HTTP timeout must be between 1 and 300 seconds. Got: {}",
            timeout_secs
        )));
    }
    Ok(())
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_discovery_timeout_secs() -> u64 {
    10
}

fn default_host_delimiter() -> String {
    DEFAULT_HOST_DELIMITER.to_string()
}
